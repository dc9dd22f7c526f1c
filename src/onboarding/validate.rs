//! Structural validation of a completed draft.
//!
//! Purely in-memory: no network calls and no id resolution. The role's
//! required-field contract comes from [`Role::required_fields`] so the
//! table is never duplicated here.

use crate::error::ValidationError;
use crate::onboarding::state::Draft;
use crate::roles::Role;

/// Check a draft against its role's contract.
///
/// Role and email are always required and checked first. Role-specific
/// fields are then evaluated in [`Field`](crate::roles::Field) declared
/// order, so the missing list is deterministic across runs. Empty and
/// whitespace-only values count as missing. Fields the role does not
/// require never block submission, even when empty.
///
/// Returns the role on success as proof the draft has one.
pub fn validate(draft: &Draft) -> Result<Role, ValidationError> {
    let role = draft.role.ok_or(ValidationError::MissingRole)?;
    if is_blank(Some(&draft.email)) {
        return Err(ValidationError::MissingEmail);
    }

    let missing: Vec<_> = role
        .required_fields()
        .iter()
        .copied()
        .filter(|&field| is_blank(draft.field_value(field)))
        .collect();

    if missing.is_empty() {
        Ok(role)
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Level;
    use crate::onboarding::state::SessionState;
    use crate::roles::Field;

    fn producer_draft() -> Draft {
        let mut state = SessionState::new("a@x.com");
        state.set_role(Role::Producer).unwrap();
        state.set_location(Level::Region, "Central").unwrap();
        state.set_location(Level::SubRegion, "East").unwrap();
        state.set_location(Level::Lga, "Kup").unwrap();
        state.set_location(Level::Ward, "Ward3").unwrap();
        state.set_detail(Field::FullName, "Jane").unwrap();
        state.draft
    }

    #[test]
    fn complete_producer_passes() {
        assert_eq!(validate(&producer_draft()), Ok(Role::Producer));
    }

    #[test]
    fn missing_role_checked_first() {
        let draft = Draft::for_email("");
        assert_eq!(validate(&draft), Err(ValidationError::MissingRole));
    }

    #[test]
    fn missing_email_checked_before_fields() {
        let mut draft = producer_draft();
        draft.email = "   ".into();
        assert_eq!(validate(&draft), Err(ValidationError::MissingEmail));
    }

    #[test]
    fn missing_fields_reported_in_declared_order() {
        let mut draft = producer_draft();
        draft.ward = None;
        draft.full_name = None;
        assert_eq!(
            validate(&draft),
            Err(ValidationError::MissingFields(vec![
                Field::FullName,
                Field::Ward
            ]))
        );
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let mut draft = producer_draft();
        draft.full_name = Some("  \t".into());
        assert_eq!(
            validate(&draft),
            Err(ValidationError::MissingFields(vec![Field::FullName]))
        );
    }

    #[test]
    fn processing_site_owner_missing_registration_number() {
        let mut draft = producer_draft();
        draft.role = Some(Role::ProcessingSiteOwner);
        assert_eq!(
            validate(&draft),
            Err(ValidationError::MissingFields(vec![
                Field::RegistrationNumber
            ]))
        );
    }

    #[test]
    fn organization_without_location_passes() {
        let mut state = SessionState::new("b@y.com");
        state.set_role(Role::Organization).unwrap();
        state.set_detail(Field::OrganizationName, "CoopX").unwrap();
        assert_eq!(validate(&state.draft), Ok(Role::Organization));
    }

    #[test]
    fn irrelevant_fields_never_block() {
        // A storage operator needs only organization_name; empty location
        // fields must not be reported.
        let mut state = SessionState::new("c@z.com");
        state.set_role(Role::StorageOperator).unwrap();
        assert_eq!(
            validate(&state.draft),
            Err(ValidationError::MissingFields(vec![
                Field::OrganizationName
            ]))
        );
        state.set_detail(Field::OrganizationName, "Depot A").unwrap();
        assert_eq!(validate(&state.draft), Ok(Role::StorageOperator));
    }
}
