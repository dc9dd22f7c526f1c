//! Onboarding state machine and draft aggregate.
//!
//! All form fields live in a single [`Draft`] owned by the session, and the
//! only legal routes to change them are the transition methods on
//! [`SessionState`]. That makes partially-cleared dependent fields
//! unrepresentable: changing a role or a higher location level always
//! cascades through everything below it.

use serde::{Deserialize, Serialize};

use crate::directory::Level;
use crate::error::{CommitError, Error, ValidationError};
use crate::roles::{Field, Role};

/// Why a submission landed in [`Step::Failed`].
#[derive(Debug, Clone)]
pub enum FailureReason {
    Validation(ValidationError),
    Commit(CommitError),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "validation: {e}"),
            Self::Commit(e) => write!(f, "commit: {e}"),
        }
    }
}

/// The steps of an onboarding session.
///
/// Progresses RoleSelection → LocationSelection → DetailEntry → Validating
/// → Submitting → Committed. `Failed` is reachable from Validating and
/// Submitting and behaves like DetailEntry for editing: the draft is
/// preserved, not reset.
#[derive(Debug, Clone)]
pub enum Step {
    RoleSelection,
    LocationSelection,
    DetailEntry,
    Validating,
    Submitting,
    Committed,
    Failed(FailureReason),
}

impl Step {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &Step) -> bool {
        use Step::*;
        matches!(
            (self, target),
            (RoleSelection, LocationSelection)
                | (RoleSelection, DetailEntry)
                | (LocationSelection, DetailEntry)
                | (DetailEntry, Validating)
                | (Failed(_), Validating)
                | (Validating, Submitting)
                | (Validating, Failed(_))
                | (Submitting, Committed)
                | (Submitting, Failed(_))
        )
    }

    /// Whether the session is finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Committed)
    }

    /// Whether the draft may still be edited in this step.
    ///
    /// Failed counts as editable: the user corrects fields and resubmits.
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            Step::RoleSelection | Step::LocationSelection | Step::DetailEntry | Step::Failed(_)
        )
    }

    /// Whether a submission is currently in flight.
    pub fn is_submitting(&self) -> bool {
        matches!(self, Step::Validating | Step::Submitting)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::RoleSelection => "role_selection",
            Self::LocationSelection => "location_selection",
            Self::DetailEntry => "detail_entry",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Committed => "committed",
            Self::Failed(_) => "failed",
        };
        write!(f, "{s}")
    }
}

/// The in-progress onboarding form. Location fields hold unit *names*;
/// resolution to stable ids happens only at commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub role: Option<Role>,
    pub email: String,
    pub full_name: Option<String>,
    pub region: Option<String>,
    pub sub_region: Option<String>,
    pub lga: Option<String>,
    pub ward: Option<String>,
    pub organization_name: Option<String>,
    pub registration_number: Option<String>,
}

impl Draft {
    /// A fresh draft carrying only the session email.
    pub fn for_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    /// The selected name at a hierarchy level, if any.
    pub fn location_name(&self, level: Level) -> Option<&str> {
        let slot = match level {
            Level::Region => &self.region,
            Level::SubRegion => &self.sub_region,
            Level::Lga => &self.lga,
            Level::Ward => &self.ward,
        };
        slot.as_deref()
    }

    /// The current value of a validatable field, if any.
    pub fn field_value(&self, field: Field) -> Option<&str> {
        let slot = match field {
            Field::FullName => &self.full_name,
            Field::Region => &self.region,
            Field::SubRegion => &self.sub_region,
            Field::Lga => &self.lga,
            Field::Ward => &self.ward,
            Field::RegistrationNumber => &self.registration_number,
            Field::OrganizationName => &self.organization_name,
        };
        slot.as_deref()
    }

    fn location_slot(&mut self, level: Level) -> &mut Option<String> {
        match level {
            Level::Region => &mut self.region,
            Level::SubRegion => &mut self.sub_region,
            Level::Lga => &mut self.lga,
            Level::Ward => &mut self.ward,
        }
    }

    /// Clear every location selection strictly deeper than `level`.
    fn clear_below(&mut self, level: Level) {
        for deeper in Level::ALL.into_iter().filter(|l| l.is_below(level)) {
            *self.location_slot(deeper) = None;
        }
    }

    /// Clear all location and detail fields. Email survives.
    fn clear_for_role_change(&mut self) {
        self.full_name = None;
        self.region = None;
        self.sub_region = None;
        self.lga = None;
        self.ward = None;
        self.organization_name = None;
        self.registration_number = None;
    }
}

/// The complete mutable state of one onboarding session: current step,
/// draft, and the location epoch used to discard stale cascading lookups.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub step: Step,
    pub draft: Draft,
    /// Bumped by every role or location change. A cascading lookup
    /// snapshots this before awaiting and discards its result if it moved.
    pub epoch: u64,
}

impl SessionState {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            step: Step::RoleSelection,
            draft: Draft::for_email(email),
            epoch: 0,
        }
    }

    /// Select (or change) the role.
    ///
    /// Allowed from any pre-Submitting step. Clears all location and detail
    /// fields except email — a role change invalidates everything
    /// downstream — and moves to LocationSelection or DetailEntry per the
    /// role's contract.
    pub fn set_role(&mut self, role: Role) -> Result<(), Error> {
        if self.step.is_submitting() || self.step.is_terminal() {
            return Err(Error::InvalidTransition {
                step: self.step.to_string(),
                operation: "set_role".into(),
            });
        }
        self.draft.role = Some(role);
        self.draft.clear_for_role_change();
        self.epoch += 1;
        self.step = if role.requires_location() {
            Step::LocationSelection
        } else {
            Step::DetailEntry
        };
        Ok(())
    }

    /// Select a unit name at a hierarchy level.
    ///
    /// Allowed only while editable (LocationSelection, DetailEntry, or
    /// Failed recovery). Cascades: every selection deeper than `level` is
    /// cleared, and the epoch is bumped so in-flight lookups for deeper
    /// levels are discarded.
    pub fn set_location(&mut self, level: Level, name: impl Into<String>) -> Result<(), Error> {
        if !self.step.is_editable() || matches!(self.step, Step::RoleSelection) {
            return Err(Error::InvalidTransition {
                step: self.step.to_string(),
                operation: format!("set_location({level})"),
            });
        }
        *self.draft.location_slot(level) = Some(name.into());
        self.draft.clear_below(level);
        self.epoch += 1;
        // A complete hierarchy moves the flow on to detail entry.
        if matches!(self.step, Step::LocationSelection) && self.draft.ward.is_some() {
            self.step = Step::DetailEntry;
        }
        Ok(())
    }

    /// Set a detail field (full name, registration number, organization
    /// name). Location fields must go through [`Self::set_location`].
    pub fn set_detail(&mut self, field: Field, value: impl Into<String>) -> Result<(), Error> {
        if !self.step.is_editable() {
            return Err(Error::InvalidTransition {
                step: self.step.to_string(),
                operation: format!("set_detail({field})"),
            });
        }
        let slot = match field {
            Field::FullName => &mut self.draft.full_name,
            Field::RegistrationNumber => &mut self.draft.registration_number,
            Field::OrganizationName => &mut self.draft.organization_name,
            Field::Region | Field::SubRegion | Field::Lga | Field::Ward => {
                return Err(Error::InvalidTransition {
                    step: self.step.to_string(),
                    operation: format!("set_detail({field}) — use set_location"),
                });
            }
        };
        *slot = Some(value.into());
        Ok(())
    }

    /// Move into Validating for a submission attempt. Rejected while a
    /// prior attempt is unresolved.
    pub fn begin_submit(&mut self) -> Result<(), Error> {
        if self.step.is_submitting() {
            return Err(Error::SubmissionInFlight);
        }
        if !self
            .step
            .can_transition_to(&Step::Validating)
        {
            return Err(Error::InvalidTransition {
                step: self.step.to_string(),
                operation: "submit".into(),
            });
        }
        self.step = Step::Validating;
        Ok(())
    }

    /// Record a failed submission. The draft is retained so the user can
    /// correct fields and resubmit.
    pub fn fail(&mut self, reason: FailureReason) {
        self.step = Step::Failed(reason);
    }
}
