//! Profile commit — name→id resolution plus idempotent upsert.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::Identity;
use crate::directory::{Level, LocationDirectory};
use crate::error::{CommitError, DirectoryError};
use crate::onboarding::state::Draft;
use crate::profile::{NewProfile, ProfileRecord};
use crate::roles::{Field, Role};
use crate::secure::{SecureStorage, ROLE_HINT_KEY};
use crate::store::ProfileStore;

/// Converts a validated draft into a persisted [`ProfileRecord`].
///
/// Resolution is all-or-nothing: every location name is resolved to its
/// stable id before anything is written, so a failed resolution leaves the
/// backend untouched. The upsert itself is idempotent on `account_id`, so
/// a user-initiated resubmission after a transient failure is always safe.
pub struct ProfileCommitter {
    directory: Arc<dyn LocationDirectory>,
    store: Arc<dyn ProfileStore>,
    secure: Arc<dyn SecureStorage>,
}

impl ProfileCommitter {
    pub fn new(
        directory: Arc<dyn LocationDirectory>,
        store: Arc<dyn ProfileStore>,
        secure: Arc<dyn SecureStorage>,
    ) -> Self {
        Self {
            directory,
            store,
            secure,
        }
    }

    /// Commit a draft for `identity`. The caller must have validated the
    /// draft against `role`'s contract first.
    ///
    /// 1. Resolve location names narrowest-first (region unscoped, each
    ///    child scoped to its resolved parent id). Skipped entirely for
    ///    roles without a location requirement.
    /// 2. Build the payload — `registration_number`/`organization_name`
    ///    are explicitly `None` unless the role requires them, never stale
    ///    from a prior role selection.
    /// 3. Upsert on `account_id`; the store preserves `created_at` when a
    ///    record already exists.
    /// 4. Best-effort: cache the role hint in secure storage. Its failure
    ///    is logged and does not fail the commit.
    pub async fn commit(
        &self,
        identity: &Identity,
        draft: &Draft,
        role: Role,
    ) -> Result<ProfileRecord, CommitError> {
        let location_ids = if role.requires_location() {
            self.resolve_hierarchy(draft).await?
        } else {
            [None; 4]
        };

        let payload = NewProfile {
            account_id: identity.account_id,
            email: identity.email.clone(),
            full_name: draft.full_name.clone().unwrap_or_default(),
            role,
            region_id: location_ids[0],
            sub_region_id: location_ids[1],
            lga_id: location_ids[2],
            ward_id: location_ids[3],
            registration_number: required_or_none(draft, role, Field::RegistrationNumber),
            organization_name: required_or_none(draft, role, Field::OrganizationName),
        };

        let record = self
            .store
            .upsert_profile(&payload)
            .await
            .map_err(|e| CommitError::Persistence(e.to_string()))?;

        info!(account_id = %record.account_id, role = %record.role, "Profile committed");

        if let Err(e) = self.secure.set(ROLE_HINT_KEY, &role.to_string()).await {
            warn!("Failed to cache role hint: {e}");
        }

        Ok(record)
    }

    /// Resolve the four location names root-to-leaf, each scoped to the id
    /// resolved at the level above.
    async fn resolve_hierarchy(&self, draft: &Draft) -> Result<[Option<Uuid>; 4], CommitError> {
        let mut ids = [None; 4];
        let mut parent: Option<Uuid> = None;
        for level in Level::ALL {
            let name = draft
                .location_name(level)
                .ok_or_else(|| CommitError::LocationResolution {
                    level,
                    name: String::new(),
                })?;
            let id = self
                .directory
                .resolve_id(name, level, parent)
                .await
                .map_err(|e| match e {
                    DirectoryError::Network(msg) => CommitError::Network(msg),
                    _ => CommitError::LocationResolution {
                        level,
                        name: name.to_string(),
                    },
                })?;
            debug!(%level, name, %id, "Resolved location");
            ids[level.depth()] = Some(id);
            parent = Some(id);
        }
        Ok(ids)
    }
}

/// The draft's value for `field` when `role` requires it, otherwise `None`.
fn required_or_none(draft: &Draft, role: Role, field: Field) -> Option<String> {
    if role.requires(field) {
        draft.field_value(field).map(str::to_string)
    } else {
        None
    }
}
