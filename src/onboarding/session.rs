//! OnboardingSession — coordinates the draft, the location directory, and
//! the commit path for one user's onboarding attempt.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::auth::{AccountService, Identity};
use crate::directory::{AdministrativeUnit, Level, LocationDirectory};
use crate::error::{Error, Result};
use crate::onboarding::commit::ProfileCommitter;
use crate::onboarding::state::{Draft, FailureReason, SessionState, Step};
use crate::onboarding::validate::validate;
use crate::profile::ProfileRecord;
use crate::roles::{Field, Role};
use crate::secure::SecureStorage;
use crate::store::ProfileStore;

/// Result of a cascading option lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Options for the requested level, in catalog order.
    Options(Vec<AdministrativeUnit>),
    /// A higher-level selection changed while the lookup was in flight;
    /// the stale result was discarded and must not be applied.
    Superseded,
}

/// One user's onboarding attempt.
///
/// Owns the session state exclusively; nothing is shared across sessions.
/// Collaborators come in as trait objects so tests substitute in-memory
/// fakes for the backend, auth, and secure storage.
pub struct OnboardingSession {
    directory: Arc<dyn LocationDirectory>,
    committer: ProfileCommitter,
    identity: Identity,
    state: Arc<RwLock<SessionState>>,
}

impl OnboardingSession {
    /// Start a session for the currently authenticated account.
    pub async fn start(
        directory: Arc<dyn LocationDirectory>,
        store: Arc<dyn ProfileStore>,
        accounts: Arc<dyn AccountService>,
        secure: Arc<dyn SecureStorage>,
    ) -> Result<Self> {
        let identity = accounts.current_identity().await?;
        let state = SessionState::new(identity.email.clone());
        Ok(Self {
            directory: Arc::clone(&directory),
            committer: ProfileCommitter::new(directory, store, secure),
            identity,
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// The current step.
    pub async fn step(&self) -> Step {
        self.state.read().await.step.clone()
    }

    /// Snapshot of the current draft.
    pub async fn draft(&self) -> Draft {
        self.state.read().await.draft.clone()
    }

    /// Select (or change) the participant role.
    pub async fn set_role(&self, role: Role) -> Result<()> {
        self.state.write().await.set_role(role)
    }

    /// Select a unit name at a hierarchy level, cascading clears below it.
    pub async fn set_location(&self, level: Level, name: impl Into<String>) -> Result<()> {
        self.state.write().await.set_location(level, name)
    }

    /// Set a non-location detail field.
    pub async fn set_detail(&self, field: Field, value: impl Into<String>) -> Result<()> {
        self.state.write().await.set_detail(field, value)
    }

    /// Fetch the selectable options for `level` given the current
    /// higher-level selections.
    ///
    /// Lookups are causally ordered: the parent chain is resolved to ids
    /// narrowest-first before the children are listed. If the user changes
    /// any role or location selection while this is in flight, the result
    /// is discarded and `Superseded` returned — stale options are never
    /// applied over a newer selection.
    pub async fn load_options(&self, level: Level) -> Result<LookupOutcome> {
        let (epoch, step, draft) = {
            let state = self.state.read().await;
            (state.epoch, state.step.clone(), state.draft.clone())
        };

        // Resolve the parent chain down to the requested level's parent.
        let mut parent_id = None;
        for ancestor in Level::ALL.into_iter().filter(|l| level.is_below(*l)) {
            let name = draft
                .location_name(ancestor)
                .ok_or_else(|| Error::InvalidTransition {
                    step: step.to_string(),
                    operation: format!("load_options({level}) without a {ancestor} selection"),
                })?;
            parent_id = Some(self.directory.resolve_id(name, ancestor, parent_id).await?);
        }

        let options = self.directory.list_children(parent_id, level).await?;

        if self.state.read().await.epoch != epoch {
            debug!(%level, "Discarding stale option lookup");
            return Ok(LookupOutcome::Superseded);
        }
        Ok(LookupOutcome::Options(options))
    }

    /// Validate and commit the draft.
    ///
    /// Moves Validating → Submitting → Committed. Any failure moves to
    /// `Failed` with the reason attached and the draft retained, so the
    /// user can correct fields and resubmit. At most one submission may be
    /// in flight: a concurrent call returns [`Error::SubmissionInFlight`]
    /// without touching the network.
    pub async fn submit(&self) -> Result<ProfileRecord> {
        let (draft, role) = {
            let mut state = self.state.write().await;
            state.begin_submit()?;

            // Validating — purely structural, done under the lock.
            let role = match validate(&state.draft) {
                Ok(role) => role,
                Err(e) => {
                    state.fail(FailureReason::Validation(e.clone()));
                    return Err(Error::Validation(e));
                }
            };
            state.step = Step::Submitting;
            (state.draft.clone(), role)
        };

        match self.committer.commit(&self.identity, &draft, role).await {
            Ok(record) => {
                self.state.write().await.step = Step::Committed;
                Ok(record)
            }
            Err(e) => {
                self.state
                    .write()
                    .await
                    .fail(FailureReason::Commit(e.clone()));
                Err(Error::Commit(e))
            }
        }
    }
}
