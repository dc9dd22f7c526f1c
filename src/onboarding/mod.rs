//! Role-conditional onboarding workflow.
//!
//! A session walks role selection → cascading location pickers → detail
//! entry → validation → idempotent commit. The draft survives every
//! failure; only a successful commit (or abandoning the session) ends it.

pub mod commit;
pub mod session;
pub mod state;
pub mod validate;

pub use commit::ProfileCommitter;
pub use session::{LookupOutcome, OnboardingSession};
pub use state::{Draft, FailureReason, SessionState, Step};
pub use validate::validate;
