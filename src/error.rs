//! Error types for the AgriLink onboarding core.

use uuid::Uuid;

use crate::directory::Level;
use crate::roles::Field;

/// Top-level error type for the onboarding core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Location directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Commit error: {0}")]
    Commit(#[from] CommitError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Secure storage error: {0}")]
    SecureStore(#[from] SecureStoreError),

    #[error("A submission is already in flight for this session")]
    SubmissionInFlight,

    #[error("Operation not allowed in step {step}: {operation}")]
    InvalidTransition { step: String, operation: String },
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Backend store errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Location directory lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The given parent id does not exist at the level immediately above
    /// the requested one.
    #[error("Parent unit {parent_id} not found at level {expected_level}")]
    ParentNotFound {
        parent_id: Uuid,
        expected_level: Level,
    },

    /// Zero or more than one unit matched the name within the given scope.
    #[error("{matches} unit(s) named {name:?} at level {level} in scope")]
    AmbiguousOrMissing {
        level: Level,
        name: String,
        matches: usize,
    },

    /// Transient backend failure. Surfaced to the caller; never retried
    /// by the core itself.
    #[error("Network failure during directory lookup: {0}")]
    Network(String),
}

/// Structural validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No role selected")]
    MissingRole,

    #[error("Email is required")]
    MissingEmail,

    /// Role-required fields that are absent or blank, in declared order.
    #[error("Missing required fields: {}", format_fields(.0))]
    MissingFields(Vec<Field>),
}

fn format_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Commit-stage errors. Any of these aborts the submission with the draft
/// retained so the user can correct the guilty field and resubmit.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommitError {
    /// A location name could not be resolved to a stable identifier.
    /// Nothing has been written when this is returned.
    #[error("Could not resolve {level} {name:?} to an identifier")]
    LocationResolution { level: Level, name: String },

    #[error("Profile write failed: {0}")]
    Persistence(String),

    #[error("Network failure during commit: {0}")]
    Network(String),
}

/// Account/Auth collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No active session")]
    NoSession,

    #[error("Session lookup failed: {0}")]
    Lookup(String),
}

/// SecureStorage collaborator errors. Always best-effort from the core's
/// point of view.
#[derive(Debug, thiserror::Error)]
pub enum SecureStoreError {
    #[error("Secure storage read failed: {0}")]
    Read(String),

    #[error("Secure storage write failed: {0}")]
    Write(String),
}

/// Result type alias for the onboarding core.
pub type Result<T> = std::result::Result<T, Error>;
