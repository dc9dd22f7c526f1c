//! Backend store trait for profile persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::profile::{NewProfile, ProfileRecord};

/// Key-scoped profile store, agnostic to transport.
///
/// Implemented by [`LibSqlBackend`](crate::store::LibSqlBackend) for real
/// persistence and [`MemoryBackend`](crate::store::MemoryBackend) for
/// tests; the onboarding core only ever sees this trait.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert or overwrite the profile for `profile.account_id`.
    ///
    /// `account_id` is the conflict key: at most one record per account
    /// ever exists. On first insert both timestamps are set to now; on
    /// conflict `created_at` is preserved and every other column is
    /// overwritten. Returns the stored record.
    async fn upsert_profile(&self, profile: &NewProfile) -> Result<ProfileRecord, DatabaseError>;

    /// Fetch the profile for an account, if one was ever committed.
    async fn get_profile(&self, account_id: Uuid) -> Result<Option<ProfileRecord>, DatabaseError>;
}
