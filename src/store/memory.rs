//! In-memory backend — the same contract as the libSQL backend, for
//! tests and any caller that wants to substitute the remote store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::directory::{AdministrativeUnit, Level, LocationDirectory};
use crate::error::{DatabaseError, DirectoryError};
use crate::profile::{NewProfile, ProfileRecord};
use crate::store::traits::ProfileStore;

/// In-memory catalog + profile store.
#[derive(Default)]
pub struct MemoryBackend {
    units: RwLock<Vec<AdministrativeUnit>>,
    profiles: RwLock<HashMap<Uuid, ProfileRecord>>,
    upsert_calls: AtomicUsize,
    upsert_delay: Option<Duration>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend pre-loaded with catalog units.
    pub async fn with_units(units: Vec<AdministrativeUnit>) -> Self {
        let backend = Self::new();
        backend.seed_units(units).await;
        backend
    }

    /// Delay every upsert, so tests can observe in-flight submissions.
    pub fn with_upsert_delay(mut self, delay: Duration) -> Self {
        self.upsert_delay = Some(delay);
        self
    }

    pub async fn seed_units(&self, units: Vec<AdministrativeUnit>) {
        self.units.write().await.extend(units);
    }

    /// How many upserts have been issued, for duplicate-call assertions.
    pub fn upsert_count(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationDirectory for MemoryBackend {
    async fn list_children(
        &self,
        parent_id: Option<Uuid>,
        level: Level,
    ) -> Result<Vec<AdministrativeUnit>, DirectoryError> {
        let units = self.units.read().await;

        if let (Some(parent), Some(parent_level)) = (parent_id, level.parent()) {
            let parent_exists = units
                .iter()
                .any(|u| u.id == parent && u.level == parent_level);
            if !parent_exists {
                return Err(DirectoryError::ParentNotFound {
                    parent_id: parent,
                    expected_level: parent_level,
                });
            }
        }

        let mut children: Vec<_> = units
            .iter()
            .filter(|u| u.level == level && u.parent_id == parent_id)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn resolve_id(
        &self,
        name: &str,
        level: Level,
        parent_id: Option<Uuid>,
    ) -> Result<Uuid, DirectoryError> {
        let units = self.units.read().await;
        let matches: Vec<_> = units
            .iter()
            .filter(|u| u.level == level && u.parent_id == parent_id && u.name == name)
            .map(|u| u.id)
            .collect();
        match matches.as_slice() {
            [id] => Ok(*id),
            _ => Err(DirectoryError::AmbiguousOrMissing {
                level,
                name: name.to_string(),
                matches: matches.len(),
            }),
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryBackend {
    async fn upsert_profile(&self, profile: &NewProfile) -> Result<ProfileRecord, DatabaseError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.upsert_delay {
            tokio::time::sleep(delay).await;
        }

        let now = Utc::now();
        let mut profiles = self.profiles.write().await;
        let created_at = profiles
            .get(&profile.account_id)
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let record = ProfileRecord {
            account_id: profile.account_id,
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            role: profile.role,
            region_id: profile.region_id,
            sub_region_id: profile.sub_region_id,
            lga_id: profile.lga_id,
            ward_id: profile.ward_id,
            registration_number: profile.registration_number.clone(),
            organization_name: profile.organization_name.clone(),
            created_at,
            updated_at: now,
        };
        profiles.insert(profile.account_id, record.clone());
        Ok(record)
    }

    async fn get_profile(&self, account_id: Uuid) -> Result<Option<ProfileRecord>, DatabaseError> {
        Ok(self.profiles.read().await.get(&account_id).cloned())
    }
}
