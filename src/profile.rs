//! Persisted profile records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::Role;

/// A committed participant profile, keyed by account id.
///
/// Exactly one record exists per account: repeated onboarding submissions
/// upsert on `account_id`. `created_at` is set on first creation and
/// preserved on every subsequent overwrite; `updated_at` moves each time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub account_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub region_id: Option<Uuid>,
    pub sub_region_id: Option<Uuid>,
    pub lga_id: Option<Uuid>,
    pub ward_id: Option<Uuid>,
    pub registration_number: Option<String>,
    pub organization_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The payload handed to the store for an upsert. Timestamps are assigned
/// by the store (insert sets both, update preserves `created_at`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub account_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub region_id: Option<Uuid>,
    pub sub_region_id: Option<Uuid>,
    pub lga_id: Option<Uuid>,
    pub ward_id: Option<Uuid>,
    pub registration_number: Option<String>,
    pub organization_name: Option<String>,
}

impl ProfileRecord {
    /// The four location ids root-to-leaf, for display and tests.
    pub fn location_ids(&self) -> [Option<Uuid>; 4] {
        [self.region_id, self.sub_region_id, self.lga_id, self.ward_id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serde_roundtrip() {
        let record = ProfileRecord {
            account_id: Uuid::new_v4(),
            email: "a@x.com".into(),
            full_name: "Jane".into(),
            role: Role::Producer,
            region_id: Some(Uuid::new_v4()),
            sub_region_id: Some(Uuid::new_v4()),
            lga_id: Some(Uuid::new_v4()),
            ward_id: Some(Uuid::new_v4()),
            registration_number: None,
            organization_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: ProfileRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn location_ids_root_to_leaf() {
        let region = Uuid::new_v4();
        let record = ProfileRecord {
            account_id: Uuid::new_v4(),
            email: "b@y.com".into(),
            full_name: String::new(),
            role: Role::Organization,
            region_id: Some(region),
            sub_region_id: None,
            lga_id: None,
            ward_id: None,
            registration_number: None,
            organization_name: Some("CoopX".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(record.location_ids(), [Some(region), None, None, None]);
    }
}
