//! Participant roles and the per-role required-field contract.
//!
//! `Role::required_fields` is the single source of truth for both field
//! visibility in the UI and submission validation — neither side may
//! duplicate the table.

use serde::{Deserialize, Serialize};

/// A participant in the agricultural value chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Producer,
    ProcessingSiteOwner,
    StorageOperator,
    Organization,
}

/// A draft field that validation can demand.
///
/// Declared order is the canonical validation order: missing-field lists
/// are always reported in this order so error messages are reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FullName,
    Region,
    SubRegion,
    Lga,
    Ward,
    RegistrationNumber,
    OrganizationName,
}

/// Fields required for each role, beyond role and email (always required).
const PRODUCER_FIELDS: &[Field] = &[
    Field::FullName,
    Field::Region,
    Field::SubRegion,
    Field::Lga,
    Field::Ward,
];

const PROCESSING_SITE_OWNER_FIELDS: &[Field] = &[
    Field::FullName,
    Field::Region,
    Field::SubRegion,
    Field::Lga,
    Field::Ward,
    Field::RegistrationNumber,
];

const STORAGE_OPERATOR_FIELDS: &[Field] = &[Field::OrganizationName];

const ORGANIZATION_FIELDS: &[Field] = &[Field::OrganizationName];

impl Role {
    /// All roles, in presentation order.
    pub const ALL: [Role; 4] = [
        Role::Producer,
        Role::ProcessingSiteOwner,
        Role::StorageOperator,
        Role::Organization,
    ];

    /// Fields this role requires beyond role and email.
    pub fn required_fields(&self) -> &'static [Field] {
        match self {
            Role::Producer => PRODUCER_FIELDS,
            Role::ProcessingSiteOwner => PROCESSING_SITE_OWNER_FIELDS,
            Role::StorageOperator => STORAGE_OPERATOR_FIELDS,
            Role::Organization => ORGANIZATION_FIELDS,
        }
    }

    /// Whether this role must complete the administrative-hierarchy steps.
    pub fn requires_location(&self) -> bool {
        self.required_fields().contains(&Field::Region)
    }

    /// Whether `field` is part of this role's contract.
    pub fn requires(&self, field: Field) -> bool {
        self.required_fields().contains(&field)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Producer => "producer",
            Self::ProcessingSiteOwner => "processing_site_owner",
            Self::StorageOperator => "storage_operator",
            Self::Organization => "organization",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "producer" => Ok(Self::Producer),
            "processing_site_owner" => Ok(Self::ProcessingSiteOwner),
            "storage_operator" => Ok(Self::StorageOperator),
            "organization" => Ok(Self::Organization),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::FullName => "full_name",
            Self::Region => "region",
            Self::SubRegion => "sub_region",
            Self::Lga => "lga",
            Self::Ward => "ward",
            Self::RegistrationNumber => "registration_number",
            Self::OrganizationName => "organization_name",
        };
        write!(f, "{s}")
    }
}
