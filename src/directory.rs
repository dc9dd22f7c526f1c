//! Read-only catalog of administrative units.
//!
//! The directory resolves the four-level region → sub-region → LGA → ward
//! hierarchy. Unit names are only unique within a parent's children, so
//! every lookup below the root must be scoped by parent id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DirectoryError;

/// A level of the administrative hierarchy, root to leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Region,
    SubRegion,
    Lga,
    Ward,
}

impl Level {
    /// All levels, root to leaf.
    pub const ALL: [Level; 4] = [Level::Region, Level::SubRegion, Level::Lga, Level::Ward];

    /// The level immediately above, if any.
    pub fn parent(&self) -> Option<Level> {
        match self {
            Level::Region => None,
            Level::SubRegion => Some(Level::Region),
            Level::Lga => Some(Level::SubRegion),
            Level::Ward => Some(Level::Lga),
        }
    }

    /// The level immediately below, if any.
    pub fn child(&self) -> Option<Level> {
        match self {
            Level::Region => Some(Level::SubRegion),
            Level::SubRegion => Some(Level::Lga),
            Level::Lga => Some(Level::Ward),
            Level::Ward => None,
        }
    }

    /// Depth from the root (Region = 0).
    pub fn depth(&self) -> usize {
        match self {
            Level::Region => 0,
            Level::SubRegion => 1,
            Level::Lga => 2,
            Level::Ward => 3,
        }
    }

    /// Whether `self` is strictly deeper than `other`.
    pub fn is_below(&self, other: Level) -> bool {
        self.depth() > other.depth()
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Region => "region",
            Self::SubRegion => "sub_region",
            Self::Lga => "lga",
            Self::Ward => "ward",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "region" => Ok(Self::Region),
            "sub_region" => Ok(Self::SubRegion),
            "lga" => Ok(Self::Lga),
            "ward" => Ok(Self::Ward),
            other => Err(format!("Unknown level: {other}")),
        }
    }
}

/// A single node of the administrative hierarchy.
///
/// Invariant: every non-Region unit has exactly one parent at the level
/// immediately above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministrativeUnit {
    pub id: Uuid,
    pub name: String,
    pub level: Level,
    pub parent_id: Option<Uuid>,
}

impl AdministrativeUnit {
    /// Build a root-level (Region) unit with a fresh id.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            level: Level::Region,
            parent_id: None,
        }
    }

    /// Build a child unit of `parent` with a fresh id.
    ///
    /// Panics if `parent` is already a Ward.
    pub fn child_of(parent: &AdministrativeUnit, name: impl Into<String>) -> Self {
        let level = parent
            .level
            .child()
            .expect("ward units cannot have children");
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            level,
            parent_id: Some(parent.id),
        }
    }
}

/// Read-only hierarchical catalog of administrative units.
///
/// Implementations are side-effect free; selecting a unit has consequences
/// only in the onboarding draft (which cascades clearing of deeper levels),
/// never here.
#[async_trait]
pub trait LocationDirectory: Send + Sync {
    /// All units of `level` whose parent is `parent_id`, or all Region
    /// units when `parent_id` is `None`.
    ///
    /// Fails with [`DirectoryError::ParentNotFound`] when `parent_id` does
    /// not name an existing unit at the level immediately above `level`.
    async fn list_children(
        &self,
        parent_id: Option<Uuid>,
        level: Level,
    ) -> Result<Vec<AdministrativeUnit>, DirectoryError>;

    /// Resolve a unit name to its stable id within the given parent scope.
    ///
    /// Fails with [`DirectoryError::AmbiguousOrMissing`] when zero or more
    /// than one unit matches. Callers must always pass the narrowest known
    /// parent scope — names are not globally unique.
    async fn resolve_id(
        &self,
        name: &str,
        level: Level,
        parent_id: Option<Uuid>,
    ) -> Result<Uuid, DirectoryError>;
}
