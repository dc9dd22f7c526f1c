//! libSQL backend — implements both the profile store and the location
//! directory over one local (or in-memory) database.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{params, Connection, Database as LibSqlDatabase};
use tracing::{debug, info};
use uuid::Uuid;

use crate::directory::{AdministrativeUnit, Level, LocationDirectory};
use crate::error::{DatabaseError, DirectoryError};
use crate::profile::{NewProfile, ProfileRecord};
use crate::roles::Role;
use crate::store::migrations;
use crate::store::traits::ProfileStore;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("Failed to open libSQL database: {e}"))
            })?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        info!(path = %path.display(), "Database opened");
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Create an in-memory database (for tests and demos).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Load (or reload) catalog units. Replaces rows with matching ids.
    pub async fn seed_units(&self, units: &[AdministrativeUnit]) -> Result<(), DatabaseError> {
        for unit in units {
            self.conn()
                .execute(
                    "INSERT OR REPLACE INTO administrative_units (id, name, level, parent_id)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        unit.id.to_string(),
                        unit.name.as_str(),
                        unit.level.to_string(),
                        opt_id(unit.parent_id),
                    ],
                )
                .await
                .map_err(|e| DatabaseError::Query(format!("seed_units: {e}")))?;
        }
        debug!(count = units.len(), "Catalog units seeded");
        Ok(())
    }

    /// Number of catalog units, for emptiness checks at startup.
    pub async fn count_units(&self) -> Result<i64, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT COUNT(*) FROM administrative_units", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("count_units: {e}")))?;
        match rows.next().await {
            Ok(Some(row)) => row
                .get(0)
                .map_err(|e| DatabaseError::Query(format!("count_units parse: {e}"))),
            Ok(None) => Ok(0),
            Err(e) => Err(DatabaseError::Query(format!("count_units: {e}"))),
        }
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Convert `Option<Uuid>` to a libsql Value.
fn opt_id(id: Option<Uuid>) -> libsql::Value {
    match id {
        Some(id) => libsql::Value::Text(id.to_string()),
        None => libsql::Value::Null,
    }
}

/// Convert `Option<&str>` to a libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

fn parse_uuid(s: &str, context: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::Query(format!("{context}: bad uuid {s:?}: {e}")))
}

fn parse_opt_uuid(s: Option<String>, context: &str) -> Result<Option<Uuid>, DatabaseError> {
    s.map(|s| parse_uuid(&s, context)).transpose()
}

/// Map a libsql row to an AdministrativeUnit.
///
/// Column order matches UNIT_COLUMNS: 0:id, 1:name, 2:level, 3:parent_id.
fn row_to_unit(row: &libsql::Row) -> Result<AdministrativeUnit, DatabaseError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("unit id: {e}")))?;
    let name: String = row
        .get(1)
        .map_err(|e| DatabaseError::Query(format!("unit name: {e}")))?;
    let level_str: String = row
        .get(2)
        .map_err(|e| DatabaseError::Query(format!("unit level: {e}")))?;
    let parent_str: Option<String> = row.get(3).ok();

    Ok(AdministrativeUnit {
        id: parse_uuid(&id_str, "unit id")?,
        name,
        level: level_str
            .parse()
            .map_err(|e: String| DatabaseError::Query(format!("unit level: {e}")))?,
        parent_id: parse_opt_uuid(parent_str, "unit parent_id")?,
    })
}

/// Map a libsql row to a ProfileRecord.
///
/// Column order matches PROFILE_COLUMNS:
/// 0:account_id, 1:email, 2:full_name, 3:role, 4:region_id,
/// 5:sub_region_id, 6:lga_id, 7:ward_id, 8:registration_number,
/// 9:organization_name, 10:created_at, 11:updated_at.
fn row_to_profile(row: &libsql::Row) -> Result<ProfileRecord, DatabaseError> {
    let account_str: String = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("profile account_id: {e}")))?;
    let role_str: String = row
        .get(3)
        .map_err(|e| DatabaseError::Query(format!("profile role: {e}")))?;
    let role: Role = role_str
        .parse()
        .map_err(|e: String| DatabaseError::Query(format!("profile role: {e}")))?;
    let created_str: String = row
        .get(10)
        .map_err(|e| DatabaseError::Query(format!("profile created_at: {e}")))?;
    let updated_str: String = row
        .get(11)
        .map_err(|e| DatabaseError::Query(format!("profile updated_at: {e}")))?;

    Ok(ProfileRecord {
        account_id: parse_uuid(&account_str, "profile account_id")?,
        email: row
            .get(1)
            .map_err(|e| DatabaseError::Query(format!("profile email: {e}")))?,
        full_name: row
            .get(2)
            .map_err(|e| DatabaseError::Query(format!("profile full_name: {e}")))?,
        role,
        region_id: parse_opt_uuid(row.get(4).ok(), "profile region_id")?,
        sub_region_id: parse_opt_uuid(row.get(5).ok(), "profile sub_region_id")?,
        lga_id: parse_opt_uuid(row.get(6).ok(), "profile lga_id")?,
        ward_id: parse_opt_uuid(row.get(7).ok(), "profile ward_id")?,
        registration_number: row.get(8).ok(),
        organization_name: row.get(9).ok(),
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

// ── Trait implementations ───────────────────────────────────────────

const UNIT_COLUMNS: &str = "id, name, level, parent_id";

const PROFILE_COLUMNS: &str = "account_id, email, full_name, role, region_id, sub_region_id, lga_id, ward_id, registration_number, organization_name, created_at, updated_at";

#[async_trait]
impl LocationDirectory for LibSqlBackend {
    async fn list_children(
        &self,
        parent_id: Option<Uuid>,
        level: Level,
    ) -> Result<Vec<AdministrativeUnit>, DirectoryError> {
        let conn = self.conn();

        // A concrete parent must exist at the level immediately above.
        if let (Some(parent), Some(parent_level)) = (parent_id, level.parent()) {
            let mut rows = conn
                .query(
                    "SELECT COUNT(*) FROM administrative_units WHERE id = ?1 AND level = ?2",
                    params![parent.to_string(), parent_level.to_string()],
                )
                .await
                .map_err(|e| DirectoryError::Network(format!("list_children: {e}")))?;
            let count: i64 = match rows.next().await {
                Ok(Some(row)) => row.get(0).unwrap_or(0),
                Ok(None) => 0,
                Err(e) => return Err(DirectoryError::Network(format!("list_children: {e}"))),
            };
            if count == 0 {
                return Err(DirectoryError::ParentNotFound {
                    parent_id: parent,
                    expected_level: parent_level,
                });
            }
        }

        let mut rows = match parent_id {
            Some(parent) => conn
                .query(
                    &format!(
                        "SELECT {UNIT_COLUMNS} FROM administrative_units
                         WHERE level = ?1 AND parent_id = ?2 ORDER BY name"
                    ),
                    params![level.to_string(), parent.to_string()],
                )
                .await,
            None => conn
                .query(
                    &format!(
                        "SELECT {UNIT_COLUMNS} FROM administrative_units
                         WHERE level = ?1 AND parent_id IS NULL ORDER BY name"
                    ),
                    params![level.to_string()],
                )
                .await,
        }
        .map_err(|e| DirectoryError::Network(format!("list_children: {e}")))?;

        let mut units = Vec::new();
        loop {
            match rows.next().await {
                Ok(Some(row)) => units.push(
                    row_to_unit(&row)
                        .map_err(|e| DirectoryError::Network(format!("list_children: {e}")))?,
                ),
                Ok(None) => break,
                Err(e) => return Err(DirectoryError::Network(format!("list_children: {e}"))),
            }
        }
        Ok(units)
    }

    async fn resolve_id(
        &self,
        name: &str,
        level: Level,
        parent_id: Option<Uuid>,
    ) -> Result<Uuid, DirectoryError> {
        let conn = self.conn();
        let mut rows = match parent_id {
            Some(parent) => conn
                .query(
                    "SELECT id FROM administrative_units
                     WHERE name = ?1 AND level = ?2 AND parent_id = ?3",
                    params![name, level.to_string(), parent.to_string()],
                )
                .await,
            None => conn
                .query(
                    "SELECT id FROM administrative_units
                     WHERE name = ?1 AND level = ?2 AND parent_id IS NULL",
                    params![name, level.to_string()],
                )
                .await,
        }
        .map_err(|e| DirectoryError::Network(format!("resolve_id: {e}")))?;

        let mut matches = Vec::new();
        loop {
            match rows.next().await {
                Ok(Some(row)) => {
                    let id_str: String = row
                        .get(0)
                        .map_err(|e| DirectoryError::Network(format!("resolve_id: {e}")))?;
                    matches.push(
                        Uuid::parse_str(&id_str)
                            .map_err(|e| DirectoryError::Network(format!("resolve_id: {e}")))?,
                    );
                }
                Ok(None) => break,
                Err(e) => return Err(DirectoryError::Network(format!("resolve_id: {e}"))),
            }
        }

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
impl ProfileStore for LibSqlBackend {
    async fn upsert_profile(&self, profile: &NewProfile) -> Result<ProfileRecord, DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO profiles (account_id, email, full_name, role, region_id, sub_region_id, lga_id, ward_id, registration_number, organization_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(account_id) DO UPDATE SET
                email = excluded.email,
                full_name = excluded.full_name,
                role = excluded.role,
                region_id = excluded.region_id,
                sub_region_id = excluded.sub_region_id,
                lga_id = excluded.lga_id,
                ward_id = excluded.ward_id,
                registration_number = excluded.registration_number,
                organization_name = excluded.organization_name,
                updated_at = excluded.updated_at",
            params![
                profile.account_id.to_string(),
                profile.email.as_str(),
                profile.full_name.as_str(),
                profile.role.to_string(),
                opt_id(profile.region_id),
                opt_id(profile.sub_region_id),
                opt_id(profile.lga_id),
                opt_id(profile.ward_id),
                opt_text(profile.registration_number.as_deref()),
                opt_text(profile.organization_name.as_deref()),
                now.as_str(),
                now.as_str(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("upsert_profile: {e}")))?;

        debug!(account_id = %profile.account_id, "Profile upserted");

        self.get_profile(profile.account_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "profile".into(),
                id: profile.account_id.to_string(),
            })
    }

    async fn get_profile(&self, account_id: Uuid) -> Result<Option<ProfileRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE account_id = ?1"),
                params![account_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_profile: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_profile(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_profile: {e}"))),
        }
    }
}
