//! Admin registry storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, instrument};

use super::models::{AdminRecord, AdminSeed};
use crate::auth::Role;

/// Registry lookup failures. Always an infrastructure problem, never a
/// statement about the caller.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("admin registry query failed: {0}")]
    Store(#[from] sqlx::Error),

    #[error("admin registry lookup timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("corrupt admin registry row for {uid}: {reason}")]
    Corrupt { uid: String, reason: String },
}

/// Read access to the administrator registry.
#[async_trait]
pub trait AdminRegistry: Send + Sync {
    /// Look up an entry by external account id.
    async fn find_by_uid(&self, uid: &str) -> Result<Option<AdminRecord>, RegistryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    uid: String,
    email: String,
    role: String,
    created_at: String,
}

impl TryFrom<AdminRow> for AdminRecord {
    type Error = RegistryError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| RegistryError::Corrupt {
            uid: row.uid.clone(),
            reason,
        };

        let role = row.role.parse::<Role>().map_err(corrupt)?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| corrupt(e.to_string()))?
            .with_timezone(&Utc);

        Ok(AdminRecord {
            uid: row.uid,
            email: row.email,
            role,
            created_at,
        })
    }
}

/// SQLite-backed registry.
#[derive(Debug, Clone)]
pub struct SqliteAdminRegistry {
    pool: SqlitePool,
}

impl SqliteAdminRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a configured administrator.
    #[instrument(skip(self, seed), fields(uid = %seed.uid))]
    pub async fn upsert(&self, seed: &AdminSeed) -> Result<(), RegistryError> {
        debug!("Seeding administrator {}", seed.email);

        sqlx::query(
            r#"
            INSERT INTO admins (uid, email, role, created_at)
            VALUES (?, ?, 'admin', ?)
            ON CONFLICT(uid) DO UPDATE SET email = excluded.email, role = 'admin'
            "#,
        )
        .bind(&seed.uid)
        .bind(&seed.email)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List every registry entry, oldest first.
    pub async fn list(&self) -> Result<Vec<AdminRecord>, RegistryError> {
        let rows: Vec<AdminRow> = sqlx::query_as(
            "SELECT uid, email, role, created_at FROM admins ORDER BY created_at, uid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AdminRecord::try_from).collect()
    }
}

#[async_trait]
impl AdminRegistry for SqliteAdminRegistry {
    #[instrument(skip(self))]
    async fn find_by_uid(&self, uid: &str) -> Result<Option<AdminRecord>, RegistryError> {
        let row: Option<AdminRow> =
            sqlx::query_as("SELECT uid, email, role, created_at FROM admins WHERE uid = ?")
                .bind(uid)
                .fetch_optional(&self.pool)
                .await?;

        row.map(AdminRecord::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn seed(uid: &str, email: &str) -> AdminSeed {
        AdminSeed {
            uid: uid.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_by_uid() {
        let db = Database::in_memory().await.unwrap();
        let registry = SqliteAdminRegistry::new(db.pool().clone());
        registry.upsert(&seed("uid-1", "admin@x.com")).await.unwrap();

        let record = registry.find_by_uid("uid-1").await.unwrap().unwrap();
        assert_eq!(record.email, "admin@x.com");
        assert_eq!(record.role, Role::Admin);

        assert!(registry.find_by_uid("uid-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_is_by_uid_not_email() {
        let db = Database::in_memory().await.unwrap();
        let registry = SqliteAdminRegistry::new(db.pool().clone());
        registry.upsert(&seed("uid-1", "admin@x.com")).await.unwrap();

        assert!(registry.find_by_uid("admin@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        let registry = SqliteAdminRegistry::new(db.pool().clone());
        registry.upsert(&seed("uid-1", "old@x.com")).await.unwrap();
        registry.upsert(&seed("uid-1", "new@x.com")).await.unwrap();

        let all = registry.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email, "new@x.com");
    }
}
