use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Explicit, non-owner access tier. Mirrors the `sharing_role` enum in
/// Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sharing_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SharingRole {
    Viewer,
    Editor,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SharingGrant {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: String,
    pub role: SharingRole,
    pub created_at: DateTime<Utc>,
}

/// Durable (document, user) -> role mapping. Uniqueness of the pair is a
/// database constraint; concurrent upserts converge on one row.
#[derive(Clone)]
pub struct SharingStore {
    pool: PgPool,
}

impl SharingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the grant or updates the role of the existing one.
    pub async fn upsert_grant(
        &self,
        document_id: Uuid,
        user_id: &str,
        role: SharingRole,
    ) -> Result<Uuid, sqlx::Error> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO document_grants (id, document_id, user_id, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (document_id, user_id) DO UPDATE SET role = EXCLUDED.role
            RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(document_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Deleting an absent grant is a no-op, not an error.
    pub async fn remove_grant(&self, document_id: Uuid, user_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM document_grants WHERE document_id = $1 AND user_id = $2")
            .bind(document_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_grant(
        &self,
        document_id: Uuid,
        user_id: &str,
    ) -> Result<Option<SharingGrant>, sqlx::Error> {
        sqlx::query_as::<_, SharingGrant>(
            "SELECT id, document_id, user_id, role, created_at
            FROM document_grants WHERE document_id = $1 AND user_id = $2",
        )
        .bind(document_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// All grants for one document, in insertion order.
    pub async fn list_grants(&self, document_id: Uuid) -> Result<Vec<SharingGrant>, sqlx::Error> {
        sqlx::query_as::<_, SharingGrant>(
            "SELECT id, document_id, user_id, role, created_at
            FROM document_grants WHERE document_id = $1
            ORDER BY created_at, id",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_grants_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<SharingGrant>, sqlx::Error> {
        sqlx::query_as::<_, SharingGrant>(
            "SELECT id, document_id, user_id, role, created_at
            FROM document_grants WHERE user_id = $1
            ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Operational tooling only; never reachable from the HTTP surface.
    pub async fn list_all_grants(&self) -> Result<Vec<SharingGrant>, sqlx::Error> {
        sqlx::query_as::<_, SharingGrant>(
            "SELECT id, document_id, user_id, role, created_at
            FROM document_grants ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Operational tooling only. Returns the number of revoked grants.
    pub async fn remove_all_grants_for_user(&self, user_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM document_grants WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
