use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::identity::Identity;

pub const UNTITLED: &str = "Untitled document";
pub const MISSING_TITLE: &str = "Document not found";

const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub owner_id: String,
    pub organization_id: Option<String>,
    pub initial_content: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Minimal projection used by batched title lookups in listing UIs.
#[derive(Debug, Serialize)]
pub struct DocumentTitle {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 200)
    }

    fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Read/write access to document metadata. Content lives with the realtime
/// collaborator; this store only carries what authorization and listing need.
#[derive(Clone)]
pub struct DocumentStore {
    pool: PgPool,
}

impl DocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, sqlx::Error> {
        sqlx::query_as::<_, Document>(
            "SELECT id, title, owner_id, organization_id, initial_content, created_at
            FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Resolves ids to display titles, substituting a placeholder for ids
    /// that no longer exist. Order of the input is preserved.
    pub async fn titles(&self, ids: &[Uuid]) -> Result<Vec<DocumentTitle>, sqlx::Error> {
        let rows: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT id, title FROM documents WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids
            .iter()
            .map(|id| DocumentTitle {
                id: *id,
                name: rows
                    .iter()
                    .find(|(row_id, _)| row_id == id)
                    .map(|(_, title)| title.clone())
                    .unwrap_or_else(|| MISSING_TITLE.to_string()),
            })
            .collect())
    }

    pub async fn create(
        &self,
        owner: &Identity,
        title: Option<String>,
        initial_content: Option<String>,
    ) -> Result<Document, sqlx::Error> {
        sqlx::query_as::<_, Document>(
            "INSERT INTO documents (id, title, owner_id, organization_id, initial_content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, owner_id, organization_id, initial_content, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(title.unwrap_or_else(|| UNTITLED.to_string()))
        .bind(&owner.subject)
        .bind(&owner.organization_id)
        .bind(initial_content)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_title(&self, id: Uuid, title: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE documents SET title = $2 WHERE id = $1")
            .bind(id)
            .bind(title)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Explicit grants cascade with the row (FK constraint), so no orphaned
    /// grants survive a deletion.
    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Lists the documents visible to the caller: the organization's documents
    /// when the caller belongs to one, otherwise the caller's own. An optional
    /// search term filters on the title within the same scope.
    pub async fn list_visible(
        &self,
        identity: &Identity,
        search: Option<&str>,
        pagination: Pagination,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let (scope_column, scope_value) = match &identity.organization_id {
            Some(org_id) => ("organization_id", org_id.as_str()),
            None => ("owner_id", identity.subject.as_str()),
        };

        let query = format!(
            "SELECT id, title, owner_id, organization_id, initial_content, created_at
            FROM documents
            WHERE {} = $1 AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4",
            scope_column
        );

        sqlx::query_as::<_, Document>(&query)
            .bind(scope_value)
            .bind(search)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
    }
}
