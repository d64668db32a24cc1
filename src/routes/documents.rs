use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    document::{Document, DocumentTitle, Pagination},
    error::ApiError,
    identity::{self, Identity},
    startup::ApplicationState,
};

use super::{authorize, ensure};

#[derive(Deserialize)]
pub struct CreateDocument {
    pub title: Option<String>,
    pub initial_content: Option<String>,
}

#[derive(Deserialize)]
pub struct ListDocuments {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct DocumentIds {
    pub ids: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateTitle {
    pub title: String,
}

pub async fn create_document(
    State(state): State<ApplicationState>,
    identity: Option<Extension<Identity>>,
    Json(body): Json<CreateDocument>,
) -> Result<Json<Document>, ApiError> {
    let identity = identity.map(|Extension(i)| i);
    let owner = identity::require(identity.as_ref())?;

    let document = state
        .documents
        .create(owner, body.title, body.initial_content)
        .await?;

    tracing::info!(document = %document.id, owner = %owner.subject, "document created");
    Ok(Json(document))
}

pub async fn list_documents(
    State(state): State<ApplicationState>,
    identity: Option<Extension<Identity>>,
    Query(query): Query<ListDocuments>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let identity = identity.map(|Extension(i)| i);
    let caller = identity::require(identity.as_ref())?;

    let pagination = Pagination {
        limit: query.limit,
        offset: query.offset,
    };
    let documents = state
        .documents
        .list_visible(caller, query.search.as_deref(), pagination)
        .await?;

    Ok(Json(documents))
}

/// Batched id -> title lookup for listing UIs; unknown ids come back with a
/// placeholder name instead of failing the whole batch.
pub async fn document_titles(
    State(state): State<ApplicationState>,
    Json(body): Json<DocumentIds>,
) -> Result<Json<Vec<DocumentTitle>>, ApiError> {
    Ok(Json(state.documents.titles(&body.ids).await?))
}

pub async fn get_document(
    State(state): State<ApplicationState>,
    identity: Option<Extension<Identity>>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<Document>, ApiError> {
    let identity = identity.map(|Extension(i)| i);
    let (document, capabilities) = authorize(&state, identity.as_ref(), document_id).await?;

    // Read is the one entry point the public-read policy can open up to
    // anonymous callers. Every other operation still requires a verdict.
    if identity.is_none() && state.public_read {
        return Ok(Json(document));
    }

    ensure(capabilities.read, identity.as_ref())?;
    Ok(Json(document))
}

pub async fn update_title(
    State(state): State<ApplicationState>,
    identity: Option<Extension<Identity>>,
    Path(document_id): Path<Uuid>,
    Json(body): Json<UpdateTitle>,
) -> Result<Json<Document>, ApiError> {
    let identity = identity.map(|Extension(i)| i);
    let (mut document, capabilities) = authorize(&state, identity.as_ref(), document_id).await?;
    ensure(capabilities.write_title, identity.as_ref())?;

    state.documents.update_title(document.id, &body.title).await?;
    document.title = body.title;
    Ok(Json(document))
}

pub async fn delete_document(
    State(state): State<ApplicationState>,
    identity: Option<Extension<Identity>>,
    Path(document_id): Path<Uuid>,
) -> Result<(), ApiError> {
    let identity = identity.map(|Extension(i)| i);
    let (document, capabilities) = authorize(&state, identity.as_ref(), document_id).await?;
    ensure(capabilities.delete, identity.as_ref())?;

    state.documents.delete(document.id).await?;
    tracing::info!(document = %document.id, "document deleted");
    Ok(())
}
