use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    identity::{self, Identity},
    sharing::{SharingGrant, SharingRole},
    startup::ApplicationState,
};

use super::{authorize, ensure};

#[derive(Deserialize)]
pub struct UpsertShare {
    pub user_id: String,
    pub role: SharingRole,
}

#[derive(Serialize)]
pub struct ShareCreated {
    pub grant_id: Uuid,
}

pub async fn upsert_share(
    State(state): State<ApplicationState>,
    identity: Option<Extension<Identity>>,
    Path(document_id): Path<Uuid>,
    Json(body): Json<UpsertShare>,
) -> Result<Json<ShareCreated>, ApiError> {
    let identity = identity.map(|Extension(i)| i);
    let caller = identity::require(identity.as_ref())?;

    let (document, capabilities) = authorize(&state, identity.as_ref(), document_id).await?;
    ensure(capabilities.manage_sharing, identity.as_ref())?;

    // Rejected before any store mutation.
    if body.user_id == caller.subject {
        return Err(ApiError::InvalidOperation(
            "you cannot share a document with yourself".to_string(),
        ));
    }

    let grant_id = state
        .sharing
        .upsert_grant(document.id, &body.user_id, body.role)
        .await?;

    tracing::info!(
        document = %document.id,
        target = %body.user_id,
        role = ?body.role,
        "sharing grant upserted"
    );
    Ok(Json(ShareCreated { grant_id }))
}

pub async fn remove_share(
    State(state): State<ApplicationState>,
    identity: Option<Extension<Identity>>,
    Path((document_id, user_id)): Path<(Uuid, String)>,
) -> Result<(), ApiError> {
    let identity = identity.map(|Extension(i)| i);
    identity::require(identity.as_ref())?;

    let (document, capabilities) = authorize(&state, identity.as_ref(), document_id).await?;
    ensure(capabilities.manage_sharing, identity.as_ref())?;

    // Absent grant: still a success, revocation is idempotent.
    state.sharing.remove_grant(document.id, &user_id).await?;
    Ok(())
}

pub async fn list_shares(
    State(state): State<ApplicationState>,
    identity: Option<Extension<Identity>>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<Vec<SharingGrant>>, ApiError> {
    let identity = identity.map(|Extension(i)| i);
    identity::require(identity.as_ref())?;

    let (document, capabilities) = authorize(&state, identity.as_ref(), document_id).await?;
    ensure(capabilities.read, identity.as_ref())?;

    Ok(Json(state.sharing.list_grants(document.id).await?))
}
