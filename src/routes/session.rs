use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    identity::{self, Identity},
    realtime::{RealtimeSession, SessionScope},
    startup::ApplicationState,
};

use super::{authorize, ensure};

/// Mints a collaboration session for the document's room. The session scope
/// follows the caller's verdict: full edit access for owners, organization
/// members and shared editors, read-only for shared viewers.
pub async fn issue_session(
    State(state): State<ApplicationState>,
    identity: Option<Extension<Identity>>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<RealtimeSession>, ApiError> {
    let identity = identity.map(|Extension(i)| i);
    let caller = identity::require(identity.as_ref())?;

    let (document, capabilities) = authorize(&state, identity.as_ref(), document_id).await?;
    ensure(capabilities.read, identity.as_ref())?;

    let scope = if capabilities.realtime_edit {
        SessionScope::Edit
    } else {
        SessionScope::ReadOnly
    };

    let session = state.sessions.issue(caller, document.id, scope)?;

    tracing::info!(
        document = %document.id,
        subject = %caller.subject,
        ?scope,
        "realtime session issued"
    );
    Ok(Json(session))
}
