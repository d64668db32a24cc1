mod documents;
mod session;
mod sharing;
mod users;

pub use documents::*;
pub use session::*;
pub use sharing::*;
pub use users::*;

use uuid::Uuid;

use crate::{
    access::{self, AccessVerdict, Capabilities},
    document::Document,
    error::ApiError,
    identity::Identity,
    startup::ApplicationState,
};

/// Entry-point preamble shared by every authorized route: fetch the document,
/// fetch the caller's explicit grant only when ownership and organization
/// membership have not already decided the verdict, and resolve.
pub(crate) async fn authorize(
    state: &ApplicationState,
    identity: Option<&Identity>,
    document_id: Uuid,
) -> Result<(Document, Capabilities), ApiError> {
    let document = state
        .documents
        .get(document_id)
        .await?
        .ok_or(ApiError::DocumentNotFound(document_id))?;

    let mut verdict = access::resolve(identity, &document, None);
    if verdict == AccessVerdict::Denied {
        if let Some(identity) = identity {
            let grant = state
                .sharing
                .get_grant(document.id, &identity.subject)
                .await?;
            verdict = access::resolve(Some(identity), &document, grant.as_ref());
        }
    }

    Ok((document, verdict.capabilities()))
}

/// Translates a missing capability into the right failure: anonymous callers
/// get a 401, resolved callers with an insufficient verdict a 403.
pub(crate) fn ensure(allowed: bool, identity: Option<&Identity>) -> Result<(), ApiError> {
    if allowed {
        return Ok(());
    }
    match identity {
        None => Err(ApiError::Unauthenticated("not signed in".to_string())),
        Some(identity) => {
            tracing::warn!(subject = %identity.subject, "capability check failed");
            Err(ApiError::Forbidden)
        }
    }
}
