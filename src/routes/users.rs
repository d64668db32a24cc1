use axum::{Extension, Json};
use serde::Serialize;

use crate::{
    error::ApiError,
    identity::{self, Identity},
};

#[derive(Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Shareable-user listing is best-effort: the user directory belongs to the
/// identity provider, and when it is unavailable callers get an empty list
/// rather than an error.
pub async fn list_users(
    identity: Option<Extension<Identity>>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let identity = identity.map(|Extension(i)| i);
    identity::require(identity.as_ref())?;

    // TODO: query the identity provider's directory API, scoped to the
    // caller's organization.
    Ok(Json(Vec::new()))
}

pub async fn current_user(
    identity: Option<Extension<Identity>>,
) -> Result<Json<UserProfile>, ApiError> {
    let identity = identity.map(|Extension(i)| i);
    let caller = identity::require(identity.as_ref())?;

    Ok(Json(UserProfile {
        id: caller.subject.clone(),
        name: caller
            .display_name
            .clone()
            .or_else(|| caller.email.clone())
            .unwrap_or_else(|| "Anonymous".to_string()),
        email: caller.email.clone(),
        avatar: caller.avatar_url.clone(),
    }))
}
