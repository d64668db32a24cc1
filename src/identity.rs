use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, TokenData, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::error::ApiError;

/// Claims as minted by the external identity provider. The provider has
/// already verified the caller; we only check the signature and lift the
/// claims into an [`Identity`].
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub exp: u64,
    pub sub: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// The acting caller. Subjects and organization ids are opaque strings
/// owned by the identity provider.
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject: String,
    pub organization_id: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

pub fn require(identity: Option<&Identity>) -> Result<&Identity, ApiError> {
    identity.ok_or_else(|| ApiError::Unauthenticated("not signed in".to_string()))
}

/// Decodes the bearer token, if any, and attaches the caller's [`Identity`]
/// as a request extension. A missing header leaves the request anonymous so
/// that read paths can apply the public-read policy; a present but invalid
/// token is always rejected.
pub async fn identity_middleware(
    State(signing_key): State<Secret<String>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let Some(auth_header) = auth_header else {
        return Ok(next.run(req).await);
    };

    let mut auth_header_parts = auth_header.split(" ");
    if auth_header_parts.next() != Some("Bearer") {
        return Err(ApiError::Unauthenticated(
            "auth header bearer prefix missing".to_string(),
        ));
    };

    let token_string = auth_header_parts
        .next()
        .ok_or_else(|| ApiError::Unauthenticated("bearer token missing".to_string()))?;

    let token = decode_jwt(token_string, signing_key).map_err(|e| {
        tracing::error!(?e, "JWT decoding error");
        ApiError::Unauthenticated("invalid token".to_string())
    })?;

    let identity = Identity {
        subject: token.claims.sub,
        organization_id: token.claims.org_id,
        display_name: token.claims.name,
        email: token.claims.email,
        avatar_url: token.claims.avatar_url,
    };
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

fn decode_jwt(
    token: &str,
    signing_key: Secret<String>,
) -> jsonwebtoken::errors::Result<TokenData<Claims>> {
    decode(
        token,
        &DecodingKey::from_secret(signing_key.expose_secret().as_ref()),
        &Validation::new(jsonwebtoken::Algorithm::HS256),
    )
}
