use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{configuration::RealtimeSettings, error::ApiError, identity::Identity};

const ANONYMOUS_NAME: &str = "Anonymous";

/// Scope of an issued collaboration session. `Edit` is granted iff the
/// caller's verdict carries the realtime-edit capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionScope {
    Edit,
    ReadOnly,
}

/// Presence info forwarded to the collaborator for cursors and avatars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUserInfo {
    pub name: String,
    pub color: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub exp: u64,
    pub sub: String,
    pub room: Uuid,
    pub scope: SessionScope,
    pub user_info: SessionUserInfo,
}

/// Opaque payload handed back to the editing surface.
#[derive(Debug, Serialize)]
pub struct RealtimeSession {
    pub token: String,
    pub scope: SessionScope,
    pub user_id: String,
}

/// Maps an identity-provider subject onto the collaborator's restricted
/// identifier alphabet `[A-Za-z0-9_-]`.
///
/// Contract v1: ASCII letters, digits and `-` pass through; every other byte
/// (including `_`, which would otherwise be ambiguous) is escaped as `_`
/// followed by two lowercase hex digits. The mapping is deterministic,
/// collision-free, and reversible via [`restore_user_id`]; collaborators rely
/// on it staying stable across calls.
pub fn sanitize_user_id(subject: &str) -> String {
    let mut out = String::with_capacity(subject.len());
    for byte in subject.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' => out.push(byte as char),
            _ => {
                out.push('_');
                out.push_str(&format!("{:02x}", byte));
            }
        }
    }
    out
}

/// Inverse of [`sanitize_user_id`]. Returns `None` for strings that are not
/// valid v1 encodings.
pub fn restore_user_id(sanitized: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(sanitized.len());
    let mut input = sanitized.bytes();
    while let Some(byte) = input.next() {
        if byte == b'_' {
            let hi = input.next()?;
            let lo = input.next()?;
            let hex = [hi, lo];
            let hex = std::str::from_utf8(&hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
        } else {
            bytes.push(byte);
        }
    }
    String::from_utf8(bytes).ok()
}

/// Deterministic presence color: sum of the name's char codes, mod 360, as
/// the hue of a fixed-saturation HSL color.
fn presence_color(name: &str) -> String {
    let sum: u32 = name.chars().map(|c| c as u32).sum();
    format!("hsl({}, 70%, 50%)", sum % 360)
}

/// Boundary to the external realtime collaboration service. Session minting
/// is the only call in this crate that crosses that boundary; its failures
/// surface as `ExternalServiceFailure` and are never retried here.
#[derive(Clone)]
pub struct SessionIssuer {
    signing_key: Secret<String>,
    session_ttl_secs: u64,
}

impl SessionIssuer {
    pub fn new(settings: RealtimeSettings) -> Self {
        Self {
            signing_key: settings.signing_key,
            session_ttl_secs: settings.session_ttl_secs,
        }
    }

    pub fn issue(
        &self,
        identity: &Identity,
        room: Uuid,
        scope: SessionScope,
    ) -> Result<RealtimeSession, ApiError> {
        let name = identity
            .display_name
            .clone()
            .or_else(|| identity.email.clone())
            .unwrap_or_else(|| ANONYMOUS_NAME.to_string());

        let user_id = sanitize_user_id(&identity.subject);

        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| ApiError::UnexpectedError)?
            .as_secs()
            + self.session_ttl_secs;

        let claims = SessionClaims {
            exp,
            sub: user_id.clone(),
            room,
            scope,
            user_info: SessionUserInfo {
                color: presence_color(&name),
                name,
                avatar: identity.avatar_url.clone(),
            },
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.signing_key.expose_secret().as_ref()),
        )
        .map_err(|e| {
            tracing::error!(?e, "realtime session signing failed");
            ApiError::ExternalServiceFailure("could not mint collaboration session".to_string())
        })?;

        Ok(RealtimeSession {
            token,
            scope,
            user_id,
        })
    }
}
