use jsonwebtoken::{decode, DecodingKey, Validation};
use secrecy::ExposeSecret;

use docshare::realtime::{SessionClaims, SessionScope};

use crate::helpers::{spawn_app, TestApp};

async fn issue_session(app: &TestApp, document_id: uuid::Uuid, token: &str) -> reqwest::Response {
    app.api_client
        .post(format!(
            "{}/documents/{}/sessions",
            app.address, document_id
        ))
        .bearer_auth(token)
        .send()
        .await
        .expect("request sent")
}

fn decode_session(app: &TestApp, token: &str) -> SessionClaims {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(app.realtime_signing_key.expose_secret().as_ref()),
        &Validation::new(jsonwebtoken::Algorithm::HS256),
    )
    .expect("session token decoded")
    .claims
}

#[tokio::test]
async fn owner_gets_an_edit_scoped_session() {
    let app = spawn_app().await;
    let document_id = app.seed_document("alice", None).await;
    let token = app.signed_jwt("alice", None);

    let response = issue_session(&app, document_id, &token).await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["scope"], "edit");

    let claims = decode_session(&app, body["token"].as_str().expect("token"));
    assert_eq!(claims.scope, SessionScope::Edit);
    assert_eq!(claims.room, document_id);
}

#[tokio::test]
async fn shared_viewer_gets_a_read_only_session() {
    let app = spawn_app().await;
    let document_id = app.seed_document("alice", None).await;
    app.seed_grant(document_id, "carol", "viewer").await;
    let token = app.signed_jwt("carol", None);

    let response = issue_session(&app, document_id, &token).await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["scope"], "read-only");
    let claims = decode_session(&app, body["token"].as_str().expect("token"));
    assert_eq!(claims.scope, SessionScope::ReadOnly);
}

#[tokio::test]
async fn session_subject_is_sanitized_for_the_collaborator() {
    let app = spawn_app().await;
    let document_id = app.seed_document("user.2|abc", None).await;
    let token = app.signed_jwt("user.2|abc", None);

    let response = issue_session(&app, document_id, &token).await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("json body");
    let user_id = body["user_id"].as_str().expect("user id");
    assert!(user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));

    let claims = decode_session(&app, body["token"].as_str().expect("token"));
    assert_eq!(claims.sub, user_id);
}

#[tokio::test]
async fn anonymous_caller_cannot_open_a_session() {
    let app = spawn_app().await;
    let document_id = app.seed_document("alice", None).await;

    let response = app
        .api_client
        .post(format!(
            "{}/documents/{}/sessions",
            app.address, document_id
        ))
        .send()
        .await
        .expect("request sent");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn stranger_cannot_open_a_session() {
    let app = spawn_app().await;
    let document_id = app.seed_document("alice", Some("org1")).await;
    let token = app.signed_jwt("mallory", Some("org2"));

    let response = issue_session(&app, document_id, &token).await;
    assert_eq!(response.status(), 403);
}
