use crate::helpers::spawn_app;

#[tokio::test]
async fn owner_can_share_and_the_grant_is_visible_in_the_listing() {
    let app = spawn_app().await;
    let document_id = app.seed_document("alice", None).await;
    let token = app.signed_jwt("alice", None);

    let response = app
        .api_client
        .put(format!("{}/documents/{}/shares", app.address, document_id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "user_id": "carol", "role": "viewer" }))
        .send()
        .await
        .expect("request sent");
    assert_eq!(response.status(), 200);

    let listing = app
        .api_client
        .get(format!("{}/documents/{}/shares", app.address, document_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request sent");
    let body: serde_json::Value = listing.json().await.expect("json body");
    let grants = body.as_array().expect("array");
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0]["user_id"], "carol");
    assert_eq!(grants[0]["role"], "viewer");
}

#[tokio::test]
async fn upserting_twice_leaves_one_grant_with_the_latest_role() {
    let app = spawn_app().await;
    let document_id = app.seed_document("alice", None).await;
    let token = app.signed_jwt("alice", None);

    for role in ["viewer", "editor"] {
        let response = app
            .api_client
            .put(format!("{}/documents/{}/shares", app.address, document_id))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "user_id": "carol", "role": role }))
            .send()
            .await
            .expect("request sent");
        assert_eq!(response.status(), 200);
    }

    assert_eq!(app.grant_count(document_id).await, 1);
    let (role,): (String,) =
        sqlx::query_as("SELECT role::text FROM document_grants WHERE document_id = $1")
            .bind(document_id)
            .fetch_one(&app.db_pool)
            .await
            .expect("grant fetched");
    assert_eq!(role, "editor");
}

#[tokio::test]
async fn concurrent_upserts_converge_to_one_grant() {
    let app = spawn_app().await;
    let document_id = app.seed_document("alice", None).await;
    let token = app.signed_jwt("alice", None);

    let share = |role: &'static str| {
        let client = app.api_client.clone();
        let url = format!("{}/documents/{}/shares", app.address, document_id);
        let token = token.clone();
        async move {
            client
                .put(url)
                .bearer_auth(token)
                .json(&serde_json::json!({ "user_id": "carol", "role": role }))
                .send()
                .await
                .expect("request sent")
                .status()
        }
    };

    let (a, b) = tokio::join!(share("viewer"), share("editor"));
    assert_eq!(a, 200);
    assert_eq!(b, 200);
    assert_eq!(app.grant_count(document_id).await, 1);
}

#[tokio::test]
async fn self_sharing_is_rejected_before_persistence() {
    let app = spawn_app().await;
    let document_id = app.seed_document("alice", None).await;
    let token = app.signed_jwt("alice", None);

    let response = app
        .api_client
        .put(format!("{}/documents/{}/shares", app.address, document_id))
        .bearer_auth(token)
        .json(&serde_json::json!({ "user_id": "alice", "role": "editor" }))
        .send()
        .await
        .expect("request sent");

    assert_eq!(response.status(), 400);
    assert_eq!(app.grant_count(document_id).await, 0);
}

#[tokio::test]
async fn revoking_an_absent_grant_is_a_no_op() {
    let app = spawn_app().await;
    let document_id = app.seed_document("alice", None).await;
    let token = app.signed_jwt("alice", None);

    let response = app
        .api_client
        .delete(format!(
            "{}/documents/{}/shares/nobody",
            app.address, document_id
        ))
        .bearer_auth(token)
        .send()
        .await
        .expect("request sent");

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn shared_viewer_cannot_manage_shares() {
    let app = spawn_app().await;
    let document_id = app.seed_document("alice", None).await;
    app.seed_grant(document_id, "carol", "viewer").await;
    let token = app.signed_jwt("carol", None);

    let response = app
        .api_client
        .put(format!("{}/documents/{}/shares", app.address, document_id))
        .bearer_auth(token)
        .json(&serde_json::json!({ "user_id": "dave", "role": "viewer" }))
        .send()
        .await
        .expect("request sent");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn shared_editor_can_manage_other_shares() {
    let app = spawn_app().await;
    let document_id = app.seed_document("alice", None).await;
    app.seed_grant(document_id, "dave", "editor").await;
    let token = app.signed_jwt("dave", None);

    let response = app
        .api_client
        .put(format!("{}/documents/{}/shares", app.address, document_id))
        .bearer_auth(token)
        .json(&serde_json::json!({ "user_id": "carol", "role": "viewer" }))
        .send()
        .await
        .expect("request sent");

    assert_eq!(response.status(), 200);
    assert_eq!(app.grant_count(document_id).await, 2);
}

#[tokio::test]
async fn anonymous_caller_cannot_list_shares() {
    let app = spawn_app().await;
    let document_id = app.seed_document("alice", None).await;

    let response = app
        .api_client
        .get(format!("{}/documents/{}/shares", app.address, document_id))
        .send()
        .await
        .expect("request sent");

    assert_eq!(response.status(), 401);
}
