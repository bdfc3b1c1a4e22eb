//! Folder sharing, role lookup and file access over HTTP.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use casehub_entity::role::Role;

#[tokio::test]
async fn test_share_then_read_as_grantee() {
    let app = helpers::TestApp::new();
    let owner = app.create_user("owner").await;
    let analyst = app.create_user("analyst").await;
    let case = app.create_folder("case-7", &owner).await;
    let file = app.create_file("memory.raw", &case, &owner).await;

    let response = app
        .request("GET", &format!("/api/files/{}", file.id), None, Some(&app.token(&analyst)))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["message"], "No access to file");

    let response = app
        .request(
            "POST",
            &format!("/api/folders/{}/roles", case.id),
            Some(json!({"user_names": ["analyst"], "user_role": "Viewer"})),
            Some(&app.token(&owner)),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["user_roles"][0]["role"], "Viewer");

    let response = app
        .request("GET", &format!("/api/files/{}", file.id), None, Some(&app.token(&analyst)))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["display_name"], "memory.raw");

    let response = app
        .request(
            "GET",
            &format!("/api/folders/{}/roles/me", case.id),
            None,
            Some(&app.token(&analyst)),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["principal"], "user");
    assert_eq!(response.body["data"]["role"], "Viewer");
}

#[tokio::test]
async fn test_share_conflict_and_invalid_role() {
    let app = helpers::TestApp::new();
    let owner = app.create_user("owner").await;
    let analyst = app.create_user("analyst").await;
    let case = app.create_folder("case-7", &owner).await;
    app.grant(&analyst, &case, Role::Viewer).await;
    let token = app.token(&owner);
    let path = format!("/api/folders/{}/roles", case.id);

    let response = app
        .request(
            "POST",
            &path,
            Some(json!({"user_ids": [analyst.id], "user_role": "Editor"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app
        .request(
            "POST",
            &path,
            Some(json!({"user_ids": [owner.id], "user_role": "Superuser"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_no_access_masks_inherited_grant() {
    let app = helpers::TestApp::new();
    let owner = app.create_user("owner").await;
    let analyst = app.create_user("analyst").await;
    let case = app.create_folder("case-7", &owner).await;
    app.grant(&analyst, &case, Role::Editor).await;

    let token = app.token(&owner);
    let created = app
        .request(
            "POST",
            &format!("/api/folders/{}/workflows", case.id),
            Some(json!({"display_name": "Sealed"})),
            Some(&token),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let sealed_id = created.body["data"]["folder_id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "POST",
            &format!("/api/folders/{sealed_id}/roles"),
            Some(json!({"user_ids": [analyst.id], "user_role": "No Access"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app
        .request(
            "GET",
            &format!("/api/folders/{sealed_id}/roles/me"),
            None,
            Some(&app.token(&analyst)),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "GET",
            &format!("/api/folders/{}/roles/me", case.id),
            None,
            Some(&app.token(&analyst)),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["role"], "Editor");
}

#[tokio::test]
async fn test_delete_role_revokes_access() {
    let app = helpers::TestApp::new();
    let owner = app.create_user("owner").await;
    let analyst = app.create_user("analyst").await;
    let case = app.create_folder("case-7", &owner).await;
    let token = app.token(&owner);

    let shared = app
        .request(
            "POST",
            &format!("/api/folders/{}/roles", case.id),
            Some(json!({"user_ids": [analyst.id], "user_role": "Editor"})),
            Some(&token),
        )
        .await;
    let role_id = shared.body["data"]["user_roles"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let path = format!("/api/folders/{}/roles/users/{role_id}", case.id);
    let response = app.request("DELETE", &path, None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("DELETE", &path, None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "GET",
            &format!("/api/folders/{}/roles/me", case.id),
            None,
            Some(&app.token(&analyst)),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
