//! Shared helpers for HTTP-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use casehub_api::{AppState, build_app};
use casehub_auth::Claims;
use casehub_core::config::AppConfig;
use casehub_database::store::{FileStore, FolderStore, GrantStore, MemoryStore, PrincipalStore, Stores};
use casehub_entity::file::{CreateFile, File};
use casehub_entity::folder::{CreateFolder, Folder};
use casehub_entity::role::{CreateUserRole, ResourceRef, Role};
use casehub_entity::user::{CreateUser, User};
use casehub_worker::MemoryRuntime;

pub const SECRET: &str = "integration-secret";

/// Test application over the in-memory store and runtime.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store, for arranging fixtures directly
    pub store: Arc<MemoryStore>,
    /// Records submitted graphs
    pub runtime: Arc<MemoryRuntime>,
    /// Application config
    pub config: AppConfig,
    data_root: TempDir,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let data_root = TempDir::new().expect("Failed to create data root");
        let mut config = AppConfig::default();
        config.database.provider = "memory".to_string();
        config.auth.jwt_secret = SECRET.to_string();
        config.auth.leeway_seconds = 0;
        config.workflow.data_root = data_root.path().to_string_lossy().into_owned();

        let store = Arc::new(MemoryStore::new());
        let runtime = Arc::new(MemoryRuntime::new(config.worker.default_queue.clone()));
        let state = AppState::new(
            config.clone(),
            Stores::from_memory(store.clone()),
            runtime.clone(),
        );

        Self {
            router: build_app(state),
            store,
            runtime,
            config,
            data_root,
        }
    }

    pub async fn create_user(&self, username: &str) -> User {
        self.store
            .create_user(&CreateUser {
                username: username.to_string(),
                display_name: None,
            })
            .await
            .expect("Failed to create user")
    }

    /// A root folder with an Owner grant for `owner`.
    pub async fn create_folder(&self, name: &str, owner: &User) -> Folder {
        let folder = self
            .store
            .create_folder(&CreateFolder {
                display_name: name.to_string(),
                parent_id: None,
                user_id: owner.id,
            })
            .await
            .expect("Failed to create folder");
        self.grant(owner, &folder, Role::Owner).await;
        folder
    }

    pub async fn create_file(&self, name: &str, folder: &Folder, owner: &User) -> File {
        self.store
            .create_file(&CreateFile {
                display_name: name.to_string(),
                folder_id: folder.id,
                user_id: owner.id,
                data_type: None,
                magic_mime: None,
            })
            .await
            .expect("Failed to create file")
    }

    pub async fn grant(&self, user: &User, folder: &Folder, role: Role) {
        self.store
            .create_user_role(&CreateUserRole {
                role,
                user_id: user.id,
                resource: ResourceRef::Folder(folder.id),
            })
            .await
            .expect("Failed to create grant");
    }

    /// Mint a bearer token for `user`, valid for `ttl_seconds`.
    pub fn token_with_ttl(&self, user: &User, ttl_seconds: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            username: Some(user.username.clone()),
            iat: now,
            exp: now + ttl_seconds,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("Failed to encode token")
    }

    pub fn token(&self, user: &User) -> String {
        self.token_with_ttl(user, 3600)
    }

    /// Send a request through the router
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
