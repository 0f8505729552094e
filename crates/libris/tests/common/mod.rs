//! Test utilities and common setup.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::Utc;
use libris::admin::{AdminRecord, AdminRegistry, AdminSeed, RegistryError, RoleResolver, SqliteAdminRegistry};
use libris::api::{self, AppState};
use libris::auth::{ADMIN_COOKIE, AuthConfig, Claims, Role, USER_COOKIE};
use libris::catalog::{BEST_SELLER_TAG, NewBook, NewBorrowRecord};
use libris::db::Database;
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";
pub const ADMIN_UID: &str = "admin-uid-1";
pub const ADMIN_EMAIL: &str = "admin@libris.test";
pub const ALICE: &str = "alice@libris.test";
pub const BOB: &str = "bob@libris.test";

/// A router over a seeded in-memory database.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    /// Ids of the seeded books, in insertion order: Dune, Emma, Middlemarch.
    pub book_ids: Vec<String>,
}

/// Registry that never answers within any sane timeout.
pub struct StalledRegistry;

#[async_trait]
impl AdminRegistry for StalledRegistry {
    async fn find_by_uid(&self, _uid: &str) -> Result<Option<AdminRecord>, RegistryError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(None)
    }
}

/// Registry whose single administrator can be demoted mid-test.
#[derive(Clone)]
pub struct ToggleRegistry {
    admin: Arc<AtomicBool>,
}

impl ToggleRegistry {
    /// Starts with the administrator registered.
    pub fn granted() -> Self {
        Self {
            admin: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_admin(&self, admin: bool) {
        self.admin.store(admin, Ordering::SeqCst);
    }
}

#[async_trait]
impl AdminRegistry for ToggleRegistry {
    async fn find_by_uid(&self, uid: &str) -> Result<Option<AdminRecord>, RegistryError> {
        if uid != ADMIN_UID || !self.admin.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(AdminRecord {
            uid: uid.to_string(),
            email: ADMIN_EMAIL.to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
        }))
    }
}

fn test_auth_config() -> AuthConfig {
    AuthConfig::with_secret(SECRET)
}

/// App backed by the SQLite registry with one seeded administrator.
pub async fn test_app() -> TestApp {
    let db = Database::in_memory().await.unwrap();

    let registry = SqliteAdminRegistry::new(db.pool().clone());
    registry
        .upsert(&AdminSeed {
            uid: ADMIN_UID.to_string(),
            email: ADMIN_EMAIL.to_string(),
        })
        .await
        .unwrap();

    build(db, Arc::new(registry), Duration::from_secs(5)).await
}

/// App whose role lookups go to `registry`, bounded by `timeout`.
pub async fn test_app_with_registry(
    registry: Arc<dyn AdminRegistry>,
    timeout: Duration,
) -> TestApp {
    let db = Database::in_memory().await.unwrap();
    build(db, registry, timeout).await
}

async fn build(db: Database, registry: Arc<dyn AdminRegistry>, timeout: Duration) -> TestApp {
    let state = AppState::new(test_auth_config(), RoleResolver::new(registry, timeout), &db);
    let book_ids = seed_catalog(&state).await;

    TestApp {
        router: api::create_router(state.clone()),
        state,
        book_ids,
    }
}

async fn seed_catalog(state: &AppState) -> Vec<String> {
    state
        .categories
        .create("sci-fi", Some("https://img.test/scifi.png"))
        .await
        .unwrap();
    state.categories.create("classic", None).await.unwrap();

    let mut ids = Vec::new();
    for (title, category, tags) in [
        ("Dune", "sci-fi", vec![BEST_SELLER_TAG.to_string()]),
        ("Emma", "classic", vec!["romance".to_string()]),
        ("Middlemarch", "classic", vec![]),
    ] {
        let book = state
            .books
            .create(NewBook {
                title: title.to_string(),
                author: Some("Someone".to_string()),
                category: Some(category.to_string()),
                quantity: 2,
                tags,
                ..NewBook::default()
            })
            .await
            .unwrap();
        ids.push(book.id);
    }

    state
        .borrowed
        .create(NewBorrowRecord {
            email: ALICE.to_string(),
            book_id: ids[0].clone(),
            borrowed_at: Some("2026-10-01".to_string()),
            return_date: Some("2026-10-15".to_string()),
            ..NewBorrowRecord::default()
        })
        .await
        .unwrap();

    ids
}

impl TestApp {
    /// Raw signed token for `email` with `role`.
    pub fn token(&self, email: &str, role: Role) -> String {
        self.state
            .auth
            .codec()
            .encode(Claims::new(email, Some(role)))
            .unwrap()
            .token
    }

    /// `Cookie` header value carrying a user session.
    pub fn user_cookie(&self, email: &str) -> String {
        format!("{}={}", USER_COOKIE, self.token(email, Role::User))
    }

    /// `Cookie` header value carrying an administrator session.
    pub fn admin_cookie(&self, email: &str) -> String {
        format!("{}={}", ADMIN_COOKIE, self.token(email, Role::Admin))
    }

    /// `Cookie` header value with a correctly signed but expired session.
    pub fn expired_user_cookie(&self, email: &str) -> String {
        let issued_at = Utc::now().timestamp() - 2 * 60 * 60;
        let credential = self
            .state
            .auth
            .codec()
            .encode_at(Claims::new(email, Some(Role::User)), issued_at)
            .unwrap();
        format!("{}={}", USER_COOKIE, credential.token)
    }

    /// Send a request and collect status, headers and the JSON body
    /// (`Value::Null` when the body is not JSON).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, headers, json)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> (StatusCode, HeaderMap, Value) {
        self.send(request(Method::GET, uri, cookie, None)).await
    }

    pub async fn post(
        &self,
        uri: &str,
        cookie: Option<&str>,
        body: Value,
    ) -> (StatusCode, HeaderMap, Value) {
        self.send(request(Method::POST, uri, cookie, Some(body))).await
    }
}

/// Build a request with an optional `Cookie` header and JSON body.
pub fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// All `Set-Cookie` header values of a response.
pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .map(str::to_string)
        .collect()
}
