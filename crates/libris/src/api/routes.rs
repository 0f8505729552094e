//! API route definitions.

use std::any::Any;

use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::{admin_middleware, session_middleware};

use super::error::ApiError;
use super::handlers;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let auth_state = state.auth.clone();

    // Session routes (require the `token` cookie)
    let session_routes = Router::new()
        .route(
            "/allBook",
            get(handlers::list_books).delete(handlers::return_book),
        )
        .route("/borrowedBooks", get(handlers::list_borrowed))
        .route("/borrowedBooks/{id}", get(handlers::get_borrowed))
        .route("/borrowed", post(handlers::create_borrowed))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            session_middleware,
        ))
        .with_state(state.clone());

    // Administrator routes (require the `adminToken` cookie)
    let admin_routes = Router::new()
        .route("/allBook", post(handlers::create_book))
        .route("/allBook/update/{id}", patch(handlers::update_book))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_middleware))
        .with_state(state.clone());

    // Public routes (no authentication)
    let public_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Session issuance
        .route("/jwt", post(handlers::issue_token))
        .route("/admin", post(handlers::issue_admin_token))
        .route("/isAdmin", post(handlers::check_admin))
        .route("/logOut", post(handlers::logout))
        // Catalog browsing
        .route("/books/{category}", get(handlers::books_by_category))
        .route("/categories", get(handlers::list_categories))
        .route("/bestSellers", get(handlers::best_sellers))
        .route("/allBorrowedBooksId", post(handlers::books_by_ids))
        .route("/bookDetails/{bookId}", get(handlers::book_details))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(trace_layer)
}

/// Render a handler panic as the usual 500 body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = detail, "handler panicked");

    ApiError::internal("Internal Server Error").into_response()
}

/// Build the CORS layer from the configured origins.
///
/// Credentials (cookies) are always allowed, so a wildcard origin cannot be
/// honored and is skipped.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::PATCH,
        Method::OPTIONS,
    ];

    let headers = [
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::ORIGIN,
        header::COOKIE,
    ];

    let origins: Vec<HeaderValue> = state
        .auth
        .allowed_origins()
        .iter()
        .filter(|origin| {
            if origin.as_str() == "*" {
                tracing::warn!("CORS: wildcard origin ignored, credentials are enabled");
                false
            } else {
                true
            }
        })
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("CORS: Invalid origin in config: {}", origin);
                None
            })
        })
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS: No usable origins configured, denying all cross-origin requests");
        CorsLayer::new().allow_origin(AllowOrigin::exact(HeaderValue::from_static("null")))
    } else {
        tracing::info!("CORS: Allowing {} origin(s)", origins.len());
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_panicking_handler_renders_internal_error() {
        let app = Router::new()
            .route("/explode", get(explode))
            .layer(CatchPanicLayer::custom(handle_panic));

        let response = app
            .oneshot(Request::get("/explode").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Internal Server Error");
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert!(!json["message"].as_str().unwrap().contains("exploded"));
    }
}
