//! Catalog handlers: books and categories.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiJson, ApiResult};
use crate::api::state::AppState;
use crate::auth::RequireAdmin;
use crate::catalog::{Book, BookSummary, BookUpdate, Category, NewBook};

/// Acknowledgement for an insert.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertResult {
    pub fn new(inserted_id: String) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

/// Acknowledgement for an update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Acknowledgement for a delete.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookIdsRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

/// List every book. Requires a session.
pub async fn list_books(State(state): State<AppState>) -> ApiResult<Json<Vec<Book>>> {
    let books = state
        .books
        .list()
        .await
        .map_err(|e| ApiError::storage("Error Fetching Books", e))?;
    Ok(Json(books))
}

/// Add a book. Requires an administrator credential.
#[instrument(skip_all)]
pub async fn create_book(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(book): ApiJson<NewBook>,
) -> ApiResult<Json<InsertResult>> {
    if book.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }

    let created = state
        .books
        .create(book)
        .await
        .map_err(|e| ApiError::storage("Error on Creating New Book", e))?;

    info!(book_id = %created.id, admin = %admin.subject(), "book created");
    Ok(Json(InsertResult::new(created.id)))
}

/// Apply a partial update to a book. Requires an administrator credential.
#[instrument(skip_all)]
pub async fn update_book(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<BookUpdate>,
) -> ApiResult<Json<UpdateResult>> {
    let matched = state
        .books
        .update(&id, update)
        .await
        .map_err(|e| ApiError::storage("Error Updating Data", e))?;

    info!(book_id = %id, admin = %admin.subject(), matched, "book updated");
    Ok(Json(UpdateResult {
        acknowledged: true,
        matched_count: matched,
        modified_count: matched,
    }))
}

pub async fn books_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<Book>>> {
    let books = state
        .books
        .by_category(&category)
        .await
        .map_err(|e| ApiError::storage("Error Fetching Category Books", e))?;
    Ok(Json(books))
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let categories = state
        .categories
        .list()
        .await
        .map_err(|e| ApiError::storage("Error getting Categories", e))?;
    Ok(Json(categories))
}

pub async fn best_sellers(State(state): State<AppState>) -> ApiResult<Json<Vec<Book>>> {
    let books = state
        .books
        .best_sellers()
        .await
        .map_err(|e| ApiError::storage("Error getting Best Selling Books", e))?;
    Ok(Json(books))
}

/// Summaries for a list of book ids, sorted by title.
pub async fn books_by_ids(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BookIdsRequest>,
) -> ApiResult<Json<Vec<BookSummary>>> {
    let summaries = state
        .books
        .summaries(&request.ids)
        .await
        .map_err(|e| ApiError::storage("Error Getting Data", e))?;
    Ok(Json(summaries))
}

pub async fn book_details(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> ApiResult<Json<Book>> {
    state
        .books
        .get(&book_id)
        .await
        .map_err(|e| ApiError::storage("Error fetching Data", e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Book not found: {book_id}")))
}
