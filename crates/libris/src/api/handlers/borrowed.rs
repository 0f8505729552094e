//! Borrowing handlers. Every route here acts for a caller-identified
//! borrower and checks that identity against the session first.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::books::{DeleteResult, InsertResult};
use crate::api::error::{ApiError, ApiJson, ApiResult};
use crate::api::state::AppState;
use crate::auth::{CurrentUser, ownership};
use crate::catalog::{BorrowRecord, NewBorrowRecord};

#[derive(Debug, Default, Deserialize)]
pub struct BorrowerQuery {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnQuery {
    pub email: Option<String>,
    pub book_id: Option<String>,
}

/// The caller's borrowing records.
#[instrument(skip_all)]
pub async fn list_borrowed(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Query(query): Query<BorrowerQuery>,
) -> ApiResult<Json<Vec<BorrowRecord>>> {
    ownership::check(user.as_ref(), query.email.as_deref())?;
    let email = query.email.unwrap_or_default();

    let records = state
        .borrowed
        .list_for(&email)
        .await
        .map_err(|e| ApiError::storage("Error getting Data", e))?;
    Ok(Json(records))
}

/// The caller's record for one book, or `null`.
#[instrument(skip_all)]
pub async fn get_borrowed(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(book_id): Path<String>,
    Query(query): Query<BorrowerQuery>,
) -> ApiResult<Json<Option<BorrowRecord>>> {
    ownership::check(user.as_ref(), query.email.as_deref())?;
    let email = query.email.unwrap_or_default();

    let record = state
        .borrowed
        .find(&email, &book_id)
        .await
        .map_err(|e| ApiError::storage("Error getting Data", e))?;
    Ok(Json(record))
}

/// Return a book by deleting one of the caller's records for it.
#[instrument(skip_all)]
pub async fn return_book(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Query(query): Query<ReturnQuery>,
) -> ApiResult<Json<DeleteResult>> {
    ownership::check(user.as_ref(), query.email.as_deref())?;
    let email = query.email.unwrap_or_default();
    let book_id = query
        .book_id
        .ok_or_else(|| ApiError::bad_request("bookId is required"))?;

    let deleted = state
        .borrowed
        .delete_one(&email, &book_id)
        .await
        .map_err(|e| ApiError::storage("Error Deleting Book", e))?;

    debug!(book_id = %book_id, deleted, "book returned");
    Ok(Json(DeleteResult {
        acknowledged: true,
        deleted_count: deleted,
    }))
}

/// Record a borrow for the caller. The record's email must be the caller's.
#[instrument(skip_all)]
pub async fn create_borrowed(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    ApiJson(record): ApiJson<NewBorrowRecord>,
) -> ApiResult<Json<InsertResult>> {
    ownership::check(user.as_ref(), Some(&record.email))?;

    let stored = state
        .borrowed
        .create(record)
        .await
        .map_err(|e| ApiError::storage("Error Creating Data", e))?;

    debug!(book_id = %stored.book_id, "borrow recorded");
    Ok(Json(InsertResult::new(stored.id)))
}
