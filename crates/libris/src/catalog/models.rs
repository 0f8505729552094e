//! Catalog records as exchanged with clients.
//!
//! Field names follow the frontend's document shape (`_id`, camelCase).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag marking a book as a best seller.
pub const BEST_SELLER_TAG: &str = "best seller";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub quantity: i64,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// The projection returned for batch lookups by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub quantity: i64,
}

impl From<Book> for BookSummary {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            image: book.image,
            category: book.category,
            quantity: book.quantity,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub image: Option<String>,
}

/// Keys a client may not supply on a new borrow record.
pub const RESERVED_BORROW_KEYS: [&str; 2] = ["_id", "createdAt"];

/// A stored borrow. Client fields without a column of their own travel in
/// `extra` and are returned unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub book_id: String,
    pub borrowed_at: Option<String>,
    pub return_date: Option<String>,
    pub created_at: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBorrowRecord {
    pub email: String,
    pub book_id: String,
    #[serde(default)]
    pub borrowed_at: Option<String>,
    #[serde(default)]
    pub return_date: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
