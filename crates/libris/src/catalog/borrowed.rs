//! Borrowing record repository.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::models::{BorrowRecord, NewBorrowRecord, RESERVED_BORROW_KEYS};

const BORROW_COLUMNS: &str = "id, email, book_id, borrowed_at, return_date, created_at, extra";

#[derive(sqlx::FromRow)]
struct BorrowRow {
    id: String,
    email: String,
    book_id: String,
    borrowed_at: Option<String>,
    return_date: Option<String>,
    created_at: String,
    extra: String,
}

impl From<BorrowRow> for BorrowRecord {
    fn from(row: BorrowRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            book_id: row.book_id,
            borrowed_at: row.borrowed_at,
            return_date: row.return_date,
            created_at: row.created_at,
            extra: serde_json::from_str(&row.extra).unwrap_or_default(),
        }
    }
}

/// Repository for borrowing records. Every query is scoped by the
/// borrower's email.
#[derive(Debug, Clone)]
pub struct BorrowRepository {
    pool: SqlitePool,
}

impl BorrowRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a borrow, stamping `created_at` server-side.
    #[instrument(skip(self, record), fields(book_id = %record.book_id))]
    pub async fn create(&self, record: NewBorrowRecord) -> Result<BorrowRecord> {
        let mut extra = record.extra;
        extra.retain(|key, _| !RESERVED_BORROW_KEYS.contains(&key.as_str()));
        let encoded = serde_json::to_string(&extra).context("encoding extra fields")?;

        let stored = BorrowRecord {
            id: Uuid::new_v4().to_string(),
            email: record.email,
            book_id: record.book_id,
            borrowed_at: record.borrowed_at,
            return_date: record.return_date,
            created_at: Utc::now().to_rfc3339(),
            extra,
        };

        debug!("Recording borrow {}", stored.id);

        sqlx::query(
            r#"
            INSERT INTO borrowed_books (id, email, book_id, borrowed_at, return_date, created_at, extra)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&stored.id)
        .bind(&stored.email)
        .bind(&stored.book_id)
        .bind(&stored.borrowed_at)
        .bind(&stored.return_date)
        .bind(&stored.created_at)
        .bind(&encoded)
        .execute(&self.pool)
        .await
        .context("inserting borrow record")?;

        Ok(stored)
    }

    pub async fn list_for(&self, email: &str) -> Result<Vec<BorrowRecord>> {
        let rows: Vec<BorrowRow> = sqlx::query_as(&format!(
            "SELECT {BORROW_COLUMNS} FROM borrowed_books WHERE email = ? ORDER BY created_at"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .context("listing borrow records")?;

        Ok(rows.into_iter().map(BorrowRecord::from).collect())
    }

    pub async fn find(&self, email: &str, book_id: &str) -> Result<Option<BorrowRecord>> {
        let row: Option<BorrowRow> = sqlx::query_as(&format!(
            "SELECT {BORROW_COLUMNS} FROM borrowed_books \
             WHERE email = ? AND book_id = ? ORDER BY created_at LIMIT 1"
        ))
        .bind(email)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching borrow record")?;

        Ok(row.map(BorrowRecord::from))
    }

    /// Delete one record for `email` and `book_id`. Returns rows deleted.
    #[instrument(skip(self))]
    pub async fn delete_one(&self, email: &str, book_id: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM borrowed_books WHERE id = (
                SELECT id FROM borrowed_books
                WHERE email = ? AND book_id = ?
                ORDER BY created_at LIMIT 1
            )
            "#,
        )
        .bind(email)
        .bind(book_id)
        .execute(&self.pool)
        .await
        .context("deleting borrow record")?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use serde_json::Value;

    async fn repo() -> BorrowRepository {
        let db = Database::in_memory().await.unwrap();
        BorrowRepository::new(db.pool().clone())
    }

    fn borrow(email: &str, book_id: &str) -> NewBorrowRecord {
        NewBorrowRecord {
            email: email.to_string(),
            book_id: book_id.to_string(),
            borrowed_at: None,
            return_date: Some("2026-11-01".to_string()),
            ..NewBorrowRecord::default()
        }
    }

    #[tokio::test]
    async fn test_records_are_scoped_by_email() {
        let repo = repo().await;
        repo.create(borrow("a@x.com", "b1")).await.unwrap();
        repo.create(borrow("b@x.com", "b1")).await.unwrap();

        let mine = repo.list_for("a@x.com").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].email, "a@x.com");

        assert!(repo.find("a@x.com", "b2").await.unwrap().is_none());
        assert!(repo.find("a@x.com", "b1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_fields_are_kept() {
        let repo = repo().await;
        let mut record = borrow("a@x.com", "b1");
        record.extra.insert("title".to_string(), Value::from("Dune"));
        record.extra.insert("_id".to_string(), Value::from("client-chosen"));
        record.extra.insert("createdAt".to_string(), Value::from("1999-01-01"));

        let stored = repo.create(record).await.unwrap();
        assert_ne!(stored.id, "client-chosen");
        assert!(!stored.extra.contains_key("_id"));
        assert!(!stored.extra.contains_key("createdAt"));

        let found = repo.find("a@x.com", "b1").await.unwrap().unwrap();
        assert_eq!(found, stored);
        assert_eq!(found.extra["title"], "Dune");
    }

    #[tokio::test]
    async fn test_delete_one_removes_a_single_record() {
        let repo = repo().await;
        repo.create(borrow("a@x.com", "b1")).await.unwrap();
        repo.create(borrow("a@x.com", "b1")).await.unwrap();

        assert_eq!(repo.delete_one("a@x.com", "b1").await.unwrap(), 1);
        assert_eq!(repo.list_for("a@x.com").await.unwrap().len(), 1);
        assert_eq!(repo.delete_one("b@x.com", "b1").await.unwrap(), 0);
    }
}
