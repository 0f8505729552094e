//! Book repository.

use anyhow::{Context, Result};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::models::{BEST_SELLER_TAG, Book, BookSummary, BookUpdate, NewBook};

const BOOK_COLUMNS: &str =
    "id, title, author, image, category, quantity, rating, description, tags";

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: String,
    title: String,
    author: Option<String>,
    image: Option<String>,
    category: Option<String>,
    quantity: i64,
    rating: Option<f64>,
    description: Option<String>,
    tags: String,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            image: row.image,
            category: row.category,
            quantity: row.quantity,
            rating: row.rating,
            description: row.description,
            tags: serde_json::from_str(&row.tags).unwrap_or_default(),
        }
    }
}

/// Repository for book records.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Book>> {
        let rows: Vec<BookRow> = sqlx::query_as(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY title"
        ))
        .fetch_all(&self.pool)
        .await
        .context("listing books")?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    #[instrument(skip(self, book), fields(title = %book.title))]
    pub async fn create(&self, book: NewBook) -> Result<Book> {
        let id = Uuid::new_v4().to_string();
        let tags = serde_json::to_string(&book.tags).context("encoding tags")?;

        debug!("Creating book {}", id);

        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, image, category, quantity, rating, description, tags)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.image)
        .bind(&book.category)
        .bind(book.quantity)
        .bind(book.rating)
        .bind(&book.description)
        .bind(&tags)
        .execute(&self.pool)
        .await
        .context("inserting book")?;

        self.get(&id)
            .await?
            .with_context(|| format!("book {id} vanished after insert"))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Book>> {
        let row: Option<BookRow> = sqlx::query_as(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("fetching book {id}"))?;

        Ok(row.map(Book::from))
    }

    pub async fn by_category(&self, category: &str) -> Result<Vec<Book>> {
        let rows: Vec<BookRow> = sqlx::query_as(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE category = ? ORDER BY title"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("listing books in category {category}"))?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Books carrying the best-seller tag.
    pub async fn best_sellers(&self) -> Result<Vec<Book>> {
        let rows: Vec<BookRow> = sqlx::query_as(&format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE EXISTS (SELECT 1 FROM json_each(books.tags) WHERE json_each.value = ?) \
             ORDER BY title"
        ))
        .bind(BEST_SELLER_TAG)
        .fetch_all(&self.pool)
        .await
        .context("listing best sellers")?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Summaries for the given ids, sorted by title. Unknown ids are skipped.
    pub async fn summaries(&self, ids: &[String]) -> Result<Vec<BookSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {BOOK_COLUMNS} FROM books WHERE id IN ("));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY title");

        let rows: Vec<BookRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("fetching books by id")?;

        Ok(rows
            .into_iter()
            .map(|row| BookSummary::from(Book::from(row)))
            .collect())
    }

    /// Apply a partial update. Returns the number of matched rows.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: &str, update: BookUpdate) -> Result<u64> {
        let tags = update
            .tags
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("encoding tags")?;

        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = COALESCE(?, title),
                author = COALESCE(?, author),
                image = COALESCE(?, image),
                category = COALESCE(?, category),
                quantity = COALESCE(?, quantity),
                rating = COALESCE(?, rating),
                description = COALESCE(?, description),
                tags = COALESCE(?, tags)
            WHERE id = ?
            "#,
        )
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.image)
        .bind(&update.category)
        .bind(update.quantity)
        .bind(update.rating)
        .bind(&update.description)
        .bind(&tags)
        .bind(id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("updating book {id}"))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn repo() -> BookRepository {
        let db = Database::in_memory().await.unwrap();
        BookRepository::new(db.pool().clone())
    }

    fn book(title: &str, category: &str, tags: &[&str]) -> NewBook {
        NewBook {
            title: title.to_string(),
            category: Some(category.to_string()),
            quantity: 3,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..NewBook::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = repo().await;
        let created = repo.create(book("Dune", "sci-fi", &[])).await.unwrap();

        let fetched = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(repo.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_best_sellers_filter_by_tag() {
        let repo = repo().await;
        repo.create(book("Dune", "sci-fi", &[BEST_SELLER_TAG])).await.unwrap();
        repo.create(book("Emma", "classic", &["romance"])).await.unwrap();

        let best = repo.best_sellers().await.unwrap();
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].title, "Dune");
    }

    #[tokio::test]
    async fn test_summaries_sorted_by_title() {
        let repo = repo().await;
        let b = repo.create(book("Middlemarch", "classic", &[])).await.unwrap();
        let a = repo.create(book("Anna Karenina", "classic", &[])).await.unwrap();

        let summaries = repo
            .summaries(&[b.id.clone(), a.id.clone(), "missing".to_string()])
            .await
            .unwrap();
        let titles: Vec<_> = summaries.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Anna Karenina", "Middlemarch"]);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let repo = repo().await;
        let created = repo.create(book("Dune", "sci-fi", &[])).await.unwrap();

        let matched = repo
            .update(
                &created.id,
                BookUpdate {
                    quantity: Some(9),
                    ..BookUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let fetched = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.quantity, 9);
        assert_eq!(fetched.title, "Dune");
    }
}
