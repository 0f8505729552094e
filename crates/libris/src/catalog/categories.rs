//! Category repository.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::Category;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        sqlx::query_as("SELECT id, name, image FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("listing categories")
    }

    pub async fn create(&self, name: &str, image: Option<&str>) -> Result<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            image: image.map(str::to_string),
        };

        sqlx::query("INSERT INTO categories (id, name, image) VALUES (?, ?, ?)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.image)
            .execute(&self.pool)
            .await
            .with_context(|| format!("inserting category {name}"))?;

        Ok(category)
    }
}
