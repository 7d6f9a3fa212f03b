use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryDto, CreateCategoryDto, UpdateCategoryDto};
use crate::features::categories::models::Category;

const UNIQUE_NAME_MESSAGE: &str = "Category with this name already exists";

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all categories sorted by name
    pub async fn list(&self) -> Result<Vec<CategoryDto>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Get category by id
    pub async fn get(&self, id: i64) -> Result<CategoryDto> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryDto> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&dto.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "name", UNIQUE_NAME_MESSAGE))?;

        tracing::info!("Category created: id={}", category.id);
        Ok(category.into())
    }

    /// Rename a category. A constraint violation rejects the statement
    /// before anything is written, so the original name survives a 422.
    pub async fn update(&self, id: i64, dto: UpdateCategoryDto) -> Result<CategoryDto> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&dto.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "name", UNIQUE_NAME_MESSAGE))?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Category with id {} not found",
                id
            )));
        }

        tracing::info!("Category deleted: id={}", id);
        Ok(())
    }
}
