use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::locations::dtos::LocationDto;
use crate::features::locations::models::Location;

/// Service for location lookups
pub struct LocationService {
    pool: PgPool,
}

impl LocationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<LocationDto>> {
        let locations =
            sqlx::query_as::<_, Location>("SELECT id, name FROM locations ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(locations.into_iter().map(|l| l.into()).collect())
    }

    pub async fn get(&self, id: i64) -> Result<LocationDto> {
        let location =
            sqlx::query_as::<_, Location>("SELECT id, name FROM locations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        location
            .map(|l| l.into())
            .ok_or_else(|| AppError::NotFound(format!("Location with id {} not found", id)))
    }
}
