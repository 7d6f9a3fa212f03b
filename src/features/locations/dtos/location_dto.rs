use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::locations::models::Location;

/// Pass-through response DTO for location
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationDto {
    pub id: i64,
    pub name: String,
}

impl From<Location> for LocationDto {
    fn from(l: Location) -> Self {
        Self {
            id: l.id,
            name: l.name,
        }
    }
}
