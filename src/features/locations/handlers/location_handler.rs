use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::features::locations::dtos::LocationDto;
use crate::features::locations::services::LocationService;

/// List all locations, sorted by name
#[utoipa::path(
    get,
    path = "/locations/",
    responses(
        (status = 200, description = "List of locations", body = Vec<LocationDto>),
    ),
    tag = "locations"
)]
pub async fn list_locations(
    State(service): State<Arc<LocationService>>,
) -> Result<Json<Vec<LocationDto>>> {
    let locations = service.list().await?;
    Ok(Json(locations))
}

/// Get a location by id
#[utoipa::path(
    get,
    path = "/locations/{id}/",
    params(("id" = i64, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location found", body = LocationDto),
        (status = 404, description = "Location not found"),
    ),
    tag = "locations"
)]
pub async fn get_location(
    State(service): State<Arc<LocationService>>,
    Path(id): Path<i64>,
) -> Result<Json<LocationDto>> {
    let location = service.get(id).await?;
    Ok(Json(location))
}
