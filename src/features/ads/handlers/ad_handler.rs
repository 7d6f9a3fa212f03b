use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::ads::dtos::{
    is_image_type_allowed, AdDetailDto, AdListQuery, AdPageDto, CreateAdDto, UpdateAdDto,
    UploadAdImageDto, ALLOWED_IMAGE_TYPES, MAX_IMAGE_SIZE,
};
use crate::features::ads::services::AdService;

/// List ads with optional filters, sorted by price descending
///
/// All filters are conjunctive; an out-of-range page returns an empty
/// `items` array with `total` and `num_pages` still populated.
#[utoipa::path(
    get,
    path = "/ads/",
    params(AdListQuery),
    responses(
        (status = 200, description = "One page of the ad listing", body = AdPageDto),
        (status = 400, description = "Malformed query parameter"),
    ),
    tag = "ads"
)]
pub async fn list_ads(
    State(service): State<Arc<AdService>>,
    AppQuery(query): AppQuery<AdListQuery>,
) -> Result<Json<AdPageDto>> {
    let page = service.list(&query.filters(), query.page()).await?;
    Ok(Json(page))
}

/// Create an ad
#[utoipa::path(
    post,
    path = "/ads/",
    request_body = CreateAdDto,
    responses(
        (status = 201, description = "Ad created", body = AdDetailDto),
        (status = 400, description = "Malformed body"),
        (status = 404, description = "Referenced author or category does not exist"),
        (status = 422, description = "Field validation failed"),
    ),
    tag = "ads"
)]
pub async fn create_ad(
    State(service): State<Arc<AdService>>,
    AppJson(dto): AppJson<CreateAdDto>,
) -> Result<(StatusCode, Json<AdDetailDto>)> {
    dto.validate()?;
    let ad = service.create(dto).await?;
    Ok((StatusCode::CREATED, Json(ad)))
}

/// Get an ad by id
#[utoipa::path(
    get,
    path = "/ads/{id}/",
    params(("id" = i64, Path, description = "Ad id")),
    responses(
        (status = 200, description = "Ad found", body = AdDetailDto),
        (status = 404, description = "Ad not found"),
    ),
    tag = "ads"
)]
pub async fn get_ad(
    State(service): State<Arc<AdService>>,
    Path(id): Path<i64>,
) -> Result<Json<AdDetailDto>> {
    let ad = service.get(id).await?;
    Ok(Json(ad))
}

/// Replace an ad's fields
///
/// `is_published` is preserved; flip it via a dedicated workflow, not here.
#[utoipa::path(
    patch,
    path = "/ads/{id}/",
    params(("id" = i64, Path, description = "Ad id")),
    request_body = UpdateAdDto,
    responses(
        (status = 200, description = "Ad updated", body = AdDetailDto),
        (status = 404, description = "Ad, author or category not found"),
        (status = 422, description = "Field validation failed"),
    ),
    tag = "ads"
)]
pub async fn update_ad(
    State(service): State<Arc<AdService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateAdDto>,
) -> Result<Json<AdDetailDto>> {
    dto.validate()?;
    let ad = service.update(id, dto).await?;
    Ok(Json(ad))
}

/// Attach an image to an ad
///
/// Accepts multipart/form-data with a single `image` file field; replaces
/// any previously attached image.
#[utoipa::path(
    post,
    path = "/ads/{id}/image/",
    params(("id" = i64, Path, description = "Ad id")),
    request_body(
        content = UploadAdImageDto,
        content_type = "multipart/form-data",
        description = "Image upload form with a single `image` file field",
    ),
    responses(
        (status = 200, description = "Image attached", body = AdDetailDto),
        (status = 400, description = "Missing or invalid image"),
        (status = 404, description = "Ad not found"),
        (status = 413, description = "Image too large"),
    ),
    tag = "ads"
)]
pub async fn upload_ad_image(
    State(service): State<Arc<AdService>>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<AdDetailDto>> {
    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read image bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read image data: {}", e))
                })?;

                upload = Some((file_name, content_type, data.to_vec()));
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| AppError::BadRequest("image field is required".to_string()))?;

    if data.len() > MAX_IMAGE_SIZE {
        return Err(AppError::BadRequest(format!(
            "Image too large. Maximum size is {} bytes ({} MB)",
            MAX_IMAGE_SIZE,
            MAX_IMAGE_SIZE / 1024 / 1024
        )));
    }

    if !is_image_type_allowed(&content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            content_type,
            ALLOWED_IMAGE_TYPES.join(", ")
        )));
    }

    let ad = service
        .attach_image(id, &file_name, &content_type, data)
        .await?;
    Ok(Json(ad))
}

/// Delete an ad
#[utoipa::path(
    delete,
    path = "/ads/{id}/",
    params(("id" = i64, Path, description = "Ad id")),
    responses(
        (status = 204, description = "Ad deleted"),
        (status = 404, description = "Ad not found"),
    ),
    tag = "ads"
)]
pub async fn delete_ad(
    State(service): State<Arc<AdService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
