use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::ads::dtos::MAX_IMAGE_SIZE;
use crate::features::ads::handlers;
use crate::features::ads::services::AdService;

/// Create routes for the ads feature
pub fn routes(service: Arc<AdService>) -> Router {
    Router::new()
        .route("/ads/", get(handlers::list_ads).post(handlers::create_ad))
        .route(
            "/ads/{id}/",
            get(handlers::get_ad)
                .patch(handlers::update_ad)
                .delete(handlers::delete_ad),
        )
        .route(
            "/ads/{id}/image/",
            // Allow body size up to MAX_IMAGE_SIZE + buffer for multipart overhead
            post(handlers::upload_ad_image)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 1024 * 1024)),
        )
        .with_state(service)
}
