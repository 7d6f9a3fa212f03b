use utoipa::{Modify, OpenApi};

use crate::features::ads::{dtos as ads_dtos, handlers as ads_handlers};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::locations::{dtos as locations_dtos, handlers as locations_handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Ads
        ads_handlers::list_ads,
        ads_handlers::create_ad,
        ads_handlers::get_ad,
        ads_handlers::update_ad,
        ads_handlers::upload_ad_image,
        ads_handlers::delete_ad,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::create_category,
        categories_handlers::get_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Locations
        locations_handlers::list_locations,
        locations_handlers::get_location,
    ),
    components(
        schemas(
            // Ads
            ads_dtos::AdSummaryDto,
            ads_dtos::AdPageDto,
            ads_dtos::AdDetailDto,
            ads_dtos::CreateAdDto,
            ads_dtos::UpdateAdDto,
            ads_dtos::UploadAdImageDto,
            // Categories
            categories_dtos::CategoryDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            // Locations
            locations_dtos::LocationDto,
        )
    ),
    tags(
        (name = "ads", description = "Classified ad listings"),
        (name = "categories", description = "Ad categories"),
        (name = "locations", description = "Author locations (read-only)"),
    ),
    info(
        title = "Adboard API",
        version = "0.1.0",
        description = "Classified ads listing API",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
