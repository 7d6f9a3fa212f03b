use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::ads::models::{AdSummaryRow, AdWithAuthor};

/// Treats `?cat=` the same as an absent `cat`: an empty value disables
/// the filter instead of failing deserialization.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Query params for the ad listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AdListQuery {
    /// Category id, exact match
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub cat: Option<i64>,
    /// Case-insensitive substring match on the ad name
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub text: Option<String>,
    /// Case-insensitive substring match against any location of the ad's author
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub location: Option<String>,
    /// Inclusive lower price bound
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub price_from: Option<f64>,
    /// Inclusive upper price bound
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub price_to: Option<f64>,
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
}

impl AdListQuery {
    pub fn filters(&self) -> AdFilters {
        AdFilters {
            category_id: self.cat,
            text: self.text.clone(),
            location: self.location.clone(),
            price_from: self.price_from,
            price_to: self.price_to,
        }
    }

    /// Requested page, clamped to 1. Pages past the end are not an error;
    /// they come back as an empty page.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Conjunctive listing filters; `None` fields are not applied.
#[derive(Debug, Default, Clone)]
pub struct AdFilters {
    pub category_id: Option<i64>,
    pub text: Option<String>,
    pub location: Option<String>,
    pub price_from: Option<f64>,
    pub price_to: Option<f64>,
}

/// Listing item projection
#[derive(Debug, Serialize, ToSchema)]
pub struct AdSummaryDto {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub author: String,
}

impl From<AdSummaryRow> for AdSummaryDto {
    fn from(row: AdSummaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            author: row.author,
        }
    }
}

/// One page of the ad listing
#[derive(Debug, Serialize, ToSchema)]
pub struct AdPageDto {
    pub items: Vec<AdSummaryDto>,
    pub total: i64,
    pub num_pages: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdDto {
    #[validate(length(min = 1, max = 200, message = "name must be between 1 and 200 characters"))]
    pub name: String,
    pub author_id: i64,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    pub description: String,
    pub is_published: bool,
    pub category_id: i64,
}

/// Full-field patch body; `is_published` is deliberately absent and is
/// preserved across updates.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAdDto {
    #[validate(length(min = 1, max = 200, message = "name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    pub author_id: i64,
    pub category_id: i64,
    pub description: String,
}

/// Full ad projection returned by the detail endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct AdDetailDto {
    pub id: i64,
    pub name: String,
    pub author_id: i64,
    pub author: String,
    pub price: f64,
    pub description: String,
    pub is_published: bool,
    pub category_id: i64,
    /// Public URL of the attached image, null when none is attached
    pub image: Option<String>,
}

impl AdDetailDto {
    /// `image_url` is the resolved public URL, not the raw storage key.
    pub fn project(row: AdWithAuthor, image_url: Option<String>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            author_id: row.author_id,
            author: row.author,
            price: row.price,
            description: row.description,
            is_published: row.is_published,
            category_id: row.category_id,
            image: image_url,
        }
    }
}

/// Image upload request DTO for OpenAPI documentation.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadAdImageDto {
    /// The image file to attach
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
}

/// Allowed MIME types for ad images
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum image size in bytes (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Check if a MIME type is an allowed image type
pub fn is_image_type_allowed(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

/// Get file extension from content type
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_to_one() {
        let query = AdListQuery::default();
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn page_below_one_clamps_to_one() {
        let query = AdListQuery {
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(query.page(), 1);
        let query = AdListQuery {
            page: Some(-3),
            ..Default::default()
        };
        assert_eq!(query.page(), 1);
    }

    #[tokio::test]
    async fn empty_query_values_act_as_absent_filters() {
        use axum::{routing::get, Router};
        use axum_test::TestServer;

        use crate::core::extractor::AppQuery;

        async fn echo(AppQuery(query): AppQuery<AdListQuery>) -> String {
            format!(
                "{:?}|{:?}|{:?}|{:?}",
                query.cat, query.text, query.price_from, query.page
            )
        }

        let server = TestServer::new(Router::new().route("/ads/", get(echo))).unwrap();

        // `?cat=&text=…` with empty values disables those filters
        let response = server
            .get("/ads/")
            .add_query_param("cat", "")
            .add_query_param("text", "")
            .add_query_param("price_from", "")
            .add_query_param("page", "")
            .await;
        response.assert_status_ok();
        response.assert_text("None|None|None|None");

        // supplied values still parse
        let response = server
            .get("/ads/")
            .add_query_param("cat", "7")
            .add_query_param("price_from", "10.5")
            .await;
        response.assert_status_ok();
        response.assert_text("Some(7)|None|Some(10.5)|None");

        // garbage numerics are still rejected with 400
        let response = server.get("/ads/").add_query_param("cat", "abc").await;
        response.assert_status_bad_request();
    }

    #[test]
    fn filters_carry_all_supplied_params() {
        let query = AdListQuery {
            cat: Some(7),
            text: Some("chair".to_string()),
            location: Some("moscow".to_string()),
            price_from: Some(100.0),
            price_to: Some(200.0),
            page: Some(2),
        };
        let filters = query.filters();
        assert_eq!(filters.category_id, Some(7));
        assert_eq!(filters.text.as_deref(), Some("chair"));
        assert_eq!(filters.location.as_deref(), Some("moscow"));
        assert_eq!(filters.price_from, Some(100.0));
        assert_eq!(filters.price_to, Some(200.0));
    }

    #[test]
    fn create_ad_rejects_empty_name_and_negative_price() {
        let dto = CreateAdDto {
            name: String::new(),
            author_id: 1,
            price: -1.0,
            description: "desc".to_string(),
            is_published: false,
            category_id: 1,
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
    }

    #[test]
    fn detail_projection_keeps_all_contract_fields() {
        let row = AdWithAuthor {
            id: 5,
            name: "Chair".to_string(),
            price: 120.0,
            description: "wooden".to_string(),
            is_published: true,
            image: Some("ads/5/abc.jpg".to_string()),
            author_id: 2,
            category_id: 3,
            author: "Ivan".to_string(),
        };
        let dto = AdDetailDto::project(row, Some("/media/ads/5/abc.jpg".to_string()));
        assert_eq!(dto.id, 5);
        assert_eq!(dto.author, "Ivan");
        assert_eq!(dto.author_id, 2);
        assert_eq!(dto.category_id, 3);
        assert_eq!(dto.image.as_deref(), Some("/media/ads/5/abc.jpg"));
    }

    #[test]
    fn image_type_allowlist() {
        assert!(is_image_type_allowed("image/png"));
        assert!(!is_image_type_allowed("application/pdf"));
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("text/plain"), None);
    }
}
