use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
            JsonRejection::MissingJsonContentType(err) => {
                format!("Missing JSON content type: {}", err)
            }
            _ => "Failed to parse JSON body".to_string(),
        };

        AppError::BadRequest(message).into_response()
    }
}

/// Query-string extractor that turns deserialization failures (e.g. a
/// non-numeric `price_from`) into 400 JSON responses instead of the
/// default plain-text rejection.
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppQueryRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppQueryRejection(rejection)),
        }
    }
}

pub struct AppQueryRejection(QueryRejection);

impl IntoResponse for AppQueryRejection {
    fn into_response(self) -> Response {
        AppError::BadRequest(format!("Invalid query parameters: {}", self.0.body_text()))
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, routing::post, Router};
    use axum_test::TestServer;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct PriceWindow {
        price_from: Option<f64>,
        price_to: Option<f64>,
    }

    async fn echo_window(AppQuery(window): AppQuery<PriceWindow>) -> String {
        format!("{:?}..{:?}", window.price_from, window.price_to)
    }

    #[derive(Deserialize)]
    struct NamedBody {
        name: String,
    }

    async fn echo_body(AppJson(body): AppJson<NamedBody>) -> String {
        body.name
    }

    fn server() -> TestServer {
        let app = Router::new()
            .route("/echo", get(echo_window))
            .route("/echo", post(echo_body));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn bad_numeric_query_param_is_400_json() {
        let response = server().get("/echo").add_query_param("price_from", "abc").await;
        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("Invalid query parameters"));
    }

    #[tokio::test]
    async fn valid_query_params_pass_through() {
        let response = server()
            .get("/echo")
            .add_query_param("price_from", "10.5")
            .add_query_param("price_to", "20")
            .await;
        response.assert_status_ok();
        response.assert_text("Some(10.5)..Some(20.0)");
    }

    #[tokio::test]
    async fn malformed_json_body_is_400_json() {
        // content type is set after the body: `.text` would otherwise
        // override it with text/plain
        let response = server()
            .post("/echo")
            .text(r#"{"name": "#)
            .content_type("application/json")
            .await;
        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("Invalid JSON"));
    }

    #[tokio::test]
    async fn missing_field_in_json_body_is_400() {
        let response = server()
            .post("/echo")
            .json(&serde_json::json!({ "label": "chair" }))
            .await;
        response.assert_status_bad_request();
    }
}
