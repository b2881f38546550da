//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::link::ShortLinkResponse;
use crate::api::dto::shorten::ShortenRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "target_url": "https://example.com/a/very/long/path" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "id": 1,
///   "target_url": "https://example.com/a/very/long/path",
///   "short_code": "aZ3kq1x",
///   "clicks": 0
/// }
/// ```
///
/// # Errors
///
/// - 400 `invalid_url` if the target is not an absolute http(s) URL
/// - 400 `validation_error` if the body is not the expected JSON
/// - 503 `code_space_exhausted` if no free short code could be allocated
/// - 500 `internal_error` on storage failure
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortLinkResponse>), AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid request body",
            json!({ "reason": rejection.body_text() }),
        )
    })?;
    payload.validate()?;

    let link = state.shorten_service.shorten(&payload.target_url).await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}
