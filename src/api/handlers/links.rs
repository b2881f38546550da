//! Handlers for link listing and lookup.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::dto::link::{LinkListResponse, ListParams, ShortLinkResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Lists links with their click counts, newest first.
///
/// # Endpoint
///
/// `GET /api/urls?limit=50`
///
/// `limit` defaults to 50 and is clamped to 1..=500.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let links = state.link_service.list_links(params.limit).await?;

    Ok(Json(LinkListResponse {
        urls: links.into_iter().map(ShortLinkResponse::from).collect(),
    }))
}

/// Returns one link by id.
///
/// # Endpoint
///
/// `GET /api/urls/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if no link has this id.
pub async fn get_link_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ShortLinkResponse>, AppError> {
    let link = state.link_service.get_link(id).await?;

    Ok(Json(link.into()))
}
