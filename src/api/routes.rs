//! API route configuration.

use crate::api::handlers::{get_link_handler, list_links_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`    - Create a short link
/// - `GET  /urls`       - List links with click counts
/// - `GET  /urls/{id}`  - Fetch one link
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/urls", get(list_links_handler))
        .route("/urls/{id}", get(get_link_handler))
}
