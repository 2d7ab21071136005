//! Stand-in for the movie catalog backend.
//!
//! Serves `GET /api/movies` (searchable, paginated) and
//! `GET /api/movies/{id}` from an in-memory [`Catalog`].

pub mod catalog;
pub mod pagination;
pub mod search;

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::debug;

pub use catalog::{Catalog, CatalogError, Movie};
use pagination::{Page, PageRequest};
use search::SearchQuery;

pub type Db = Arc<Catalog>;

/// Router over the built-in seed catalog.
pub fn app() -> Router {
    app_with(Catalog::seed())
}

pub fn app_with(catalog: Catalog) -> Router {
    let db: Db = Arc::new(catalog);
    Router::new()
        .route("/api/movies", get(list_movies))
        .route("/api/movies/{id}", get(get_movie))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, catalog: Catalog) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(catalog)).await
}

/// Error body in the `{"detail": ...}` shape clients already expect.
#[derive(Debug)]
pub enum ApiFailure {
    NotFound,
    InvalidPage,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let detail = match self {
            ApiFailure::NotFound => "Not found.",
            ApiFailure::InvalidPage => "Invalid page.",
        };
        (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
    }
}

async fn list_movies(
    State(db): State<Db>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<Movie>>, ApiFailure> {
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
        .into_owned()
        .collect();
    let query = pairs
        .iter()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.as_str())
        .unwrap_or_default();

    let matches = db.search(&SearchQuery::parse(query));
    debug!(q = query, matches = matches.len(), "search");

    let page = PageRequest::from_pairs(pairs.iter().cloned())
        .paginate(&matches, &endpoint_url(&headers))
        .map_err(|_| ApiFailure::InvalidPage)?;
    Ok(Json(page))
}

async fn get_movie(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Movie>, ApiFailure> {
    db.get(id).cloned().map(Json).ok_or(ApiFailure::NotFound)
}

/// Absolute URL of the list endpoint as seen by the caller.
fn endpoint_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}/api/movies")
}
