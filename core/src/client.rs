//! Stateless HTTP request builder and response parser for the catalog API.
//!
//! # Design
//! `MovieClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{MovieItem, PaginatedResponse, SearchParams};

const MOVIES_PATH: &str = "/api/movies";

/// Synchronous, stateless client for the catalog API.
#[derive(Debug, Clone)]
pub struct MovieClient {
    base_url: String,
}

impl MovieClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_search_movies(&self, params: &SearchParams) -> HttpRequest {
        get(format!(
            "{}{MOVIES_PATH}?{}",
            self.base_url,
            params.to_query_string()
        ))
    }

    pub fn build_get_movie(&self, id: i64) -> HttpRequest {
        get(format!("{}{MOVIES_PATH}/{id}", self.base_url))
    }

    /// Build a request for a `next`/`previous` link of a paginated response.
    /// Absolute links are used as-is, anything else is resolved against the
    /// base URL.
    pub fn build_follow(&self, link: &str) -> HttpRequest {
        if link.starts_with("http://") || link.starts_with("https://") {
            get(link.to_string())
        } else {
            let path = link.trim_start_matches('/');
            get(format!("{}/{path}", self.base_url))
        }
    }

    pub fn parse_search_movies(
        &self,
        response: HttpResponse,
    ) -> Result<PaginatedResponse<MovieItem>, ApiError> {
        check_status(&response, 200)?;
        parse_json(&response.body)
    }

    pub fn parse_get_movie(&self, response: HttpResponse) -> Result<MovieItem, ApiError> {
        check_status(&response, 200)?;
        parse_json(&response.body)
    }
}

fn get(url: String) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url,
        headers: vec![("accept".to_string(), "application/json".to_string())],
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}
