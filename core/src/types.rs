//! Domain DTOs for the movie catalog API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// A single catalog record returned by the API. The client never builds or
/// edits one; it only deserializes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieItem {
    pub id: i64,
    pub title: String,
    /// Missing for catalog titles that carry no release year.
    pub year: Option<i32>,
    pub genres: Vec<String>,
    /// `null` when the movie has no ratings yet.
    pub avg_rating: Option<f64>,
    pub num_ratings: u64,
    pub imdb_url: String,
    pub tmdb_url: String,
}

/// Envelope returned by list endpoints: the total match count, one page of
/// items and links to the neighbouring pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginatedResponse<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Parameters of a single search request. Built fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    query: String,
    page: u32,
    page_size: u32,
}

impl SearchParams {
    /// Checked constructor; `page` and `page_size` start at 1.
    pub fn new(query: impl Into<String>, page: u32, page_size: u32) -> Result<Self, ApiError> {
        if page == 0 {
            return Err(ApiError::InvalidParams("page must be at least 1".to_string()));
        }
        if page_size == 0 {
            return Err(ApiError::InvalidParams(
                "page_size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            query: query.into(),
            page,
            page_size,
        })
    }

    /// For callers that already guarantee `page >= 1` and `page_size >= 1`.
    pub(crate) fn unchecked(query: String, page: u32, page_size: u32) -> Self {
        debug_assert!(page >= 1 && page_size >= 1);
        Self {
            query,
            page,
            page_size,
        }
    }

    /// First page of `query` at the default page size.
    pub fn for_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Encoded as `q`, `page`, `page_size`, in that order.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", &self.query)
            .append_pair("page", &self.page.to_string())
            .append_pair("page_size", &self.page_size.to_string())
            .finish()
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::for_query("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_all_first_page() {
        let params = SearchParams::default();
        assert_eq!(params.query(), "");
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 100);
        assert_eq!(params.to_query_string(), "q=&page=1&page_size=100");
    }

    #[test]
    fn encodes_matrix_page_two() {
        let params = SearchParams::new("matrix", 2, 50).unwrap();
        assert!(params
            .to_query_string()
            .contains("q=matrix&page=2&page_size=50"));
    }

    #[test]
    fn spaces_and_reserved_characters_are_escaped() {
        let params = SearchParams::new("tom & jerry", 1, 10).unwrap();
        assert_eq!(
            params.to_query_string(),
            "q=tom+%26+jerry&page=1&page_size=10"
        );
    }

    #[test]
    fn zero_page_is_rejected() {
        let err = SearchParams::new("x", 0, 10).unwrap_err();
        assert!(matches!(err, ApiError::InvalidParams(_)));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = SearchParams::new("x", 1, 0).unwrap_err();
        assert!(matches!(err, ApiError::InvalidParams(_)));
    }

    #[test]
    fn movie_accepts_null_year_and_rating() {
        let movie: MovieItem = serde_json::from_str(
            r#"{"id":7,"title":"Untitled","year":null,"genres":[],"avg_rating":null,
                "num_ratings":0,"imdb_url":"http://imdb/7","tmdb_url":"http://tmdb/7"}"#,
        )
        .unwrap();
        assert!(movie.year.is_none());
        assert!(movie.avg_rating.is_none());
    }

    #[test]
    fn movie_rejects_missing_title() {
        let result: Result<MovieItem, _> = serde_json::from_str(
            r#"{"id":7,"year":2000,"genres":[],"avg_rating":1.0,
                "num_ratings":1,"imdb_url":"a","tmdb_url":"b"}"#,
        );
        assert!(result.is_err());
    }
}
