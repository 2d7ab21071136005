//! Client core for the movie catalog search API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `MovieClient` is stateless: it holds only `base_url`.
//! - Each endpoint is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - `SearchController` owns the query and the last committed response and
//!   decides, per generation, whether a finished fetch may be committed.
//!   It never performs I/O either; the host drives it.
//! - `render` turns catalog items into display entries and nothing else.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod controller;
pub mod error;
pub mod http;
pub mod render;
pub mod types;

pub use client::MovieClient;
pub use controller::{Resolution, SearchController, SearchState, Ticket};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use render::{rating_glyphs, render_movie, render_movie_list, render_result_count, MovieEntry};
pub use types::{MovieItem, PaginatedResponse, SearchParams};
