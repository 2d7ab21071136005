//! Terminal host for the movie catalog search.
//!
//! # Overview
//! Executes the requests the core builds (`fetch`), drives the core's
//! controller so that only the latest query's result is ever shown
//! (`session`), and formats the committed response for a terminal
//! (`display`).

pub mod display;
pub mod fetch;
pub mod session;

pub use fetch::{fetch_movies, HttpSource, MovieSource};
pub use session::{LiveSearch, Update};
