//! Pure mapping from catalog items to display entries.

use crate::types::{MovieItem, PaginatedResponse};

/// One line of the result list: a label linking to an external detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieEntry {
    pub id: i64,
    pub label: String,
    pub href: String,
}

pub fn render_movie(movie: &MovieItem) -> MovieEntry {
    let label = match movie.year {
        Some(year) => format!("{} ({year})", movie.title),
        None => movie.title.clone(),
    };
    MovieEntry {
        id: movie.id,
        label,
        href: movie.imdb_url.clone(),
    }
}

/// Empty when there is nothing to show, whether the list is missing or
/// just has no items.
pub fn render_movie_list(movies: Option<&[MovieItem]>) -> Vec<MovieEntry> {
    movies
        .unwrap_or_default()
        .iter()
        .map(render_movie)
        .collect()
}

/// `None` until a first response has been committed.
pub fn render_result_count<T>(response: Option<&PaginatedResponse<T>>) -> Option<String> {
    response.map(|r| format!("{} results", r.count))
}

/// Five glyphs for a 0 to 5 rating, in half steps, rounded down.
pub fn rating_glyphs(rating: f64) -> String {
    let half_steps = (rating.clamp(0.0, 5.0) * 2.0).floor() as usize;
    let filled = half_steps / 2;
    let half = half_steps % 2;
    let empty = 5 - filled - half;
    format!(
        "{}{}{}",
        "●".repeat(filled),
        "◐".repeat(half),
        "○".repeat(empty)
    )
}
