//! Plain-text rendering of the committed response.

use colored::Colorize;
use movie_search_core::{
    rating_glyphs, render_movie, render_result_count, MovieItem, PaginatedResponse,
};

/// Count line followed by one numbered line per movie. Empty before the
/// first response.
pub fn format_page(response: Option<&PaginatedResponse<MovieItem>>, page: u32, page_size: u32) -> String {
    let Some(response) = response else {
        return String::new();
    };
    let mut out = String::new();
    if let Some(count) = render_result_count(Some(response)) {
        out.push_str(&count.bold().to_string());
        out.push('\n');
    }

    let offset = (page.saturating_sub(1) as usize) * page_size as usize;
    for (i, movie) in response.results.iter().enumerate() {
        let entry = render_movie(movie);
        let rating = match movie.avg_rating {
            Some(avg) => format!("{} ({})", rating_glyphs(avg), movie.num_ratings),
            None => String::new(),
        };
        out.push_str(&format!(
            "{:>4}. {}  {}  {}\n",
            offset + i + 1,
            entry.label,
            rating.yellow(),
            entry.href.dimmed()
        ));
    }

    let mut nav = Vec::new();
    if response.previous.is_some() {
        nav.push(":prev");
    }
    if response.next.is_some() {
        nav.push(":next");
    }
    if !nav.is_empty() {
        out.push_str(&format!("page {page}  {}\n", nav.join(" ").dimmed()));
    }
    out
}
