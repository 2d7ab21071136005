use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use movie_search::display::format_page;
use movie_search::{HttpSource, LiveSearch};
use movie_search_core::{Resolution, SearchController};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Search a movie catalog as you type: every line read from stdin replaces
/// the current query. `:next` and `:prev` page through results, `:quit`
/// exits.
#[derive(Parser)]
#[command(name = "movie-search", version)]
struct Args {
    /// Base URL of the catalog API.
    #[arg(long, env = "MOVIE_API_URL", default_value = "http://127.0.0.1:3000")]
    api_url: String,

    /// Results per page.
    #[arg(long, env = "MOVIE_PAGE_SIZE", default_value_t = 100)]
    page_size: u32,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

enum Event {
    Input(Option<String>),
    Fetched(Option<movie_search::Update>),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --debug.
    let default_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let source = HttpSource::new(&args.api_url, Duration::from_secs(args.timeout_secs))
        .context("building HTTP client")?;
    let controller = SearchController::with_page_size(args.page_size)
        .context("invalid --page-size")?;

    println!("{}", "MovieLens Title Search".bold());
    let mut session = LiveSearch::mount(Arc::new(source), controller);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let event = tokio::select! {
            line = lines.next_line() => Event::Input(line.context("reading stdin")?),
            update = session.next_update(), if session.has_outstanding() => Event::Fetched(update),
        };

        match event {
            Event::Input(None) => break,
            Event::Input(Some(line)) => match line.trim_end() {
                ":quit" | ":q" => break,
                ":next" => {
                    if !session.next_page() {
                        eprintln!("{}", "no next page".dimmed());
                    }
                }
                ":prev" => {
                    if !session.previous_page() {
                        eprintln!("{}", "no previous page".dimmed());
                    }
                }
                query => {
                    session.set_query(query);
                }
            },
            Event::Fetched(Some(update)) => match update.resolution {
                Resolution::Committed => {
                    print!(
                        "{}",
                        format_page(session.response(), session.page(), args.page_size)
                    );
                }
                Resolution::Failed(err) => {
                    eprintln!("{} {err}", "search failed:".red());
                }
                Resolution::Superseded | Resolution::Cancelled => {}
            },
            Event::Fetched(None) => {}
        }
    }

    Ok(())
}
