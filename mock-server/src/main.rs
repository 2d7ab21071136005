use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use mock_server::Catalog;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serve the movie catalog search API.
#[derive(Parser)]
#[command(name = "mock-server", version)]
struct Args {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// MovieLens export (movies.csv, links.csv, ratings.csv), unpacked or as
    /// the downloaded .zip. Falls back to a small built-in catalog.
    #[arg(long, env = "MOVIE_CATALOG", value_name = "PATH")]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let catalog = match &args.catalog {
        Some(path) => Catalog::load_movielens(path)
            .with_context(|| format!("loading catalog from {}", path.display()))?,
        None => Catalog::seed(),
    };

    let addr = format!("127.0.0.1:{}", args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, movies = catalog.len(), "listening");
    mock_server::run_with(listener, catalog).await?;
    Ok(())
}
