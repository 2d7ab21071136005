//! In-memory movie catalog, seeded or loaded from a MovieLens export.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::search::SearchQuery;

static TITLE_WITH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+) \((\d{4})\)$").expect("valid title regex"));

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub avg_rating: Option<f64>,
    pub num_ratings: u64,
    pub imdb_url: String,
    pub tmdb_url: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid MovieLens archive: {0}")]
    Zip(#[from] ZipError),
    #[error("archive has no {file}")]
    MissingEntry { file: &'static str },
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: Vec<Movie>,
}

#[derive(Deserialize)]
struct MovieRow {
    #[serde(rename = "movieId")]
    movie_id: i64,
    title: String,
    genres: String,
}

#[derive(Deserialize)]
struct LinkRow {
    #[serde(rename = "movieId")]
    movie_id: i64,
    #[serde(rename = "imdbId")]
    imdb_id: Option<String>,
    #[serde(rename = "tmdbId")]
    tmdb_id: Option<String>,
}

#[derive(Deserialize)]
struct RatingRow {
    #[serde(rename = "movieId")]
    movie_id: i64,
    rating: f64,
}

impl Catalog {
    pub fn new(mut movies: Vec<Movie>) -> Self {
        movies.sort_by_key(|m| m.id);
        movies.dedup_by_key(|m| m.id);
        Self { movies }
    }

    /// A handful of well-known titles, enough for local runs and tests.
    pub fn seed() -> Self {
        let rows: [(i64, &str, Option<i32>, &[&str], Option<f64>, u64, &str, u64); 8] = [
            (1, "Toy Story", Some(1995), &["Adventure", "Animation", "Children", "Comedy", "Fantasy"], Some(3.92), 215, "0114709", 862),
            (10, "GoldenEye", Some(1995), &["Action", "Adventure", "Thriller"], Some(3.5), 132, "0113189", 710),
            (32, "Twelve Monkeys (a.k.a. 12 Monkeys)", Some(1995), &["Mystery", "Sci-Fi", "Thriller"], Some(3.98), 177, "0114746", 63),
            (1196, "Star Wars: Episode V - The Empire Strikes Back", Some(1980), &["Action", "Adventure", "Sci-Fi"], Some(4.22), 211, "0080684", 1891),
            (1371, "Star Trek: The Motion Picture", Some(1979), &["Adventure", "Sci-Fi"], Some(3.04), 48, "0079945", 152),
            (2571, "Matrix, The", Some(1999), &["Action", "Sci-Fi", "Thriller"], Some(4.19), 278, "0133093", 603),
            (6365, "Matrix Reloaded, The", Some(2003), &["Action", "Adventure", "Sci-Fi", "Thriller", "IMAX"], Some(3.35), 69, "0234215", 604),
            (171495, "Cosmos", None, &["(no genres listed)"], None, 0, "0081846", 0),
        ];
        Self::new(
            rows.into_iter()
                .map(|(id, title, year, genres, avg_rating, num_ratings, imdb, tmdb)| Movie {
                    id,
                    title: title.to_string(),
                    year,
                    genres: genres.iter().map(|g| g.to_string()).collect(),
                    avg_rating,
                    num_ratings,
                    imdb_url: imdb_url(imdb),
                    tmdb_url: if tmdb == 0 { String::new() } else { tmdb_url(&tmdb.to_string()) },
                })
                .collect(),
        )
    }

    /// Load `movies.csv` and `links.csv` from a MovieLens export, either an
    /// unpacked directory or the `.zip` as downloaded (files may sit in a
    /// top-level folder inside it). `ratings.csv` is optional; without it
    /// every movie is unrated.
    pub fn load_movielens(path: &Path) -> Result<Self, CatalogError> {
        let mut export = Export::open(path)?;
        let mut movies: Vec<Movie> = export
            .rows::<MovieRow>("movies.csv")?
            .into_iter()
            .map(|row| {
                let (title, year) = split_title(&row.title);
                Movie {
                    id: row.movie_id,
                    title,
                    year,
                    genres: row.genres.split('|').map(str::to_string).collect(),
                    avg_rating: None,
                    num_ratings: 0,
                    imdb_url: String::new(),
                    tmdb_url: String::new(),
                }
            })
            .collect();

        let mut index: HashMap<i64, usize> = HashMap::with_capacity(movies.len());
        for (i, movie) in movies.iter().enumerate() {
            index.insert(movie.id, i);
        }

        for link in export.rows::<LinkRow>("links.csv")? {
            let Some(&i) = index.get(&link.movie_id) else {
                continue;
            };
            if let Some(imdb) = link.imdb_id.as_deref().filter(|s| !s.is_empty()) {
                movies[i].imdb_url = imdb_url(imdb);
            }
            if let Some(tmdb) = link.tmdb_id.as_deref().filter(|s| !s.is_empty()) {
                movies[i].tmdb_url = tmdb_url(tmdb);
            }
        }

        if export.has("ratings.csv") {
            let mut totals: HashMap<i64, (f64, u64)> = HashMap::new();
            for rating in export.rows::<RatingRow>("ratings.csv")? {
                let entry = totals.entry(rating.movie_id).or_default();
                entry.0 += rating.rating;
                entry.1 += 1;
            }
            for (movie_id, (sum, count)) in totals {
                if let Some(&i) = index.get(&movie_id) {
                    movies[i].avg_rating = Some(sum / count as f64);
                    movies[i].num_ratings = count;
                }
            }
        }

        let catalog = Self::new(movies);
        info!(movies = catalog.len(), path = %path.display(), "loaded MovieLens catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Movie> {
        self.movies
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .map(|i| &self.movies[i])
    }

    /// Matching movies in id order.
    pub fn search(&self, query: &SearchQuery) -> Vec<Movie> {
        self.movies
            .iter()
            .filter(|m| query.matches(&m.title))
            .cloned()
            .collect()
    }
}

/// Where the MovieLens CSV files come from.
enum Export {
    Dir(PathBuf),
    Zip(ZipArchive<File>),
}

impl Export {
    fn open(path: &Path) -> Result<Self, CatalogError> {
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if !is_zip {
            return Ok(Self::Dir(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::Zip(ZipArchive::new(file)?))
    }

    fn has(&self, file: &str) -> bool {
        match self {
            Self::Dir(dir) => dir.join(file).exists(),
            Self::Zip(archive) => entry_name(archive, file).is_some(),
        }
    }

    fn rows<T: DeserializeOwned>(&mut self, file: &'static str) -> Result<Vec<T>, CatalogError> {
        match self {
            Self::Dir(dir) => {
                let reader = csv::Reader::from_path(dir.join(file))
                    .map_err(|source| CatalogError::Csv { file, source })?;
                collect_rows(reader, file)
            }
            Self::Zip(archive) => {
                let name = entry_name(archive, file).ok_or(CatalogError::MissingEntry { file })?;
                let entry = archive.by_name(&name)?;
                collect_rows(csv::Reader::from_reader(entry), file)
            }
        }
    }
}

/// Full name of the archive entry whose last path component is `file`.
fn entry_name(archive: &ZipArchive<File>, file: &str) -> Option<String> {
    archive
        .file_names()
        .find(|name| name.rsplit('/').next() == Some(file))
        .map(str::to_string)
}

fn collect_rows<T: DeserializeOwned, R: Read>(
    mut reader: csv::Reader<R>,
    file: &'static str,
) -> Result<Vec<T>, CatalogError> {
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|source| CatalogError::Csv { file, source })
}

/// `"Heat (1995)"` becomes `("Heat", Some(1995))`; titles without a
/// trailing year are kept whole.
fn split_title(raw: &str) -> (String, Option<i32>) {
    let raw = raw.trim();
    match TITLE_WITH_YEAR.captures(raw) {
        Some(caps) => (caps[1].to_string(), caps[2].parse().ok()),
        None => (raw.to_string(), None),
    }
}

fn imdb_url(imdb_id: &str) -> String {
    format!("https://www.imdb.com/title/tt{imdb_id}/")
}

fn tmdb_url(tmdb_id: &str) -> String {
    format!("https://www.themoviedb.org/movie/{tmdb_id}")
}
