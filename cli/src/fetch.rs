//! Async transport for the core client, with cooperative cancellation.
//!
//! # Design
//! The core only builds and parses plain-data requests. `HttpSource` is the
//! host side of that contract: it executes each `HttpRequest` with reqwest
//! and hands the `HttpResponse` back for parsing. `fetch_movies` races a
//! source against a `CancellationToken`; when the token wins, the in-flight
//! request future is dropped, which is how reqwest aborts a connection.

use std::future::Future;
use std::time::Duration;

use movie_search_core::{
    ApiError, HttpMethod, HttpRequest, HttpResponse, MovieClient, MovieItem, PaginatedResponse,
    SearchParams,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Anything that can answer a catalog search.
pub trait MovieSource: Send + Sync + 'static {
    fn search(
        &self,
        params: SearchParams,
    ) -> impl Future<Output = Result<PaginatedResponse<MovieItem>, ApiError>> + Send;
}

/// Run one search on `source`, giving up as soon as `cancel` fires.
///
/// Exactly one request is issued; there is no retry and no caching.
pub async fn fetch_movies<S: MovieSource>(
    source: &S,
    params: SearchParams,
    cancel: &CancellationToken,
) -> Result<PaginatedResponse<MovieItem>, ApiError> {
    if cancel.is_cancelled() {
        return Err(ApiError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(q = params.query(), page = params.page(), "search aborted");
            Err(ApiError::Cancelled)
        }
        result = source.search(params.clone()) => result,
    }
}

/// The catalog API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: MovieClient,
    http: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            client: MovieClient::new(base_url),
            http,
        })
    }

    pub fn client(&self) -> &MovieClient {
        &self.client
    }

    /// Execute a request built by the core and capture the response as data.
    /// Non-2xx statuses are not errors here; the core interprets them.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        trace!(method = request.method.as_str(), url = %request.url, "sending");
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl MovieSource for HttpSource {
    async fn search(
        &self,
        params: SearchParams,
    ) -> Result<PaginatedResponse<MovieItem>, ApiError> {
        let response = self.execute(self.client.build_search_movies(&params)).await?;
        self.client.parse_search_movies(response)
    }
}
