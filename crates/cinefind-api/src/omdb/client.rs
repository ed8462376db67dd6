//! `OmdbClient` - OMDb API client implementation.

use std::time::Duration;

use anyhow::{Context, Result, ensure};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use super::api::LocalMovieApi;
use super::error::OmdbError;
use super::inflight::{InFlightRequests, RequestKind};
use super::types::{MovieDetail, SearchParams, SearchResponse};

/// Default base URL for the OMDb API.
pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// Default time a request may take before it is aborted.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// OMDb API client.
///
/// Owns one in-flight slot per [`RequestKind`]: a new request of a kind
/// aborts the previous request of that kind.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// OMDb API key.
    api_key: String,
    /// Per-request timeout.
    timeout: Duration,
    /// In-flight request slots.
    in_flight: InFlightRequests,
}

/// Builder for `OmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl OmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            timeout: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the request timeout (default: 10s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set or empty.
    /// - `user_agent` is not set.
    /// - `timeout` is zero.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<OmdbClient> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .context("api_key is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        ensure!(!timeout.is_zero(), "timeout must be greater than zero");

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(OmdbClient {
            http_client,
            base_url,
            api_key,
            timeout,
            in_flight: InFlightRequests::default(),
        })
    }
}

impl OmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> OmdbClientBuilder {
        OmdbClientBuilder::new()
    }

    /// Configured request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Aborts the in-flight request of `kind`.
    ///
    /// Returns `false` if no request of that kind was running.
    pub fn cancel(&self, kind: RequestKind) -> bool {
        self.in_flight.cancel(kind)
    }

    /// Whether a request of `kind` is currently running.
    #[must_use]
    pub fn is_in_flight(&self, kind: RequestKind) -> bool {
        self.in_flight.is_active(kind)
    }

    /// Runs a GET request in the slot for `kind`, racing it against
    /// supersession and the timeout.
    #[instrument(skip_all, fields(kind = kind.as_str()))]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        kind: RequestKind,
        query: &[(&str, String)],
    ) -> Result<T, OmdbError> {
        let mut handle = self.in_flight.begin(kind);

        tokio::select! {
            biased;
            _ = &mut handle.aborted => Err(OmdbError::Canceled),
            () = tokio::time::sleep(self.timeout) => Err(OmdbError::Timeout(self.timeout)),
            result = self.fetch_json(query) => result,
        }
    }

    /// Sends the request and decodes the body.
    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        query: &[(&str, String)],
    ) -> Result<T, OmdbError> {
        tracing::debug!(?query, "OMDb API request");

        let response = self
            .http_client
            .get(self.base_url.clone())
            .query(&[("apikey", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // OMDb reports some failures (e.g. an invalid key) with a JSON body on a 4xx.
            let message = serde_json::from_str::<SearchResponse>(&body)
                .ok()
                .and_then(|r| r.error);
            if let Some(message) = message {
                return Err(OmdbError::Api(message));
            }
            return Err(OmdbError::Http { status });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl LocalMovieApi for OmdbClient {
    #[instrument(skip_all, fields(kind = params.kind.as_str(), page = params.page))]
    async fn search(&self, params: &SearchParams) -> SearchResponse {
        let query = [
            ("s", params.query.clone()),
            ("page", params.page.to_string()),
        ];

        match self.get_json::<SearchResponse>(params.kind, &query).await {
            Ok(response) => response,
            Err(e) if e.is_cancellation() => {
                tracing::info!(reason = %e, "Search request was canceled");
                SearchResponse::canceled()
            }
            Err(e) => {
                tracing::error!(error = %e, query = %params.query, "Error searching movies");
                SearchResponse::failed(e.to_string())
            }
        }
    }

    #[instrument(skip_all, fields(imdb_id = %imdb_id))]
    async fn movie_details(&self, imdb_id: &str) -> Result<MovieDetail, OmdbError> {
        let query = [("i", String::from(imdb_id)), ("plot", String::from("full"))];

        let detail: MovieDetail = self
            .get_json(RequestKind::Detail, &query)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching movie details"))?;

        if !detail.is_success() {
            let message = detail
                .error
                .unwrap_or_else(|| String::from("Movie not found"));
            return Err(OmdbError::Api(message));
        }

        Ok(detail)
    }
}
