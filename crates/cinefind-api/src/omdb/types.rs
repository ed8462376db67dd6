//! OMDb API response types and search parameters.

use serde::{Deserialize, Serialize};

use super::inflight::RequestKind;

/// Marker OMDb uses for a missing poster or field value.
const NOT_AVAILABLE: &str = "N/A";

/// `Error` message of a search that was canceled or timed out.
pub const CANCELED_MESSAGE: &str = "Search canceled";

/// `Response` flag value for a successful call.
const RESPONSE_TRUE: &str = "True";

/// `Response` flag value for a failed call.
const RESPONSE_FALSE: &str = "False";

// --- Movie summary ---

/// A movie as returned in search results.
///
/// Field names follow the OMDb wire format so the same shape can be
/// persisted and read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// IMDb ID (e.g. `tt0078748`), unique per movie.
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    /// Title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year (may be a range such as `2008-2013` for series).
    #[serde(rename = "Year")]
    pub year: String,
    /// Poster URL, or `N/A`.
    #[serde(rename = "Poster", default = "not_available")]
    pub poster: String,
    /// Result type (`movie`, `series`, `episode`).
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Movie {
    /// Returns the poster URL, or `None` when OMDb has no image.
    #[must_use]
    pub fn poster_url(&self) -> Option<&str> {
        available(&self.poster)
    }
}

// --- Search ---

/// Response from a `?s=` search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Movies on the current page.
    #[serde(rename = "Search", default)]
    pub search: Vec<Movie>,
    /// Total number of results across all pages (a string on the wire).
    #[serde(rename = "totalResults", default = "zero")]
    pub total_results: String,
    /// `"True"` or `"False"`.
    #[serde(rename = "Response")]
    pub response: String,
    /// Error message when `response` is `"False"`.
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Typed view over a [`SearchResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The API returned a page of movies.
    Found {
        /// Movies on the page.
        movies: Vec<Movie>,
        /// Total results across all pages.
        total_results: u32,
    },
    /// The request was superseded, aborted, or timed out.
    Canceled,
    /// The request failed; the message is suitable for display.
    Failed(String),
}

impl SearchResponse {
    /// Builds the response returned for a canceled request.
    #[must_use]
    pub fn canceled() -> Self {
        Self::failed(CANCELED_MESSAGE)
    }

    /// Builds an empty failed response carrying `message`.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            search: Vec::new(),
            total_results: zero(),
            response: String::from(RESPONSE_FALSE),
            error: Some(message.into()),
        }
    }

    /// Whether the API reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response == RESPONSE_TRUE
    }

    /// Whether this is the canceled sentinel rather than an API answer.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        !self.is_success() && self.error.as_deref() == Some(CANCELED_MESSAGE)
    }

    /// Parsed `totalResults`; unparsable values count as zero.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.total_results.trim().parse().unwrap_or(0)
    }

    /// Whether the error text looks like an API key problem.
    ///
    /// This matches on OMDb's message wording and is only a hint.
    #[must_use]
    pub fn is_invalid_api_key(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(|e| e.contains("API key"))
    }

    /// Consumes the response into a [`SearchOutcome`].
    #[must_use]
    pub fn into_outcome(self) -> SearchOutcome {
        if self.is_success() {
            let total_results = self.total();
            return SearchOutcome::Found {
                movies: self.search,
                total_results,
            };
        }
        if self.is_canceled() {
            return SearchOutcome::Canceled;
        }
        SearchOutcome::Failed(
            self.error
                .unwrap_or_else(|| String::from("No results found")),
        )
    }
}

/// Parameters for a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Search query (required).
    pub query: String,
    /// Result page, starting at 1.
    pub page: u32,
    /// In-flight slot the request occupies.
    pub kind: RequestKind,
}

impl SearchParams {
    /// Creates params for the first page of a fresh search.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            kind: RequestKind::Search,
        }
    }

    /// Sets the result page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Marks the request as a pagination request.
    #[must_use]
    pub const fn load_more(mut self) -> Self {
        self.kind = RequestKind::LoadMore;
        self
    }
}

// --- Details ---

/// A rating entry from a third-party source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// Source name (e.g. `Rotten Tomatoes`).
    #[serde(rename = "Source")]
    pub source: String,
    /// Rating value as displayed by the source.
    #[serde(rename = "Value")]
    pub value: String,
}

/// Response from a `?i=` detail request with `plot=full`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    /// IMDb ID.
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    /// Title.
    #[serde(rename = "Title", default)]
    pub title: String,
    /// Release year.
    #[serde(rename = "Year", default)]
    pub year: String,
    /// Poster URL, or `N/A`.
    #[serde(rename = "Poster", default = "not_available")]
    pub poster: String,
    /// Result type.
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    /// Content rating (e.g. `R`).
    #[serde(rename = "Rated", default)]
    pub rated: Option<String>,
    /// Release date.
    #[serde(rename = "Released", default)]
    pub released: Option<String>,
    /// Runtime (e.g. `117 min`).
    #[serde(rename = "Runtime", default)]
    pub runtime: Option<String>,
    /// Comma-separated genres.
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
    /// Director(s).
    #[serde(rename = "Director", default)]
    pub director: Option<String>,
    /// Writer(s).
    #[serde(rename = "Writer", default)]
    pub writer: Option<String>,
    /// Main cast.
    #[serde(rename = "Actors", default)]
    pub actors: Option<String>,
    /// Full plot.
    #[serde(rename = "Plot", default)]
    pub plot: Option<String>,
    /// Spoken languages.
    #[serde(rename = "Language", default)]
    pub language: Option<String>,
    /// Production countries.
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
    /// Awards summary.
    #[serde(rename = "Awards", default)]
    pub awards: Option<String>,
    /// Metascore (0-100 as a string).
    #[serde(rename = "Metascore", default)]
    pub metascore: Option<String>,
    /// IMDb rating (e.g. `8.5`).
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    /// IMDb vote count.
    #[serde(rename = "imdbVotes", default)]
    pub imdb_votes: Option<String>,
    /// Ratings from other sources.
    #[serde(rename = "Ratings", default)]
    pub ratings: Vec<Rating>,
    /// `"True"` or `"False"`.
    #[serde(rename = "Response", default)]
    pub response: String,
    /// Error message when `response` is `"False"`.
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MovieDetail {
    /// Returns the poster URL, or `None` when OMDb has no image.
    #[must_use]
    pub fn poster_url(&self) -> Option<&str> {
        available(&self.poster)
    }

    /// Returns a field value with OMDb's `N/A` mapped to `None`.
    #[must_use]
    pub fn field(value: Option<&str>) -> Option<&str> {
        value.and_then(available)
    }

    /// Whether the API reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response == RESPONSE_TRUE
    }

    /// Reduces the detail record to its search-result summary.
    #[must_use]
    pub fn summary(&self) -> Movie {
        Movie {
            imdb_id: self.imdb_id.clone(),
            title: self.title.clone(),
            year: self.year.clone(),
            poster: self.poster.clone(),
            kind: self.kind.clone(),
        }
    }
}

fn available(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
        None
    } else {
        Some(trimmed)
    }
}

fn not_available() -> String {
    String::from(NOT_AVAILABLE)
}

fn zero() -> String {
    String::from("0")
}
