//! OMDb API client module.
//!
//! Handles HTTP requests to the OMDb endpoint for title search
//! and detail lookups, with per-kind cancellation and a request timeout.

mod api;
mod client;
mod error;
mod inflight;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalMovieApi, MovieApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, OmdbClient, OmdbClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use error::OmdbError;
pub use inflight::RequestKind;
pub use types::{
    CANCELED_MESSAGE, Movie, MovieDetail, Rating, SearchOutcome, SearchParams, SearchResponse,
};
