//! `MovieApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::OmdbError;
use super::types::{MovieDetail, SearchParams, SearchResponse};

/// Movie database API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(MovieApi: Send)]
pub trait LocalMovieApi {
    /// Searches titles by free text.
    ///
    /// Never fails: cancellation and errors are folded into the
    /// returned [`SearchResponse`] as `Response: "False"` with an
    /// `Error` message.
    async fn search(&self, params: &SearchParams) -> SearchResponse;

    /// Fetches the full record for one IMDb ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is canceled, times out, fails at the
    /// HTTP level, cannot be decoded, or OMDb reports the ID as unknown.
    async fn movie_details(&self, imdb_id: &str) -> Result<MovieDetail, OmdbError>;
}
