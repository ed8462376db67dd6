//! API client library for cinefind.
//!
//! Provides the OMDb client and the search session that drives
//! fresh searches and pagination on top of it.

/// OMDb API client.
pub mod omdb;

/// Search and pagination session.
pub mod session;

#[allow(clippy::module_name_repetitions)]
pub use omdb::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, LocalMovieApi, Movie, MovieApi, MovieDetail, OmdbClient,
    OmdbClientBuilder, OmdbError, RequestKind, SearchOutcome, SearchParams, SearchResponse,
};
pub use session::{
    LOAD_MORE_ERROR, LoadMoreSkip, LoadMoreUpdate, SearchSession, SearchUpdate, SessionSnapshot,
    SessionStatus,
};
