//! Search session: fresh searches and pagination over a [`LocalMovieApi`].
//!
//! The session accumulates pages for the current query. A new search
//! resets the accumulated results; a stale result (from a search that
//! was superseded while in flight) is never applied. Load-more calls are
//! serialized by an atomic guard that is claimed before the first await.
#![allow(clippy::future_not_send)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::instrument;

use crate::omdb::{LocalMovieApi, Movie, SearchOutcome, SearchParams};

/// Message shown when a pagination request fails.
pub const LOAD_MORE_ERROR: &str = "Error loading more movies";

/// Session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum SessionStatus {
    /// Nothing in flight.
    Idle,
    /// A fresh search is in flight.
    Searching,
    /// A load-more request is in flight.
    LoadingMore,
    /// The last request failed; `error` holds the message.
    Error,
}

/// Result of [`SearchSession::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchUpdate {
    /// Results replaced the previous result set.
    Applied {
        /// Number of movies on the first page.
        count: usize,
        /// Total results across all pages.
        total_results: u32,
    },
    /// The query was blank after trimming.
    Ignored,
    /// A newer search started before this one finished; nothing was applied.
    Superseded,
    /// The request was aborted or timed out; results were cleared silently.
    Canceled,
    /// The API or network failed; results were cleared and the message recorded.
    Failed {
        /// Message suitable for display.
        message: String,
        /// The message looks like an API key problem (hint only).
        invalid_api_key: bool,
    },
}

/// Why a load-more call did not issue a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreSkip {
    /// Another load-more call holds the guard.
    InProgress,
    /// A fresh search is in flight.
    Searching,
    /// Every result is already loaded (or there is no search yet).
    Exhausted,
}

/// Result of [`SearchSession::load_more`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMoreUpdate {
    /// The next page was appended.
    Appended {
        /// Number of movies appended.
        added: usize,
        /// Page counter after appending.
        page: u32,
    },
    /// No request was made.
    Skipped(LoadMoreSkip),
    /// The search changed while the page was loading; nothing was applied.
    Superseded,
    /// The request was aborted or timed out.
    Canceled,
    /// The request failed; existing results were kept.
    Failed {
        /// Underlying message.
        message: String,
    },
}

/// Point-in-time copy of the session state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct SessionSnapshot {
    /// Current status.
    pub status: SessionStatus,
    /// Query of the current search (trimmed).
    pub query: String,
    /// Accumulated movies across loaded pages.
    pub movies: Vec<Movie>,
    /// Last loaded page (1-based).
    pub page: u32,
    /// Total results reported by the first page.
    pub total_results: u32,
    /// Message to display, if any.
    pub error: Option<String>,
}

impl SessionSnapshot {
    /// Whether more results are available than are loaded.
    #[must_use]
    pub fn has_more(&self) -> bool {
        u32::try_from(self.movies.len()).is_ok_and(|loaded| loaded < self.total_results)
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(
            self.status,
            SessionStatus::Searching | SessionStatus::LoadingMore
        )
    }
}

/// Mutable state guarded by the session mutex.
///
/// `snapshot.status` only ever holds a settled status (`Idle` or `Error`);
/// the in-flight statuses are derived from the session's atomic markers so
/// that a dropped call cannot leave them behind.
#[derive(Debug)]
struct SessionState {
    snapshot: SessionSnapshot,
    /// Incremented by every fresh search.
    generation: u64,
}

/// Search session over a movie API.
///
/// All methods take `&self` so concurrent calls (e.g. a load-more racing a
/// new search) are possible; the session keeps them consistent. Dropping a
/// `search` or `load_more` future mid-flight leaves the session usable.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SearchSession<A> {
    api: A,
    state: Mutex<SessionState>,
    /// Held for the whole of a `load_more` call.
    load_more_guard: AtomicBool,
    /// Set while a page request is outstanding.
    page_in_flight: AtomicBool,
    /// Generation of the outstanding fresh search, 0 when none.
    search_in_flight: AtomicU64,
}

/// Clears an atomic flag when dropped.
struct FlagRelease<'a>(&'a AtomicBool);

impl Drop for FlagRelease<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Clears the in-flight search marker when dropped, unless a newer search owns it.
struct SearchMarker<'a> {
    marker: &'a AtomicU64,
    generation: u64,
}

impl Drop for SearchMarker<'_> {
    fn drop(&mut self) {
        // A newer search may already own the marker.
        let _ = self.marker.compare_exchange(
            self.generation,
            0,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

impl<A: LocalMovieApi> SearchSession<A> {
    /// Creates an idle session with no results.
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Mutex::new(SessionState {
                snapshot: SessionSnapshot {
                    status: SessionStatus::Idle,
                    query: String::new(),
                    movies: Vec::new(),
                    page: 1,
                    total_results: 0,
                    error: None,
                },
                generation: 0,
            }),
            load_more_guard: AtomicBool::new(false),
            page_in_flight: AtomicBool::new(false),
            search_in_flight: AtomicU64::new(0),
        }
    }

    /// The underlying API.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Status including requests still in flight.
    fn status(&self, settled: SessionStatus) -> SessionStatus {
        if self.search_in_flight.load(Ordering::Acquire) != 0 {
            SessionStatus::Searching
        } else if self.page_in_flight.load(Ordering::Acquire) {
            SessionStatus::LoadingMore
        } else {
            settled
        }
    }

    /// Returns a copy of the current state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            status: self.status(state.snapshot.status),
            ..state.snapshot.clone()
        }
    }

    /// Whether a load-more call would currently issue a request.
    pub async fn has_more(&self) -> bool {
        let state = self.state.lock().await;
        let status = self.status(state.snapshot.status);
        !matches!(
            status,
            SessionStatus::Searching | SessionStatus::LoadingMore
        ) && state.snapshot.has_more()
    }

    /// Starts a fresh search for `query`.
    ///
    /// Resets the accumulated results and page counter, then replaces them
    /// with the first page once it arrives, unless a newer search started
    /// in the meantime.
    #[instrument(skip_all, fields(query = %query.trim()))]
    pub async fn search(&self, query: &str) -> SearchUpdate {
        let query = query.trim();
        if query.is_empty() {
            return SearchUpdate::Ignored;
        }

        let in_flight = {
            let mut state = self.state.lock().await;
            state.generation = state.generation.wrapping_add(1);
            let generation = state.generation;
            self.search_in_flight.store(generation, Ordering::Release);
            let snapshot = &mut state.snapshot;
            snapshot.status = SessionStatus::Idle;
            snapshot.query = String::from(query);
            snapshot.movies.clear();
            snapshot.page = 1;
            snapshot.total_results = 0;
            snapshot.error = None;
            SearchMarker {
                marker: &self.search_in_flight,
                generation,
            }
        };

        let response = self.api.search(&SearchParams::new(query)).await;
        let invalid_api_key = response.is_invalid_api_key();

        let mut state = self.state.lock().await;
        if state.generation != in_flight.generation {
            tracing::debug!("discarding result of superseded search");
            return SearchUpdate::Superseded;
        }

        let snapshot = &mut state.snapshot;
        let update = match response.into_outcome() {
            SearchOutcome::Found {
                movies,
                total_results,
            } => {
                let count = movies.len();
                snapshot.movies = movies;
                snapshot.total_results = total_results;
                tracing::debug!(count, total_results, "search applied");
                SearchUpdate::Applied {
                    count,
                    total_results,
                }
            }
            SearchOutcome::Canceled => SearchUpdate::Canceled,
            SearchOutcome::Failed(message) => {
                snapshot.status = SessionStatus::Error;
                snapshot.error = Some(message.clone());
                if invalid_api_key {
                    tracing::warn!(
                        "OMDb rejected the API key; check that the key is activated"
                    );
                }
                SearchUpdate::Failed {
                    message,
                    invalid_api_key,
                }
            }
        };
        drop(in_flight);
        update
    }

    /// Loads the next page of the current search and appends it.
    ///
    /// At most one load-more runs at a time; concurrent calls return
    /// [`LoadMoreUpdate::Skipped`] without touching the network.
    #[instrument(skip_all)]
    pub async fn load_more(&self) -> LoadMoreUpdate {
        if self
            .load_more_guard
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return LoadMoreUpdate::Skipped(LoadMoreSkip::InProgress);
        }
        let _release = FlagRelease(&self.load_more_guard);

        let (params, generation, in_flight) = {
            let state = self.state.lock().await;
            if self.search_in_flight.load(Ordering::Acquire) != 0 {
                return LoadMoreUpdate::Skipped(LoadMoreSkip::Searching);
            }
            let snapshot = &state.snapshot;
            if !snapshot.has_more() {
                return LoadMoreUpdate::Skipped(LoadMoreSkip::Exhausted);
            }
            self.page_in_flight.store(true, Ordering::Release);
            let params = SearchParams::new(snapshot.query.clone())
                .page(snapshot.page.saturating_add(1))
                .load_more();
            (params, state.generation, FlagRelease(&self.page_in_flight))
        };

        let response = self.api.search(&params).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(page = params.page, "discarding page of superseded search");
            return LoadMoreUpdate::Superseded;
        }

        let snapshot = &mut state.snapshot;
        let update = match response.into_outcome() {
            SearchOutcome::Found { movies, .. } => {
                let added = movies.len();
                snapshot.movies.extend(movies);
                snapshot.page = params.page;
                snapshot.status = SessionStatus::Idle;
                snapshot.error = None;
                tracing::debug!(added, page = params.page, "page appended");
                LoadMoreUpdate::Appended {
                    added,
                    page: params.page,
                }
            }
            SearchOutcome::Canceled => LoadMoreUpdate::Canceled,
            SearchOutcome::Failed(message) => {
                tracing::error!(error = %message, "Error loading more movies");
                snapshot.status = SessionStatus::Error;
                snapshot.error = Some(String::from(LOAD_MORE_ERROR));
                LoadMoreUpdate::Failed { message }
            }
        };
        drop(in_flight);
        update
    }
}
