//! Per-kind in-flight request tracking.
//!
//! Each [`RequestKind`] owns one slot. Starting a request replaces the
//! slot and signals the previous occupant to abort. A [`RequestHandle`]
//! releases its slot when dropped, whether the request completed or its
//! future was dropped mid-flight, and never clears a newer occupant.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

/// Kind of request, used to decide which earlier request a new one supersedes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// First page of a fresh search.
    Search,
    /// Subsequent page of the current search.
    LoadMore,
    /// Detail lookup for a single movie.
    Detail,
}

impl RequestKind {
    /// Short label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::LoadMore => "load_more",
            Self::Detail => "detail",
        }
    }
}

/// The request currently occupying a slot.
#[derive(Debug)]
struct Occupant {
    id: u64,
    abort: oneshot::Sender<()>,
}

/// Handle held by a running request. Dropping it releases the slot.
#[derive(Debug)]
pub(crate) struct RequestHandle<'a> {
    owner: &'a InFlightRequests,
    kind: RequestKind,
    id: u64,
    /// Resolves when the request must abort.
    pub(crate) aborted: oneshot::Receiver<()>,
}

impl Drop for RequestHandle<'_> {
    fn drop(&mut self) {
        let mut slots = self.owner.slots();
        if slots.get(&self.kind).is_some_and(|o| o.id == self.id) {
            slots.remove(&self.kind);
        }
    }
}

/// In-flight request slots owned by one client.
///
/// The slot map is only locked for map operations, never across an await.
#[derive(Debug, Default)]
pub(crate) struct InFlightRequests {
    next_id: AtomicU64,
    slots: Mutex<HashMap<RequestKind, Occupant>>,
}

impl InFlightRequests {
    fn slots(&self) -> MutexGuard<'_, HashMap<RequestKind, Occupant>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the slot for `kind`, aborting whatever occupied it.
    pub(crate) fn begin(&self, kind: RequestKind) -> RequestHandle<'_> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (abort, aborted) = oneshot::channel();

        let previous = self.slots().insert(kind, Occupant { id, abort });
        if let Some(previous) = previous {
            signal_abort(kind, previous);
        }

        RequestHandle {
            owner: self,
            kind,
            id,
            aborted,
        }
    }

    /// Aborts the request occupying `kind`. Returns `false` if the slot was empty.
    pub(crate) fn cancel(&self, kind: RequestKind) -> bool {
        let Some(occupant) = self.slots().remove(&kind) else {
            return false;
        };
        signal_abort(kind, occupant);
        true
    }

    /// Whether a request of `kind` is running.
    pub(crate) fn is_active(&self, kind: RequestKind) -> bool {
        self.slots().contains_key(&kind)
    }
}

fn signal_abort(kind: RequestKind, occupant: Occupant) {
    if occupant.abort.send(()).is_err() {
        tracing::trace!(kind = kind.as_str(), "previous request already gone");
    } else {
        tracing::debug!(
            kind = kind.as_str(),
            request_id = occupant.id,
            "aborting in-flight request"
        );
    }
}
