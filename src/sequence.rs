//! Request ordering and cancellation.
//!
//! `RequestSequencer` makes the last *issued* session request win.
//! `CancelScope` lets a page abort everything it started when it unmounts.

use std::cell::Cell;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{AbortHandle, Abortable};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: Cell<u64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        Ticket(next)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.get() == ticket.0
    }

    /// Makes every outstanding ticket stale.
    pub fn invalidate(&self) {
        self.begin();
    }
}

/// Abort handles for the futures a page has in flight.
///
/// Cheap to clone; clones share the same scope. `Send + Sync` so it can be
/// moved into cleanup callbacks.
#[derive(Debug, Clone, Default)]
pub struct CancelScope {
    handles: Arc<Mutex<HashMap<u64, AbortHandle>>>,
    next_id: Arc<AtomicU64>,
    cancelled: Arc<AtomicBool>,
}

/// Unregisters one handle when its future settles or is dropped.
struct Registered<'a> {
    scope: &'a CancelScope,
    id: u64,
}

impl Drop for Registered<'_> {
    fn drop(&mut self) {
        if let Ok(mut handles) = self.scope.handles.lock() {
            handles.remove(&self.id);
        }
    }
}

impl CancelScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `fut`, resolving to `ApiError::Cancelled` if the scope is
    /// cancelled first (or already was).
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        if self.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        let (handle, registration) = AbortHandle::new_pair();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut handles) = self.handles.lock() {
            handles.insert(id, handle);
        }
        let _registered = Registered { scope: self, id };

        match Abortable::new(fut, registration).await {
            Ok(result) => result,
            Err(_aborted) => Err(ApiError::Cancelled),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Ok(mut handles) = self.handles.lock() {
            for (_, handle) in handles.drain() {
                handle.abort();
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Number of futures currently running under this scope.
    pub fn in_flight(&self) -> usize {
        self.handles.lock().map(|h| h.len()).unwrap_or(0)
    }
}
