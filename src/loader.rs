//! Background page fetching.
//!
//! Each [`PageRequest`] runs as its own task on the tokio runtime and reports
//! back to the UI thread over an unbounded channel.  The session only ever
//! has one request in flight per generation, so the channel stays short.
//!
//! ## For contributors
//!
//! Tasks never touch the session: they hand the raw result back in a
//! [`LoadMsg`] and the main loop applies it, so every state transition
//! happens on one thread.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::session::{PageRequest, Token};
use crate::source::{FetchError, Item, PaginatedFetcher};

/// A finished fetch, tagged with the token of the request that produced it.
#[derive(Debug)]
pub struct LoadMsg {
    pub token: Token,
    pub result: Result<Vec<Item>, FetchError>,
}

/// Spawns fetch tasks for a [`PaginatedFetcher`].
pub struct Loader<F> {
    fetcher: Arc<F>,
    runtime: Handle,
    tx: mpsc::UnboundedSender<LoadMsg>,
}

impl<F: PaginatedFetcher + 'static> Loader<F> {
    /// Create a loader spawning onto `runtime`.
    ///
    /// Returns the receiver that the main loop should drain on every tick.
    pub fn new(fetcher: F, runtime: Handle) -> (Self, mpsc::UnboundedReceiver<LoadMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let loader = Self {
            fetcher: Arc::new(fetcher),
            runtime,
            tx,
        };
        (loader, rx)
    }

    /// Start fetching `request` in the background.
    pub fn dispatch(&self, request: PageRequest) {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            let PageRequest {
                token,
                filter,
                offset,
            } = request;
            let result = fetcher.fetch_page(&filter, offset).await;
            // If the receiver is gone the UI has exited; drop the result.
            let _ = tx.send(LoadMsg { token, result });
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
