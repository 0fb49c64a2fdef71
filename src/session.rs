//! The incremental loading state machine.
//!
//! ```text
//!            request_next()            non-empty page
//!   Idle ─────────────────► Loading ─────────────────► Idle (cursor += page size)
//!    ▲                        │  │
//!    │        failure         │  │ empty page
//!    └────────────────────────┘  └──────────────────► Exhausted
//!
//!   reset(filter) from any state ──► Idle, cursor = 0, container cleared
//! ```
//!
//! `Loading` is the only concurrency guard: a near-bottom signal while a
//! request is in flight is a no-op.  Every request carries a [`Token`]
//! stamped with the session generation; [`reset`](LoadSession::reset)
//! bumps the generation so a response from a superseded query is dropped
//! instead of landing in the cleared container.

use crate::render::{render, RenderTarget};
use crate::source::{FetchError, Filter, Item};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Ready to request the next page.
    Idle,
    /// A request is in flight.
    Loading,
    /// The server returned an empty page; nothing more until a reset.
    Exhausted,
}

/// Identifies the session generation a request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    generation: u64,
}

/// A fetch the session has decided to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub token: Token,
    pub filter: Filter,
    pub offset: u32,
}

/// What applying a response did.
#[derive(Debug)]
pub enum Outcome {
    /// This many fragments were appended; the session is idle again.
    Appended(usize),
    /// Empty page: the list is complete.
    Exhausted,
    /// The fetch failed; the session is idle so a later scroll can retry.
    Failed(FetchError),
    /// The response belonged to a superseded query and was dropped.
    Stale,
}

/// Paging state of one list.
#[derive(Debug)]
pub struct LoadSession {
    filter: Filter,
    cursor: u32,
    status: Status,
    generation: u64,
}

impl LoadSession {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            cursor: 0,
            status: Status::Idle,
            generation: 0,
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether `token` was issued by the current generation.
    pub fn is_current(&self, token: Token) -> bool {
        token.generation == self.generation
    }

    /// Handle a near-bottom signal.
    ///
    /// Returns the request to issue, or `None` while loading or exhausted.
    pub fn request_next(&mut self) -> Option<PageRequest> {
        if self.status != Status::Idle {
            return None;
        }
        self.status = Status::Loading;
        tracing::debug!(filter = %self.filter, offset = self.cursor, "requesting next page");
        Some(PageRequest {
            token: Token {
                generation: self.generation,
            },
            filter: self.filter.clone(),
            offset: self.cursor,
        })
    }

    /// Apply the result of the request identified by `token`, rendering a
    /// non-empty batch into `target`.
    pub fn apply<T: RenderTarget + ?Sized>(
        &mut self,
        token: Token,
        result: Result<Vec<Item>, FetchError>,
        target: &mut T,
    ) -> Outcome {
        if !self.is_current(token) || self.status != Status::Loading {
            tracing::debug!(
                stale_generation = token.generation,
                generation = self.generation,
                "discarding stale response"
            );
            return Outcome::Stale;
        }

        match result {
            Ok(items) if items.is_empty() => {
                self.status = Status::Exhausted;
                tracing::info!(filter = %self.filter, loaded = self.cursor, "list exhausted");
                Outcome::Exhausted
            }
            Ok(items) => {
                render(&items, target);
                self.cursor = self.cursor.saturating_add(self.filter.kind().page_size());
                self.status = Status::Idle;
                Outcome::Appended(items.len())
            }
            Err(err) => {
                tracing::warn!(filter = %self.filter, offset = self.cursor, "page fetch failed: {err}");
                self.status = Status::Idle;
                Outcome::Failed(err)
            }
        }
    }

    /// Restart paging for `filter`: cursor back to zero, container cleared,
    /// any in-flight response invalidated.
    pub fn reset<T: RenderTarget + ?Sized>(&mut self, filter: Filter, target: &mut T) {
        tracing::info!(from = %self.filter, to = %filter, "resetting session");
        self.generation = self.generation.wrapping_add(1);
        self.filter = filter;
        self.cursor = 0;
        self.status = Status::Idle;
        target.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
