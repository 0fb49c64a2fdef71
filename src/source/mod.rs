//! Paged list sources.
//!
//! This module defines the [`PaginatedFetcher`] trait, the [`Filter`] that
//! identifies *which* list is being paged, and the closed set of list kinds
//! the catalogue serves.  Concrete fetchers live in sub-modules (currently
//! only [`http`]).
//!
//! ## For contributors — adding a new list type
//!
//! 1. Add a [`Filter`] variant carrying the query parameters of the list.
//! 2. Add the matching [`ListKind`] so page size and scroll threshold are
//!    picked up by the session and the proximity check.
//! 3. Teach [`http::page_url`] and [`http::parse_batch`] the endpoint and the
//!    item shape, and give the new item type a [`Render`](crate::render::Render)
//!    impl.

mod http;
mod item;

pub use http::HttpFetcher;
pub use item::{Album, Artist, Item, RatingMarkup, SearchAlbum, User};

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

/// Why a page could not be loaded.
///
/// An empty page is *not* an error: it is the end-of-data sentinel and is
/// reported by the session as [`Outcome::Exhausted`](crate::session::Outcome).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// The body was not a JSON array of the expected item shape.
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Network(err.to_string()),
        }
    }
}

/// Result type selector of the search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchType {
    #[default]
    Album,
    Artist,
    User,
}

impl SearchType {
    /// Value sent as the `type` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Album => "album",
            SearchType::Artist => "artist",
            SearchType::User => "user",
        }
    }

    /// The next selector in form order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            SearchType::Album => SearchType::Artist,
            SearchType::Artist => SearchType::User,
            SearchType::User => SearchType::Album,
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "album" => Ok(SearchType::Album),
            "artist" => Ok(SearchType::Artist),
            "user" => Ok(SearchType::User),
            other => Err(format!("unknown search type '{other}' (expected album, artist, or user)")),
        }
    }
}

/// Which ratings a feed shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingScope {
    /// The signed-in user's ratings plus those of everyone they follow.
    Homepage,
    /// One user's profile feed.
    User(String),
    /// Every rating left on one album.
    Album(String),
}

/// The query parameters identifying a paged list.
///
/// A filter is fixed for the lifetime of a session; a new search replaces it
/// wholesale through [`LoadSession::reset`](crate::session::LoadSession::reset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    ArtistAlbums { artist_id: String },
    Ratings(RatingScope),
    Search { query: String, kind: SearchType },
}

impl Filter {
    pub fn kind(&self) -> ListKind {
        match self {
            Filter::ArtistAlbums { .. } => ListKind::Albums,
            Filter::Ratings(_) => ListKind::Ratings,
            Filter::Search { kind, .. } => ListKind::Search(*kind),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::ArtistAlbums { artist_id } => write!(f, "albums of artist {artist_id}"),
            Filter::Ratings(RatingScope::Homepage) => f.write_str("home feed"),
            Filter::Ratings(RatingScope::User(name)) => write!(f, "ratings by {name}"),
            Filter::Ratings(RatingScope::Album(id)) => write!(f, "ratings of album {id}"),
            Filter::Search { query, kind } => write!(f, "{kind} search \"{query}\""),
        }
    }
}

/// The closed set of list types.  Each has its own page size, scroll
/// threshold and item shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Albums,
    Ratings,
    Search(SearchType),
}

impl ListKind {
    /// Items requested per fetch; the cursor advances by this much after
    /// every non-empty page.
    pub fn page_size(self) -> u32 {
        match self {
            ListKind::Albums | ListKind::Ratings => 10,
            ListKind::Search(_) => 20,
        }
    }

    /// Distance from the bottom, in pixels, at which more content is
    /// requested.  Search cards are larger and slower to load.
    pub fn threshold_px(self) -> u32 {
        match self {
            ListKind::Albums | ListKind::Ratings => 100,
            ListKind::Search(_) => 500,
        }
    }
}

/// Anything that can load one page of a list.
///
/// Fetchers only return data: interpreting it (advancing the cursor,
/// detecting exhaustion) is the job of the
/// [`LoadSession`](crate::session::LoadSession).  Fetches are spawned on the
/// async runtime, so implementations must be [`Send`] + [`Sync`].
///
/// ```ignore
/// pub struct MyFetcher { /* config fields */ }
///
/// #[async_trait]
/// impl PaginatedFetcher for MyFetcher {
///     async fn fetch_page(&self, filter: &Filter, offset: u32) -> Result<Vec<Item>, FetchError> {
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait PaginatedFetcher: Send + Sync {
    /// Fetch the page starting at `offset` for `filter`.
    async fn fetch_page(&self, filter: &Filter, offset: u32) -> Result<Vec<Item>, FetchError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_sizes_per_list_kind() {
        assert_eq!(ListKind::Albums.page_size(), 10);
        assert_eq!(ListKind::Ratings.page_size(), 10);
        assert_eq!(ListKind::Search(SearchType::User).page_size(), 20);
    }

    #[test]
    fn thresholds_per_list_kind() {
        assert_eq!(ListKind::Ratings.threshold_px(), 100);
        assert_eq!(ListKind::Search(SearchType::Artist).threshold_px(), 500);
    }

    #[test]
    fn filter_kind_follows_search_type() {
        let filter = Filter::Search {
            query: "Drake".into(),
            kind: SearchType::Artist,
        };
        assert_eq!(filter.kind(), ListKind::Search(SearchType::Artist));
    }

    #[test]
    fn search_type_parses_case_insensitively() {
        assert_eq!("Artist".parse::<SearchType>(), Ok(SearchType::Artist));
        assert!("playlist".parse::<SearchType>().is_err());
    }

    #[test]
    fn search_type_cycles_through_all_variants() {
        let start = SearchType::Album;
        assert_eq!(start.next(), SearchType::Artist);
        assert_eq!(start.next().next(), SearchType::User);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn parse_error_converts_from_serde() {
        let err: FetchError = serde_json::from_str::<Vec<String>>("{").unwrap_err().into();
        assert!(matches!(err, FetchError::Parse(_)));
        assert!(err.to_string().starts_with("malformed response"));
    }
}
