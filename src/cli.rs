//! Command-line configuration.
//!
//! Each subcommand opens one page of the catalogue.  Global options
//! configure the HTTP fetcher and logging.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::{Page, SearchForm};
use crate::source::{Filter, RatingScope, SearchType};

#[derive(Debug, Parser)]
#[command(name = "catalog-scroll")]
#[command(about = "Scroll through a music catalogue's albums, ratings, and search results")]
#[command(version)]
pub struct Cli {
    /// Root URL of the catalogue server
    #[arg(
        long,
        env = "CATALOG_BASE_URL",
        default_value = "http://localhost:5000",
        global = true
    )]
    pub base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10, global = true)]
    pub timeout: u64,

    /// Write logs to this file (filtered by RUST_LOG, default "info")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse an artist's albums
    Albums {
        /// Artist id
        artist_id: String,
    },

    /// Browse a rating feed (the home feed unless --user or --album is given)
    Feed {
        /// Show one user's ratings
        #[arg(long, conflicts_with = "album")]
        user: Option<String>,

        /// Show the ratings of one album
        #[arg(long)]
        album: Option<String>,
    },

    /// Search albums, artists, or users
    Search {
        /// Query to submit on startup
        #[arg(short, long)]
        query: Option<String>,

        /// Result type: album, artist, or user
        #[arg(short = 't', long = "type", default_value = "album")]
        kind: SearchType,
    },
}

impl Cli {
    /// The page selected on the command line; the home feed by default.
    pub fn page(&self) -> Page {
        match &self.command {
            None => Page::List(Filter::Ratings(RatingScope::Homepage)),
            Some(Command::Albums { artist_id }) => Page::List(Filter::ArtistAlbums {
                artist_id: artist_id.clone(),
            }),
            Some(Command::Feed { user, album }) => {
                let scope = match (user, album) {
                    (Some(name), _) => RatingScope::User(name.clone()),
                    (None, Some(id)) => RatingScope::Album(id.clone()),
                    (None, None) => RatingScope::Homepage,
                };
                Page::List(Filter::Ratings(scope))
            }
            Some(Command::Search { query, kind }) => Page::Search(SearchForm {
                input: query.clone().unwrap_or_default(),
                kind: *kind,
                editing: query.is_none(),
            }),
        }
    }
}
