//! Item shapes returned by the catalogue endpoints.
//!
//! A batch is always homogeneous: which variant of [`Item`] it holds is
//! decided by the session's [`ListKind`](super::ListKind), never by
//! inspecting the JSON.
//!
//! ## For contributors
//!
//! The server is not perfectly consistent about field names (the user
//! serializer speaks camelCase, the search routes snake_case), so the structs
//! below accept both where the server has been seen to send both.

use serde::{Deserialize, Deserializer};

/// One entry of a paged list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// An album on an artist's page.
    Album(Album),
    /// A rating card, pre-rendered by the server.
    Rating(RatingMarkup),
    /// An album search hit.
    SearchAlbum(SearchAlbum),
    /// An artist search hit.
    Artist(Artist),
    /// A user search hit.
    User(User),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Four-digit year sliced from the release date; some servers send it
    /// as a number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub release_year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub artist: String,
    pub artist_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub release_year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
}

/// Opaque HTML for one rating card.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RatingMarkup(pub String);

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
