//! HTTP fetcher for the catalogue's JSON list endpoints.
//!
//! URL construction ([`page_url`]) and body decoding ([`parse_batch`]) are
//! pure functions so that tests can exercise them without hitting the
//! network; [`HttpFetcher`] only glues them to a [`reqwest::Client`].
//!
//! | List            | Endpoint                                        |
//! |-----------------|-------------------------------------------------|
//! | artist albums   | `/artists/{id}/albums?offset=N`                 |
//! | rating feed     | `/ratings/load?offset=N[&homepage=true\|&user=NAME\|&albumId=ID]` |
//! | search results  | `/search/results?query=Q&type=T&offset=N`       |
//!
//! Every endpoint answers with a JSON array; an empty array means the list
//! is exhausted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::{FetchError, Filter, Item, ListKind, PaginatedFetcher, RatingScope, SearchType};

/// Fetches pages over HTTP from a catalogue server.
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpFetcher {
    /// Create a fetcher rooted at `base_url` (e.g. `http://localhost:5000`).
    ///
    /// A path prefix on the base URL is kept, so a site mounted under
    /// `/catalog` works too.
    pub fn new(base_url: Url, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl PaginatedFetcher for HttpFetcher {
    async fn fetch_page(&self, filter: &Filter, offset: u32) -> Result<Vec<Item>, FetchError> {
        let url = page_url(&self.base_url, filter, offset);
        tracing::debug!(%url, "requesting page");

        // A non-2xx reply surfaces as `FetchError::Status`.
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        parse_batch(filter.kind(), &body)
    }
}

/// Build the request URL for the page of `filter` starting at `offset`.
pub fn page_url(base: &Url, filter: &Filter, offset: u32) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);

    let segments: Vec<&str> = match filter {
        Filter::ArtistAlbums { artist_id } => vec!["artists", artist_id.as_str(), "albums"],
        Filter::Ratings(_) => vec!["ratings", "load"],
        Filter::Search { .. } => vec!["search", "results"],
    };
    // Cannot-be-a-base URLs are rejected at startup; nothing to extend here.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }

    {
        let mut query = url.query_pairs_mut();
        match filter {
            Filter::ArtistAlbums { .. } => {
                query.append_pair("offset", &offset.to_string());
            }
            Filter::Ratings(scope) => {
                query.append_pair("offset", &offset.to_string());
                match scope {
                    RatingScope::Homepage => query.append_pair("homepage", "true"),
                    RatingScope::User(name) => query.append_pair("user", name),
                    RatingScope::Album(id) => query.append_pair("albumId", id),
                };
            }
            Filter::Search { query: text, kind } => {
                query
                    .append_pair("query", text)
                    .append_pair("type", kind.as_str())
                    .append_pair("offset", &offset.to_string());
            }
        }
    }

    url
}

/// Decode a response body into the item shape of `kind`.
pub fn parse_batch(kind: ListKind, body: &str) -> Result<Vec<Item>, FetchError> {
    match kind {
        ListKind::Albums => decode(body, Item::Album),
        ListKind::Ratings => decode(body, Item::Rating),
        ListKind::Search(SearchType::Album) => decode(body, Item::SearchAlbum),
        ListKind::Search(SearchType::Artist) => decode(body, Item::Artist),
        ListKind::Search(SearchType::User) => decode(body, Item::User),
    }
}

fn decode<T, F>(body: &str, wrap: F) -> Result<Vec<Item>, FetchError>
where
    T: DeserializeOwned,
    F: Fn(T) -> Item,
{
    let raw: Vec<T> = serde_json::from_str(body)?;
    Ok(raw.into_iter().map(wrap).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RatingMarkup;

    fn base() -> Url {
        Url::parse("http://localhost:5000").unwrap()
    }

    #[test]
    fn artist_albums_url() {
        let filter = Filter::ArtistAlbums {
            artist_id: "7".into(),
        };
        let url = page_url(&base(), &filter, 0);
        assert_eq!(url.as_str(), "http://localhost:5000/artists/7/albums?offset=0");
    }

    #[test]
    fn homepage_and_user_feed_urls() {
        let home = page_url(&base(), &Filter::Ratings(RatingScope::Homepage), 20);
        assert_eq!(home.as_str(), "http://localhost:5000/ratings/load?offset=20&homepage=true");

        let user = page_url(&base(), &Filter::Ratings(RatingScope::User("sam".into())), 10);
        assert_eq!(user.as_str(), "http://localhost:5000/ratings/load?offset=10&user=sam");

        let album = page_url(&base(), &Filter::Ratings(RatingScope::Album("x1".into())), 0);
        assert_eq!(album.as_str(), "http://localhost:5000/ratings/load?offset=0&albumId=x1");
    }

    #[test]
    fn search_url_puts_query_type_then_offset() {
        let filter = Filter::Search {
            query: "Drake".into(),
            kind: SearchType::Artist,
        };
        let url = page_url(&base(), &filter, 0);
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/search/results?query=Drake&type=artist&offset=0"
        );
    }

    #[test]
    fn search_query_is_encoded() {
        let filter = Filter::Search {
            query: "AC/DC & friends".into(),
            kind: SearchType::Album,
        };
        let url = page_url(&base(), &filter, 40);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("query".into(), "AC/DC & friends".into()));
        assert_eq!(pairs[2], ("offset".into(), "40".into()));
    }

    #[test]
    fn artist_id_is_a_single_path_segment() {
        let filter = Filter::ArtistAlbums {
            artist_id: "a/b".into(),
        };
        let url = page_url(&base(), &filter, 0);
        assert_eq!(url.path(), "/artists/a%2Fb/albums");
    }

    #[test]
    fn base_path_prefix_and_query_are_handled() {
        let base = Url::parse("http://example.com/catalog/?stale=1").unwrap();
        let url = page_url(&base, &Filter::Ratings(RatingScope::Homepage), 0);
        assert_eq!(
            url.as_str(),
            "http://example.com/catalog/ratings/load?offset=0&homepage=true"
        );
    }

    #[test]
    fn parse_album_batch_keeps_response_order() {
        let body = r#"[
            {"id":"1","name":"First","image_url":"a.png","release_year":"2001"},
            {"id":"2","name":"Second","image_url":"b.png","release_year":"2002"}
        ]"#;
        let items = parse_batch(ListKind::Albums, body).unwrap();

        assert_eq!(items.len(), 2);
        assert!(matches!(&items[0], Item::Album(a) if a.id == "1"));
        assert!(matches!(&items[1], Item::Album(a) if a.name == "Second"));
    }

    #[test]
    fn parse_rating_batch_wraps_markup() {
        let items = parse_batch(ListKind::Ratings, r#"["<p>one</p>","<p>two</p>"]"#).unwrap();
        assert_eq!(items[1], Item::Rating(RatingMarkup("<p>two</p>".into())));
    }

    #[test]
    fn parse_search_batches_by_type() {
        let artists = parse_batch(
            ListKind::Search(SearchType::Artist),
            r#"[{"id":"3TVX","name":"Drake","image_url":"d.png"}]"#,
        )
        .unwrap();
        assert!(matches!(&artists[0], Item::Artist(a) if a.name == "Drake"));

        let users = parse_batch(
            ListKind::Search(SearchType::User),
            r#"[{"username":"sam","first_name":"Sam","last_name":"Lee","image_url":null}]"#,
        )
        .unwrap();
        assert!(matches!(&users[0], Item::User(u) if u.username == "sam"));

        let albums = parse_batch(
            ListKind::Search(SearchType::Album),
            r#"[{"id":"1","name":"Views","image_url":"v.png","artist":"Drake","artist_id":"3TVX","release_year":"2016"}]"#,
        )
        .unwrap();
        assert!(matches!(&albums[0], Item::SearchAlbum(a) if a.artist_id == "3TVX"));
    }

    #[test]
    fn empty_array_is_an_empty_batch() {
        assert!(parse_batch(ListKind::Albums, "[]").unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_batch(ListKind::Albums, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn wrong_shape_is_a_parse_error() {
        assert!(matches!(
            parse_batch(ListKind::Albums, r#"{"albums":[]}"#),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            parse_batch(ListKind::Search(SearchType::User), r#"[{"id":"1","name":"x"}]"#),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn fetcher_keeps_base_url() {
        let fetcher = HttpFetcher::new(base(), Duration::from_secs(5)).unwrap();
        assert_eq!(fetcher.base_url().as_str(), "http://localhost:5000/");
    }

    // -- fetch_page against a local socket -----------------------------------

    /// Serve one canned HTTP response on an ephemeral port and return the base
    /// URL pointing at it.
    async fn serve_once(response: &'static str) -> Url {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn albums_filter() -> Filter {
        Filter::ArtistAlbums {
            artist_id: "7".into(),
        }
    }

    #[tokio::test]
    async fn server_error_is_a_status_error() {
        let base = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let fetcher = HttpFetcher::new(base, Duration::from_secs(5)).unwrap();

        let err = fetcher.fetch_page(&albums_filter(), 0).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(500)), "got {err:?}");
    }

    #[tokio::test]
    async fn non_json_body_is_a_parse_error() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 17\r\nconnection: close\r\n\r\n<html>oops</html>",
        )
        .await;
        let fetcher = HttpFetcher::new(base, Duration::from_secs(5)).unwrap();

        let err = fetcher.fetch_page(&albums_filter(), 0).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn json_body_is_decoded() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n[]",
        )
        .await;
        let fetcher = HttpFetcher::new(base, Duration::from_secs(5)).unwrap();

        let batch = fetcher.fetch_page(&albums_filter(), 0).await.unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn refused_connection_is_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{addr}")).unwrap();
        let fetcher = HttpFetcher::new(base, Duration::from_secs(5)).unwrap();

        let err = fetcher.fetch_page(&albums_filter(), 0).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)), "got {err:?}");
        assert!(err.to_string().starts_with("network error"));
    }
}
