//! Item-to-fragment mapping and the results container contract.
//!
//! Every item type knows how to turn itself into a [`Fragment`] through the
//! [`Render`] trait; [`render`] appends a whole batch, in response order, to
//! any [`RenderTarget`].  Nothing here touches session state, so the
//! container can be swapped out (the app uses a plain `Vec<Fragment>`).

use scraper::{ElementRef, Html, Selector};

use crate::source::{Album, Artist, Item, RatingMarkup, SearchAlbum, User};

/// One display entry of a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Headline: album/artist name, user's full name, first line of a rating.
    pub title: String,
    /// Secondary line, if the item has one.
    pub detail: Option<String>,
    /// Where selecting the entry navigates to.
    pub href: Option<String>,
    /// A second link carried by the detail line (the artist of a search hit).
    pub secondary_href: Option<String>,
}

impl Fragment {
    /// Rows the fragment occupies in the list, separator included.
    pub fn height(&self) -> u32 {
        1 + u32::from(self.detail.is_some()) + 1
    }
}

/// The container receiving rendered fragments.
///
/// Append-only, except for [`clear`](RenderTarget::clear) on a session reset.
pub trait RenderTarget {
    fn append(&mut self, fragment: Fragment);
    fn clear(&mut self);
}

impl RenderTarget for Vec<Fragment> {
    fn append(&mut self, fragment: Fragment) {
        self.push(fragment);
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

/// Append one fragment per item, in order.
pub fn render<T: RenderTarget + ?Sized>(batch: &[Item], target: &mut T) {
    for item in batch {
        target.append(item.fragment());
    }
}

/// Maps an item to its display fragment.
pub trait Render {
    fn fragment(&self) -> Fragment;
}

impl Render for Item {
    fn fragment(&self) -> Fragment {
        match self {
            Item::Album(album) => album.fragment(),
            Item::Rating(rating) => rating.fragment(),
            Item::SearchAlbum(album) => album.fragment(),
            Item::Artist(artist) => artist.fragment(),
            Item::User(user) => user.fragment(),
        }
    }
}

impl Render for Album {
    fn fragment(&self) -> Fragment {
        Fragment {
            title: self.name.clone(),
            detail: self
                .release_year
                .as_ref()
                .map(|year| format!("released: {year}")),
            href: Some(format!("/albums/{}", self.id)),
            secondary_href: None,
        }
    }
}

impl Render for SearchAlbum {
    fn fragment(&self) -> Fragment {
        Fragment {
            title: self.name.clone(),
            detail: Some(format!("By: {}", self.artist)),
            href: Some(format!("/albums/{}", self.id)),
            secondary_href: Some(format!("/artists/{}", self.artist_id)),
        }
    }
}

impl Render for Artist {
    fn fragment(&self) -> Fragment {
        Fragment {
            title: self.name.clone(),
            detail: None,
            href: Some(format!("/artists/{}", self.id)),
            secondary_href: None,
        }
    }
}

impl Render for User {
    fn fragment(&self) -> Fragment {
        let title = match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        };
        Fragment {
            title,
            detail: Some(self.username.clone()),
            href: Some(format!("/users/{}", self.username)),
            secondary_href: None,
        }
    }
}

impl Render for RatingMarkup {
    fn fragment(&self) -> Fragment {
        let mut lines = markup_text_lines(&self.0).into_iter();
        let title = lines.next().unwrap_or_default();
        let rest: Vec<String> = lines.collect();
        Fragment {
            title,
            detail: (!rest.is_empty()).then(|| rest.join(" · ")),
            href: first_href(&self.0),
            secondary_href: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Markup flattening
// ---------------------------------------------------------------------------

/// Elements that start a new line of text.
const BLOCK_TAGS: &[&str] = &[
    "br", "div", "p", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "section", "article",
    "header", "footer", "tr",
];

/// Flatten server-rendered markup into its non-empty text lines.
fn markup_text_lines(markup: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(markup);
    let mut text = String::with_capacity(markup.len());
    collect_text(fragment.root_element(), &mut text);

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child) = ElementRef::wrap(child) {
            let block = BLOCK_TAGS.contains(&child.value().name());
            if block {
                out.push('\n');
            }
            collect_text(child, out);
            if block {
                out.push('\n');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

/// The target of the first link in `markup`.
fn first_href(markup: &str) -> Option<String> {
    let links = Selector::parse("a[href]").ok()?;
    let fragment = Html::parse_fragment(markup);
    let link = fragment.select(&links).next()?;
    link.value().attr("href").map(str::to_owned)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
