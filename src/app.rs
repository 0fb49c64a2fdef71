use ratatui::widgets::ListState;

use crate::loader::LoadMsg;
use crate::proximity::{is_near_bottom, ROW_HEIGHT_PX};
use crate::render::Fragment;
use crate::session::{LoadSession, Outcome, PageRequest};
use crate::source::{Filter, SearchType};

/// Which page this run shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// A list whose filter is fixed for the whole run.
    List(Filter),
    /// The search page; its filter comes from the submitted form.
    Search(SearchForm),
}

/// State of the search form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchForm {
    /// Query text being typed.
    pub input: String,
    /// Selected result type.
    pub kind: SearchType,
    /// Whether keystrokes go to the query input.
    pub editing: bool,
}

pub struct App {
    /// `None` on the search page until the first query is submitted.
    session: Option<LoadSession>,
    /// Rendered results, in load order.
    pub fragments: Vec<Fragment>,
    /// Present only on the search page.
    pub search: Option<SearchForm>,
    /// List selection and scroll offset.
    pub list_state: ListState,
    /// Inner height of the list area, updated on every draw.
    pub viewport_rows: u16,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last load outcome, shown in the status bar.
    pub status: String,
    /// A page landed before the viewport was measured; the fill check runs
    /// after the next draw.
    fill_pending: bool,
}

impl App {
    pub fn new(page: Page) -> Self {
        let (session, search) = match page {
            Page::List(filter) => (Some(LoadSession::new(filter)), None),
            Page::Search(form) => (None, Some(form)),
        };
        Self {
            session,
            fragments: Vec::new(),
            search,
            list_state: ListState::default(),
            viewport_rows: 0,
            quit: false,
            status: "Starting…".into(),
            fill_pending: false,
        }
    }

    pub fn session(&self) -> Option<&LoadSession> {
        self.session.as_ref()
    }

    /// The initial load: first page of a list, or the search given on the
    /// command line.
    pub fn start(&mut self) -> Option<PageRequest> {
        if self.session.is_some() {
            return self.request_more();
        }
        match &self.search {
            Some(form) if !form.input.trim().is_empty() => self.submit_search(),
            Some(_) => {
                self.status = "Type / to search".into();
                None
            }
            None => None,
        }
    }

    /// Ask the session for the next page, regardless of scroll position.
    pub fn request_more(&mut self) -> Option<PageRequest> {
        let request = self.session.as_mut()?.request_next()?;
        self.status = "Loading…".into();
        Some(request)
    }

    /// A scroll event: request more if the viewport is near the bottom.
    pub fn on_scroll(&mut self) -> Option<PageRequest> {
        if self.near_bottom() {
            self.request_more()
        } else {
            None
        }
    }

    /// Run the current layout through the proximity check.
    pub fn near_bottom(&self) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        is_near_bottom(
            self.content_rows() * ROW_HEIGHT_PX,
            u32::from(self.viewport_rows) * ROW_HEIGHT_PX,
            self.scroll_rows() * ROW_HEIGHT_PX,
            session.filter().kind().threshold_px(),
        )
    }

    fn content_rows(&self) -> u32 {
        rows(&self.fragments)
    }

    /// Rows scrolled past the top of the viewport.
    ///
    /// The offset kept in `list_state` is only updated on draw, so a
    /// selection moved since then is accounted for here.
    fn scroll_rows(&self) -> u32 {
        let len = self.fragments.len();
        let offset = self.list_state.offset().min(len);
        let above = rows(&self.fragments[..offset]);
        let through_selected = self
            .list_state
            .selected()
            .map(|i| rows(&self.fragments[..(i + 1).min(len)]))
            .unwrap_or(0);
        above.max(through_selected.saturating_sub(u32::from(self.viewport_rows)))
    }

    /// Apply a finished fetch.
    ///
    /// After a non-empty page the proximity check runs again so a list
    /// shorter than the viewport keeps filling; after a failure it does
    /// not, and only the next user scroll retries.
    pub fn handle_load(&mut self, msg: LoadMsg) -> Option<PageRequest> {
        let session = self.session.as_mut()?;
        match session.apply(msg.token, msg.result, &mut self.fragments) {
            Outcome::Appended(count) => {
                self.status = format!("Loaded {count} items");
                if self.viewport_rows == 0 {
                    self.fill_pending = true;
                    return None;
                }
                self.on_scroll()
            }
            Outcome::Exhausted => {
                self.fill_pending = false;
                self.status = "End of results".into();
                None
            }
            Outcome::Failed(err) => {
                self.fill_pending = false;
                self.status = format!("Error: {err}");
                None
            }
            Outcome::Stale => None,
        }
    }

    /// Run a fill check deferred by [`handle_load`](Self::handle_load) once
    /// a draw has measured the viewport.
    pub fn after_draw(&mut self) -> Option<PageRequest> {
        if !self.fill_pending || self.viewport_rows == 0 {
            return None;
        }
        self.fill_pending = false;
        self.on_scroll()
    }

    // -- search form ---------------------------------------------------------

    /// Submit the search form, restarting paging with the new query.
    pub fn submit_search(&mut self) -> Option<PageRequest> {
        let form = self.search.as_mut()?;
        let query = form.input.trim().to_string();
        if query.is_empty() {
            self.status = "Enter a search term".into();
            return None;
        }
        form.editing = false;
        let filter = Filter::Search {
            query,
            kind: form.kind,
        };

        match &mut self.session {
            Some(session) => session.reset(filter, &mut self.fragments),
            None => {
                self.fragments.clear();
                self.session = Some(LoadSession::new(filter));
            }
        }
        self.list_state = ListState::default();
        self.fill_pending = false;
        self.request_more()
    }

    pub fn cycle_search_type(&mut self) {
        if let Some(form) = &mut self.search {
            form.kind = form.kind.next();
        }
    }

    pub fn start_editing(&mut self) {
        if let Some(form) = &mut self.search {
            form.editing = true;
        }
    }

    pub fn stop_editing(&mut self) {
        if let Some(form) = &mut self.search {
            form.editing = false;
        }
    }

    pub fn is_editing(&self) -> bool {
        self.search.as_ref().is_some_and(|form| form.editing)
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(form) = &mut self.search {
            form.input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(form) = &mut self.search {
            form.input.pop();
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.fragments.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.fragments.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.fragments.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Move the selection down by roughly one screen.
    pub fn page_down(&mut self) {
        if self.fragments.is_empty() {
            return;
        }
        let step = usize::from(self.viewport_rows / 3).max(1);
        let i = self.list_state.selected().map_or(0, |i| i + step);
        self.list_state.select(Some(i.min(self.fragments.len() - 1)));
    }

    pub fn page_up(&mut self) {
        if self.fragments.is_empty() {
            return;
        }
        let step = usize::from(self.viewport_rows / 3).max(1);
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(step));
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.fragments.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.fragments.is_empty() {
            self.list_state.select(Some(self.fragments.len() - 1));
        }
    }

    /// Link of the selected entry.
    pub fn selected_href(&self) -> Option<&str> {
        let i = self.list_state.selected()?;
        self.fragments.get(i)?.href.as_deref()
    }

    /// Put the selected entry's link in the status bar.
    pub fn show_selected_link(&mut self) {
        if let Some(href) = self.selected_href().map(str::to_owned) {
            self.status = format!("→ {href}");
        }
    }
}

fn rows(fragments: &[Fragment]) -> u32 {
    fragments.iter().map(Fragment::height).sum()
}
