//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a vertical split: an optional search bar (search page
//!   only), the scrollable results list, and a one-line status bar.
//! * Each fragment renders as its title line, an optional detail line, and a
//!   blank separator.  [`Fragment::height`] must stay in sync with this, as
//!   the proximity check measures content in rows.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, SearchForm};
use crate::render::Fragment;
use crate::session::Status;

/// Draw the complete UI for one frame.
///
/// Also records the list's inner height on `app` for the proximity check.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let search_height = if app.search.is_some() { 3 } else { 0 };
    let [search_area, list_area, status_area] = Layout::vertical([
        Constraint::Length(search_height),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    if let Some(form) = &app.search {
        draw_search_bar(form, frame, search_area);
    }
    draw_results(app, frame, list_area);
    draw_status_bar(app, frame, status_area);
}

/// Render the query input and result type selector.
fn draw_search_bar(form: &SearchForm, frame: &mut Frame, area: Rect) {
    let input_style = if form.editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if form.editing { "▏" } else { "" };

    let line = Line::from(vec![
        Span::styled(format!("{}{cursor}", form.input), input_style),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", form.kind),
            Style::default().fg(Color::Cyan),
        ),
    ]);
    let bar = Paragraph::new(line).block(
        Block::default()
            .title(" Search (/: edit  Tab: type  Enter: submit) ")
            .borders(Borders::ALL),
    );
    frame.render_widget(bar, area);
}

/// Render the scrollable results list.
fn draw_results(app: &mut App, frame: &mut Frame, area: Rect) {
    app.viewport_rows = area.height.saturating_sub(2);

    let list_items: Vec<ListItem> = app.fragments.iter().map(fragment_item).collect();

    let title = match app.session() {
        Some(session) => format!(" {} ", session.filter()),
        None => " Results ".to_string(),
    };
    let list = List::new(list_items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn fragment_item(fragment: &Fragment) -> ListItem<'_> {
    let mut title = vec![Span::styled(
        fragment.title.as_str(),
        Style::default().fg(Color::White),
    )];
    if let Some(href) = &fragment.href {
        title.push(Span::raw("  "));
        title.push(Span::styled(href.as_str(), Style::default().fg(Color::Cyan)));
    }

    let mut lines = vec![Line::from(title)];
    if let Some(detail) = &fragment.detail {
        let mut spans = vec![Span::styled(
            detail.as_str(),
            Style::default().fg(Color::DarkGray),
        )];
        if let Some(href) = &fragment.secondary_href {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(href.as_str(), Style::default().fg(Color::Cyan)));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::default());

    ListItem::new(lines)
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let state = match app.session().map(|s| s.status()) {
        Some(Status::Loading) => "●",
        Some(Status::Exhausted) => "■",
        Some(Status::Idle) | None => " ",
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {state} "), Style::default().fg(Color::Magenta)),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} items", app.fragments.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  PgUp/PgDn  Home/End: jump"),
    ]));
    frame.render_widget(status, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
