//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Navigation keys count as
//! scroll events and may return a page request for the main loop to
//! dispatch.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_key_event`] that calls it.
//! 3. Update the help text in [`crate::ui`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;
use crate::session::PageRequest;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<PageRequest> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return None;
    }
    if app.is_editing() {
        return handle_form_key(app, key);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('/') => app.start_editing(),
        KeyCode::Tab => app.cycle_search_type(),
        KeyCode::Enter => app.show_selected_link(),
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next();
            return app.on_scroll();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_previous();
            return app.on_scroll();
        }
        KeyCode::PageDown => {
            app.page_down();
            return app.on_scroll();
        }
        KeyCode::PageUp => {
            app.page_up();
            return app.on_scroll();
        }
        KeyCode::Home | KeyCode::Char('g') => {
            app.select_first();
            return app.on_scroll();
        }
        KeyCode::End | KeyCode::Char('G') => {
            app.select_last();
            return app.on_scroll();
        }
        _ => {}
    }
    None
}

/// Keys while the search input has focus.
fn handle_form_key(app: &mut App, key: KeyEvent) -> Option<PageRequest> {
    match key.code {
        KeyCode::Enter => return app.submit_search(),
        KeyCode::Esc => app.stop_editing(),
        KeyCode::Tab => app.cycle_search_type(),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
    None
}
