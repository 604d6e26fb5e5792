//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] calls.  Printable characters go to
//! the search box, so every other binding uses a non-printable key or Ctrl.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a match arm in [`handle_key_event`] that calls it.
//! 3. Update the hint in the status bar and the `after_help` text in `cli.rs`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.quit = true,
            KeyCode::Char('d') => app.remove_selected(),
            KeyCode::Char('u') => app.clear_search(),
            KeyCode::Char('r') => app.request_refresh(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.quit = true,
        KeyCode::Down => app.select_next(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        KeyCode::Delete => app.remove_selected(),
        KeyCode::F(5) => app.request_refresh(),
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(c) => app.push_search_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossterm::event::KeyEventState;

    use crate::persist::{MemoryStore, PersistedValue};
    use crate::source::sample_stories;
    use crate::store::Action;

    fn loaded_app() -> App {
        let mut app = App::new(PersistedValue::new(
            Arc::new(MemoryStore::new()),
            "search",
            String::new(),
        ));
        app.dispatch(Action::FetchSuccess(sample_stories()));
        app
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn typing_edits_search() {
        let mut app = loaded_app();
        for c in "Red".chars() {
            handle_key_event(&mut app, press(KeyCode::Char(c)));
        }
        assert_eq!(app.search_term(), "Red");

        handle_key_event(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.search_term(), "Re");

        handle_key_event(&mut app, ctrl('u'));
        assert_eq!(app.search_term(), "");
    }

    #[test]
    fn q_is_text_not_quit() {
        let mut app = loaded_app();
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(!app.quit);
        assert_eq!(app.search_term(), "q");
    }

    #[test]
    fn esc_and_ctrl_c_quit() {
        let mut app = loaded_app();
        handle_key_event(&mut app, press(KeyCode::Esc));
        assert!(app.quit);

        let mut app = loaded_app();
        handle_key_event(&mut app, ctrl('c'));
        assert!(app.quit);
    }

    #[test]
    fn delete_removes_selected_story() {
        let mut app = loaded_app();
        handle_key_event(&mut app, press(KeyCode::Down));
        handle_key_event(&mut app, press(KeyCode::Delete));
        assert_eq!(app.state().items.len(), 1);
        assert_eq!(app.state().items[0].title, "Redux");

        handle_key_event(&mut app, ctrl('d'));
        assert!(app.state().items.is_empty());
    }

    #[test]
    fn f5_requests_refresh() {
        let mut app = loaded_app();
        handle_key_event(&mut app, press(KeyCode::F(5)));
        assert!(app.take_refresh_request());
    }

    #[test]
    fn ctrl_r_requests_refresh_unless_loading() {
        let mut app = loaded_app();
        handle_key_event(&mut app, ctrl('r'));
        assert!(app.take_refresh_request());

        app.dispatch(Action::FetchInit);
        handle_key_event(&mut app, press(KeyCode::F(5)));
        assert!(!app.take_refresh_request());
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = loaded_app();
        let release = KeyEvent {
            code: KeyCode::Char('x'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut app, release);
        assert_eq!(app.search_term(), "");
    }
}
