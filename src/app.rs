use chrono::{DateTime, Local};
use ratatui::widgets::ListState;

use crate::filter::filter_stories;
use crate::persist::PersistedValue;
use crate::source::{Story, StoryId};
use crate::store::{Action, CollectionState, Store};

pub struct App {
    /// The story collection; changed only through [`App::dispatch`].
    store: Store,
    /// Search term, remembered across runs.
    search: PersistedValue<String>,
    /// Selection within the *visible* (filtered) list.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Set by the refresh key, consumed by the main loop.
    refresh_requested: bool,
    /// When the last successful fetch landed.
    pub last_fetched: Option<DateTime<Local>>,
}

impl App {
    pub fn new(search: PersistedValue<String>) -> Self {
        Self {
            store: Store::new(),
            search,
            list_state: ListState::default(),
            quit: false,
            refresh_requested: false,
            last_fetched: None,
        }
    }

    pub fn state(&self) -> &CollectionState {
        self.store.state()
    }

    pub fn search_term(&self) -> &str {
        self.search.get()
    }

    /// False once the search term can no longer be written to disk.
    pub fn search_is_saved(&self) -> bool {
        !self.search.is_degraded()
    }

    /// Stories matching the current search, recomputed on every call.
    pub fn visible(&self) -> Vec<&Story> {
        filter_stories(&self.store.state().items, self.search.get())
    }

    pub fn selected_story(&self) -> Option<&Story> {
        let index = self.list_state.selected()?;
        self.visible().get(index).copied()
    }

    /// Feed an action to the store.
    pub fn dispatch(&mut self, action: Action) {
        let landed = matches!(action, Action::FetchSuccess(_));
        self.store.dispatch(action);
        if landed {
            self.last_fetched = Some(Local::now());
        }
        self.clamp_selection();
    }

    // -- inbound calls from the view -----------------------------------------

    pub fn on_filter_change(&mut self, text: String) {
        self.search.set(text);
        self.clamp_selection();
    }

    pub fn on_remove(&mut self, id: StoryId) {
        self.dispatch(Action::RemoveItem(id));
    }

    // -- search editing ------------------------------------------------------

    pub fn push_search_char(&mut self, c: char) {
        let mut text = self.search.get().clone();
        text.push(c);
        self.on_filter_change(text);
    }

    pub fn pop_search_char(&mut self) {
        let mut text = self.search.get().clone();
        if text.pop().is_some() {
            self.on_filter_change(text);
        }
    }

    pub fn clear_search(&mut self) {
        self.on_filter_change(String::new());
    }

    // -- removal / refresh ---------------------------------------------------

    pub fn remove_selected(&mut self) {
        if let Some(id) = self.selected_story().map(|s| s.id) {
            self.on_remove(id);
        }
    }

    /// Ask for a new fetch attempt.  Ignored while one is still loading.
    pub fn request_refresh(&mut self) {
        if self.state().is_loading {
            log::debug!("Refresh ignored, a fetch is already in flight");
            return;
        }
        self.refresh_requested = true;
    }

    /// Returns true once per refresh request.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.visible().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.visible().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    /// Keep the selection inside the visible list after it shrinks.
    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        match self.list_state.selected() {
            Some(_) if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }
}
