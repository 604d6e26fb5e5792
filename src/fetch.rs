//! Fetch orchestration.
//!
//! Turns one call to a [`StorySource`] into the action sequence the store
//! understands: `FetchInit` right away, then exactly one of `FetchSuccess`
//! or `FetchFailure` once the attempt settles.
//!
//! ## For contributors
//!
//! The orchestrator never retries and never cancels.  A refresh is simply the
//! caller invoking [`FetchOrchestrator::start`] again.  If the owning store is
//! dropped while a fetch is in flight, the task still runs to completion and
//! its action is discarded by the closed channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::source::{FetchError, Story, StorySource};
use crate::store::Action;

/// Where the orchestrator delivers its actions.
pub trait ActionSink: Send + Sync + 'static {
    fn dispatch(&self, action: Action);
}

impl ActionSink for mpsc::UnboundedSender<Action> {
    fn dispatch(&self, action: Action) {
        // The receiver is gone once the main loop has exited; nothing left
        // to apply the action to.
        let _ = self.send(action);
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchSettings {
    /// Fail the attempt if the source has not answered within this long.
    pub timeout: Option<Duration>,
}

/// Issues fetch attempts against one source.
pub struct FetchOrchestrator {
    source: Arc<dyn StorySource>,
    settings: FetchSettings,
}

impl FetchOrchestrator {
    pub fn new(source: Arc<dyn StorySource>, settings: FetchSettings) -> Self {
        Self { source, settings }
    }

    /// Start one fetch attempt.
    ///
    /// `FetchInit` is dispatched before this returns; the terminal action is
    /// dispatched from a task spawned on the current tokio runtime.  Must be
    /// called from within a runtime.
    pub fn start<S: ActionSink>(&self, sink: S) -> JoinHandle<()> {
        sink.dispatch(Action::FetchInit);
        log::info!("Fetching stories from {}", self.source.name());

        let source = self.source.clone();
        let timeout = self.settings.timeout;
        tokio::spawn(async move {
            let action = match fetch_once(source.as_ref(), timeout).await {
                Ok(stories) => {
                    log::info!("Fetched {} stories from {}", stories.len(), source.name());
                    Action::FetchSuccess(stories)
                }
                Err(err) => {
                    log::warn!("Fetch from {} failed: {}", source.name(), err);
                    Action::FetchFailure
                }
            };
            sink.dispatch(action);
        })
    }
}

async fn fetch_once(
    source: &dyn StorySource,
    timeout: Option<Duration>,
) -> Result<Vec<Story>, FetchError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, source.fetch())
            .await
            .map_err(|_| FetchError::Timeout(limit))?,
        None => source.fetch().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
