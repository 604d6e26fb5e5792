//! Story source abstraction layer.
//!
//! This module defines the [`StorySource`] trait, the [`Story`] type and
//! the [`FetchError`] every source reports.  Concrete sources live in
//! sub-modules (currently only [`stub`]).
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `algolia.rs`).
//! 2. Define a struct and implement [`StorySource`] for it.
//! 3. Add `mod algolia;` below and re-export your struct in the `pub use` block.
//! 4. Construct an instance in `main.rs` instead of the stub.
//!
//! The orchestrator, the store and the UI are all source-agnostic.

mod story;
mod stub;

pub use story::{Story, StoryId};
pub use stub::{parse_stories, sample_stories, StubSource, DEFAULT_DELAY};

use async_trait::async_trait;
use thiserror::Error;

/// Why a fetch attempt failed.
///
/// The store never sees these: the orchestrator collapses every variant into
/// a single `FetchFailure` action.  They exist so the cause can be logged.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch did not settle within {0:?}")]
    Timeout(std::time::Duration),
    #[error("malformed story payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait that every story source must implement.
///
/// [`fetch()`](StorySource::fetch) is awaited on the tokio runtime by the
/// orchestrator, so implementations must be [`Send`] + [`Sync`] and must not
/// block the thread.
#[async_trait]
pub trait StorySource: Send + Sync {
    /// Human-readable label shown in logs and the status bar.
    fn name(&self) -> &str;

    /// Load the current list of stories.
    async fn fetch(&self) -> Result<Vec<Story>, FetchError>;
}
