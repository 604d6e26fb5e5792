//! Stub story source.
//!
//! Stands in for a real network call: it hands back a fixed set of stories
//! after a simulated delay.  The seed list is passed in by the caller, either
//! the built-in [`sample_stories`] or a JSON file parsed with
//! [`parse_stories`].

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use super::{FetchError, Story, StorySource};

/// Latency the stub simulates when none is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// A source that resolves to a fixed list of stories after `delay`.
pub struct StubSource {
    label: String,
    stories: Vec<Story>,
    delay: Duration,
    fail: bool,
}

impl StubSource {
    /// Create a stub that resolves to `stories` after `delay`.
    pub fn new(label: impl Into<String>, stories: Vec<Story>, delay: Duration) -> Self {
        Self {
            label: label.into(),
            stories,
            delay,
            fail: false,
        }
    }

    /// Build a stub from a JSON stories file.
    ///
    /// The file is read up front so a bad path or payload is reported at
    /// startup rather than as an anonymous fetch failure.
    pub fn from_file(path: &Path, delay: Duration) -> Result<Self, FetchError> {
        let text = std::fs::read_to_string(path)?;
        let stories = parse_stories(&text)?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "stories".into());
        Ok(Self::new(label, stories, delay))
    }

    /// Make every fetch fail after the delay.  Useful for exercising the
    /// error path of the UI.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl StorySource for StubSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self) -> Result<Vec<Story>, FetchError> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(FetchError::Io(std::io::Error::other(
                "stub configured to fail",
            )));
        }
        Ok(self.stories.clone())
    }
}

/// Parse a stories payload.
///
/// Accepts either a bare JSON array of stories or a search API response of
/// the form `{"hits": [...]}`.  Pure (no I/O) so tests can exercise it
/// directly.
pub fn parse_stories(text: &str) -> Result<Vec<Story>, FetchError> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Payload {
        List(Vec<Story>),
        Hits { hits: Vec<Story> },
    }

    let stories = match serde_json::from_str(text)? {
        Payload::List(stories) => stories,
        Payload::Hits { hits } => hits,
    };
    Ok(stories)
}

/// The two stories shown when no stories file is configured.
pub fn sample_stories() -> Vec<Story> {
    vec![
        Story::new(0, "React", "https://reactjs.org/", "Jordan Walke", 3, 4),
        Story::new(
            1,
            "Redux",
            "https://redux.js.org/",
            "Dan Abramov, Andrew Clark",
            3,
            4,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
