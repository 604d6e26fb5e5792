//! The story type shared by every source and by the store.
//!
//! `Story` is one entry in the list.  Sources produce them, the store keeps
//! them in fetch order, and the UI renders whatever subset the filter lets
//! through.
//!
//! ## Wire format
//!
//! The serde field names match the Hacker News search API (`objectID`,
//! `num_comments`, `points`), so a dump of real search hits can be used as a
//! stories file without any conversion.  The API sends `objectID` as a
//! string and `null` for missing fields (Ask HN posts have no `url`), so
//! both are accepted on input.  Output always uses a numeric id.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Identity of a story.  Two stories with the same id are the same story.
pub type StoryId = u64;

/// A single story, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Unique identifier, used for removal.
    #[serde(rename = "objectID", deserialize_with = "id_from_number_or_string")]
    pub id: StoryId,

    /// Headline.  The filter matches against this field only.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,

    /// Link to the story itself.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,

    /// Who posted it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,

    /// Number of comments on the story.
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_comments: u32,

    /// Score.
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: i64,
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<StoryId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(StoryId),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .parse()
            .map_err(|_| de::Error::custom(format!("story id {:?} is not a number", text))),
    }
}

/// `null` reads the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Story {
    /// Shorthand used by the built-in samples and the tests.
    pub fn new(
        id: StoryId,
        title: impl Into<String>,
        url: impl Into<String>,
        author: impl Into<String>,
        num_comments: u32,
        points: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            url: url.into(),
            author: author.into(),
            num_comments,
            points,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_search_api_field_names() {
        let json = r#"{
            "objectID": 7,
            "title": "React",
            "url": "https://reactjs.org/",
            "author": "Jordan Walke",
            "num_comments": 3,
            "points": 4
        }"#;

        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(
            story,
            Story::new(7, "React", "https://reactjs.org/", "Jordan Walke", 3, 4)
        );
    }

    #[test]
    fn optional_fields_default_when_missing() {
        let story: Story = serde_json::from_str(r#"{"objectID": 1, "title": "Bare"}"#).unwrap();
        assert_eq!(story.url, "");
        assert_eq!(story.author, "");
        assert_eq!(story.num_comments, 0);
        assert_eq!(story.points, 0);
    }

    #[test]
    fn negative_comment_count_is_rejected() {
        let json = r#"{"objectID": 1, "title": "X", "num_comments": -1}"#;
        assert!(serde_json::from_str::<Story>(json).is_err());
    }

    #[test]
    fn accepts_search_api_hit_with_string_id_and_nulls() {
        let json = r#"{
            "created_at": "2015-01-09T17:56:04.000Z",
            "title": "Ask HN: What are you working on?",
            "url": null,
            "author": "pg",
            "points": 10,
            "story_text": "Curious.",
            "num_comments": null,
            "_tags": ["story", "author_pg", "story_8863", "ask_hn"],
            "objectID": "8863"
        }"#;

        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(
            story,
            Story::new(8863, "Ask HN: What are you working on?", "", "pg", 0, 10)
        );
    }

    #[test]
    fn non_numeric_string_id_is_rejected() {
        let json = r#"{"objectID": "abc", "title": "X"}"#;
        let err = serde_json::from_str::<Story>(json).unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn serializes_with_object_id() {
        let story = Story::new(3, "Redux", "https://redux.js.org/", "Dan Abramov", 3, 4);
        let json = serde_json::to_string(&story).unwrap();
        assert!(json.contains(r#""objectID":3"#));
    }
}
