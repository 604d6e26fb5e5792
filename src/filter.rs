//! Title search.

use crate::source::Story;

/// The stories whose title contains `filter_text`, ignoring case, in their
/// original order.  An empty filter matches everything.
pub fn filter_stories<'a>(items: &'a [Story], filter_text: &str) -> Vec<&'a Story> {
    let needle = filter_text.to_lowercase();
    items
        .iter()
        .filter(|story| story.title.to_lowercase().contains(&needle))
        .collect()
}
