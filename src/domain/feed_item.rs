use serde::{Deserialize, Serialize};

/// One syndicated entry as it appeared in a feed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    /// Canonical remote URL, the item's identity
    pub url: String,
    /// Post markup
    pub body: String,
    /// Publication date, kept as display text
    pub date: String,
    pub author: String,
}

impl FeedItem {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }
}
