use serde::{Deserialize, Serialize};

use crate::domain::FeedItem;

pub const POST_FILE_PREFIX: &str = "p";
pub const POST_FILE_SUFFIX: &str = ".html";

/// Local file name for the post with the given ordinal: `p0000.html`, `p0001.html`, ...
pub fn local_name(ordinal: usize) -> String {
    format!("{}{:04}{}", POST_FILE_PREFIX, ordinal, POST_FILE_SUFFIX)
}

/// Working representation of one article.
///
/// The body is rewritten in place by the link and media passes; everything
/// else is fixed once the post is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// First-seen position across all pages, starting at 0
    pub ordinal: usize,
    pub title: String,
    pub body: String,
    pub date: String,
    pub author: String,
    /// Key used for cross-referencing
    pub remote_url: String,
    /// File name inside the output directory
    pub local_name: String,
}

impl Post {
    pub fn from_item(ordinal: usize, item: FeedItem) -> Self {
        Self {
            ordinal,
            title: item.title,
            body: item.body,
            date: item.date,
            author: item.author,
            remote_url: item.url,
            local_name: local_name(ordinal),
        }
    }

    /// Replace content with a later sighting of the same URL, keeping identity.
    pub fn replace_content(&mut self, item: FeedItem) {
        self.title = item.title;
        self.body = item.body;
        self.date = item.date;
        self.author = item.author;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name_is_zero_padded() {
        assert_eq!(local_name(0), "p0000.html");
        assert_eq!(local_name(42), "p0042.html");
        assert_eq!(local_name(12345), "p12345.html");
    }

    #[test]
    fn test_replace_content_keeps_identity() {
        let item = FeedItem {
            title: "Old".into(),
            url: "https://example.com/a".into(),
            body: "old".into(),
            date: "Mon, 01 Jan 2024 00:00:00 +0000".into(),
            author: "me".into(),
        };
        let mut post = Post::from_item(3, item.clone());
        post.replace_content(FeedItem {
            title: "New".into(),
            body: "new".into(),
            ..item
        });

        assert_eq!(post.ordinal, 3);
        assert_eq!(post.local_name, "p0003.html");
        assert_eq!(post.remote_url, "https://example.com/a");
        assert_eq!(post.title, "New");
        assert_eq!(post.body, "new");
    }
}
