use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{BinderyError, Result};
use crate::domain::FeedItem;

/// Turns a raw feed page into [`FeedItem`]s.
///
/// Bytes are decoded exactly once here; everything downstream works on
/// `String`s.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse one feed page.
    ///
    /// Fails if the document is not a feed, or if any item lacks a link, a
    /// title or a body: a silently dropped post would shift every later
    /// ordinal.
    pub fn parse_page(&self, page: u32, body: &[u8]) -> Result<Vec<FeedItem>> {
        let feed = parser::parse(body).map_err(|e| BinderyError::feed_parse(page, e.to_string()))?;

        feed.entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| -> Result<FeedItem> {
                let url = entry
                    .links
                    .first()
                    .map(|l| l.href.trim().to_string())
                    .filter(|href| !href.is_empty())
                    .ok_or_else(|| {
                        BinderyError::feed_parse(page, format!("item {} has no link", index + 1))
                    })?;

                let title = entry
                    .title
                    .map(|t| decode_html_entities(&t.content).to_string())
                    .ok_or_else(|| {
                        BinderyError::feed_parse(page, format!("item {} has no title", url))
                    })?;

                // content:encoded first, the description otherwise
                let body = entry
                    .content
                    .and_then(|c| c.body)
                    .or_else(|| entry.summary.map(|s| s.content))
                    .ok_or_else(|| {
                        BinderyError::feed_parse(page, format!("item {} has no body", url))
                    })?;

                let author = entry
                    .authors
                    .first()
                    .map(|a| decode_html_entities(&a.name).to_string())
                    .unwrap_or_else(|| {
                        tracing::warn!("Page {}: item {} has no author", page, url);
                        String::new()
                    });

                let date = entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.to_rfc2822())
                    .unwrap_or_else(|| {
                        tracing::warn!("Page {}: item {} has no date", page, url);
                        String::new()
                    });

                Ok(FeedItem {
                    title,
                    url,
                    body,
                    date,
                    author,
                })
            })
            .collect()
    }
}
