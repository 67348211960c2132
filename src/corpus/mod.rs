//! Ordered, URL-keyed collection of posts and the passes that rewrite them.

pub mod links;

use std::collections::HashMap;

use crate::domain::{FeedItem, PageItems, Post};

pub use links::rewrite_links;

/// Every post of one run, keyed by remote URL, in publication order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    posts: HashMap<String, Post>,
    order: Vec<String>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, remote_url: &str) -> Option<&Post> {
        self.posts.get(remote_url)
    }

    /// Remote URLs in publication order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Posts in publication order.
    pub fn iter(&self) -> impl Iterator<Item = &Post> {
        self.order.iter().filter_map(|url| self.posts.get(url))
    }

    /// Posts in no particular order, for in-place body rewrites.
    pub fn posts_mut(&mut self) -> impl Iterator<Item = &mut Post> {
        self.posts.values_mut()
    }
}

/// Builds a [`Corpus`] from feed items in fetch order.
///
/// Owns the ordinal counter: the Nth distinct URL pushed gets ordinal N.
/// When a URL shows up again (the refetched last page), its ordinal and
/// position stay those of the first sighting and its content is replaced by
/// the later one.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    next_ordinal: usize,
    corpus: Corpus,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(pages: Vec<PageItems>) -> Corpus {
        let mut builder = Self::new();
        for page in pages {
            builder.extend(page.items);
        }
        builder.finish()
    }

    /// Ordinal the next new URL will receive.
    pub fn next_ordinal(&self) -> usize {
        self.next_ordinal
    }

    /// Add one item; returns `true` if its URL was new.
    pub fn push(&mut self, item: FeedItem) -> bool {
        if let Some(existing) = self.corpus.posts.get_mut(&item.url) {
            tracing::debug!(
                "{} seen again, keeping {} with newer content",
                item.url,
                existing.local_name
            );
            existing.replace_content(item);
            return false;
        }

        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        self.corpus.order.push(item.url.clone());
        self.corpus
            .posts
            .insert(item.url.clone(), Post::from_item(ordinal, item));
        true
    }

    pub fn extend<I: IntoIterator<Item = FeedItem>>(&mut self, items: I) {
        for item in items {
            self.push(item);
        }
    }

    pub fn finish(self) -> Corpus {
        self.corpus
    }
}
