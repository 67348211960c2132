use std::path::PathBuf;

use crate::domain::FeedItem;

/// A feed page persisted in the page cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    /// 1-based page ordinal
    pub number: u32,
    pub path: PathBuf,
}

/// Where a page's items were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    Cache,
    Remote,
}

/// Items parsed from one feed page, in document order.
#[derive(Debug, Clone)]
pub struct PageItems {
    pub number: u32,
    pub source: PageSource,
    pub items: Vec<FeedItem>,
}
