use std::sync::Arc;

use crate::app::Result;
use crate::config::FeedConfig;
use crate::domain::{PageItems, PageSource};
use crate::fetcher::{FetchResult, Fetcher};
use crate::normalizer::Normalizer;
use crate::store::PageCache;

/// Walks the paginated feed, serving known pages from the cache and
/// fetching the rest until the server runs out of pages.
pub struct PaginatedFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
    feed: FeedConfig,
}

impl PaginatedFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, feed: FeedConfig) -> Self {
        Self {
            fetcher,
            normalizer: Normalizer::new(),
            feed,
        }
    }

    /// Every page, in page order: all cached pages first, then the pages
    /// fetched from the resume point on.
    ///
    /// The last cached page is fetched again because the blog may still be
    /// appending to it, so its items usually appear twice; the corpus
    /// builder resolves the repeats.
    pub async fn fetch_all(&self, cache: &PageCache) -> Result<Vec<PageItems>> {
        let mut pages = self.fetch_cached(cache)?;
        pages.extend(self.fetch_new(cache).await?);
        Ok(pages)
    }

    /// Parse every cached page without touching the network.
    pub fn fetch_cached(&self, cache: &PageCache) -> Result<Vec<PageItems>> {
        cache
            .list_cached_pages()?
            .into_iter()
            .map(|page| -> Result<PageItems> {
                let body = cache.load(&page)?;
                let items = self.normalizer.parse_page(page.number, &body)?;
                tracing::debug!("Cached page {}: {} items", page.number, items.len());
                Ok(PageItems {
                    number: page.number,
                    source: PageSource::Cache,
                    items,
                })
            })
            .collect()
    }

    /// Fetch from the last cached page onwards until a page is missing or
    /// has no items.
    ///
    /// Each page is parsed before it is cached, so a malformed page never
    /// replaces a good copy. Some servers answer pages past the end with an
    /// empty channel instead of a 404; such a page is not cached.
    pub async fn fetch_new(&self, cache: &PageCache) -> Result<Vec<PageItems>> {
        let mut number = cache.last_cached_page_number()?;
        let mut pages = Vec::new();

        tracing::info!("Downloading pages {} and newer", number);

        loop {
            let url = self.feed.page_url(number);
            match self.fetcher.fetch(&url).await? {
                FetchResult::NotFound => {
                    tracing::info!("Page {} not found, end of feed", number);
                    break;
                }
                FetchResult::Content { body } => {
                    let items = self.normalizer.parse_page(number, &body)?;
                    if items.is_empty() {
                        tracing::info!("Page {} is empty, end of feed", number);
                        break;
                    }
                    cache.store(number, &body)?;
                    tracing::info!("Fetched page {}: {} items", number, items.len());
                    pages.push(PageItems {
                        number,
                        source: PageSource::Remote,
                        items,
                    });
                    number += 1;
                }
            }
        }

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::BinderyError;
    use crate::fetcher::offline::OfflineFetcher;
    use crate::fetcher::testing::MemoryFetcher;
    use crate::normalizer::tests::rss_page;

    const TEMPLATE: &str = "https://blog.example.com/feed/?paged={page}";

    fn feed() -> FeedConfig {
        FeedConfig {
            url_template: TEMPLATE.to_string(),
            ..FeedConfig::default()
        }
    }

    fn page_url(n: u32) -> String {
        TEMPLATE.replace("{page}", &n.to_string())
    }

    fn page(urls: &[&str]) -> String {
        let items: Vec<(&str, &str, &str)> = urls.iter().map(|u| (*u, *u, "<p>body</p>")).collect();
        rss_page(&items)
    }

    fn urls(pages: &[PageItems]) -> Vec<Vec<String>> {
        pages
            .iter()
            .map(|p| p.items.iter().map(|i| i.url.clone()).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_empty_cache_fetches_from_page_one() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with(page_url(1), page(&["https://blog.example.com/u1"]))
                .with(page_url(2), page(&["https://blog.example.com/u2"])),
        );

        let pages = PaginatedFetcher::new(fetcher.clone(), feed())
            .fetch_all(&cache)
            .await
            .unwrap();

        assert_eq!(
            urls(&pages),
            vec![
                vec!["https://blog.example.com/u1".to_string()],
                vec!["https://blog.example.com/u2".to_string()],
            ]
        );
        assert!(pages.iter().all(|p| p.source == PageSource::Remote));
        assert_eq!(
            fetcher.requests(),
            vec![page_url(1), page_url(2), page_url(3)]
        );
        assert_eq!(cache.last_cached_page_number().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_resume_refetches_last_cached_page_first() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        cache.store(1, page(&["https://blog.example.com/u1"]).as_bytes()).unwrap();
        cache.store(2, page(&["https://blog.example.com/u2"]).as_bytes()).unwrap();
        cache.store(3, page(&["https://blog.example.com/u3"]).as_bytes()).unwrap();

        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with(
                    page_url(3),
                    page(&["https://blog.example.com/u3", "https://blog.example.com/u4"]),
                )
                .with(page_url(4), page(&["https://blog.example.com/u5"])),
        );

        let pages = PaginatedFetcher::new(fetcher.clone(), feed())
            .fetch_all(&cache)
            .await
            .unwrap();

        // Cached pages are never requested, page 3 is requested before 4
        assert_eq!(
            fetcher.requests(),
            vec![page_url(3), page_url(4), page_url(5)]
        );

        let numbers: Vec<(u32, PageSource)> = pages.iter().map(|p| (p.number, p.source)).collect();
        assert_eq!(
            numbers,
            vec![
                (1, PageSource::Cache),
                (2, PageSource::Cache),
                (3, PageSource::Cache),
                (3, PageSource::Remote),
                (4, PageSource::Remote),
            ]
        );

        // Refreshed page 3 replaced the cached copy
        let stored = cache.list_cached_pages().unwrap();
        assert_eq!(stored.len(), 4);
        let refreshed = String::from_utf8(cache.load(&stored[2]).unwrap()).unwrap();
        assert!(refreshed.contains("https://blog.example.com/u4"));
    }

    #[tokio::test]
    async fn test_empty_page_ends_feed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        let fetcher = Arc::new(MemoryFetcher::new().otherwise(page(&[])));

        let pages = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            PaginatedFetcher::new(fetcher.clone(), feed()).fetch_all(&cache),
        )
        .await
        .expect("fetching an endless empty feed must terminate")
        .unwrap();

        assert!(pages.is_empty());
        assert_eq!(fetcher.requests(), vec![page_url(1)]);
        assert!(cache.list_cached_pages().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_page_after_resume_keeps_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        cache.store(1, page(&["https://blog.example.com/u1"]).as_bytes()).unwrap();
        cache.store(2, page(&["https://blog.example.com/u2"]).as_bytes()).unwrap();

        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with(
                    page_url(2),
                    page(&["https://blog.example.com/u2", "https://blog.example.com/u3"]),
                )
                .otherwise(page(&[])),
        );

        let pages = PaginatedFetcher::new(fetcher.clone(), feed())
            .fetch_all(&cache)
            .await
            .unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(
            fetcher.requests(),
            vec![page_url(2), page_url(3)]
        );
        assert_eq!(cache.list_cached_pages().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_offline_reads_only_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        cache.store(1, page(&["https://blog.example.com/u1"]).as_bytes()).unwrap();

        let pages = PaginatedFetcher::new(Arc::new(OfflineFetcher), feed())
            .fetch_all(&cache)
            .await
            .unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].source, PageSource::Cache);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with(page_url(1), page(&["https://blog.example.com/u1"]))
                .fail(page_url(2)),
        );

        let result = PaginatedFetcher::new(fetcher, feed()).fetch_all(&cache).await;

        assert!(matches!(result, Err(BinderyError::Io(_))));
        // The page fetched before the failure is kept for the next run
        assert_eq!(cache.last_cached_page_number().unwrap(), 1);
        assert_eq!(cache.list_cached_pages().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_remote_page_is_fatal_and_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        let good = page(&["https://blog.example.com/u1"]);
        cache.store(1, good.as_bytes()).unwrap();

        let fetcher = Arc::new(MemoryFetcher::new().with(page_url(1), "<html>maintenance</html>"));

        let result = PaginatedFetcher::new(fetcher, feed()).fetch_all(&cache).await;

        assert!(matches!(result, Err(BinderyError::FeedParse { page: 1, .. })));
        let stored = cache.list_cached_pages().unwrap();
        assert_eq!(cache.load(&stored[0]).unwrap(), good.as_bytes());
    }

    #[test]
    fn test_malformed_cached_page_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        cache.store(1, page(&["https://blog.example.com/u1"]).as_bytes()).unwrap();
        cache.store(2, b"not a feed").unwrap();

        let result = PaginatedFetcher::new(Arc::new(OfflineFetcher), feed()).fetch_cached(&cache);
        assert!(matches!(result, Err(BinderyError::FeedParse { page: 2, .. })));
    }
}
