use std::sync::Arc;

use crate::app::Result;
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::offline::OfflineFetcher;
use crate::fetcher::paginated::PaginatedFetcher;
use crate::fetcher::Fetcher;
use crate::media::MediaLocalizer;
use crate::store::PageCache;

/// Wires configuration, page cache and fetcher together for one run.
pub struct AppContext {
    pub config: Config,
    pub cache: PageCache,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.http)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Context that reads the caches and never touches the network.
    pub fn offline(config: Config) -> Self {
        Self::with_fetcher(config, Arc::new(OfflineFetcher))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        let cache = PageCache::new(&config.paths.cache_dir);
        Self {
            config,
            cache,
            fetcher,
        }
    }

    pub fn paginated_fetcher(&self) -> PaginatedFetcher {
        PaginatedFetcher::new(self.fetcher.clone(), self.config.feed.clone())
    }

    pub fn media_localizer(&self) -> MediaLocalizer {
        let media = &self.config.media;
        MediaLocalizer::new(
            self.fetcher.clone(),
            self.config.media_host(),
            &self.config.paths.cache_dir,
            &self.config.paths.output_dir,
            &media.directory,
            media.width_limit(),
        )
    }
}
