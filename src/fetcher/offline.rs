use async_trait::async_trait;

use crate::app::Result;
use crate::fetcher::{FetchResult, Fetcher};

/// Fetcher that never touches the network: every resource is missing.
///
/// Pagination stops right after the cached pages and images not already
/// in the media cache keep their remote references.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

#[async_trait]
impl Fetcher for OfflineFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult> {
        tracing::debug!("Offline, not fetching {}", url);
        Ok(FetchResult::NotFound)
    }
}
