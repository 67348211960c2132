pub mod http_fetcher;
pub mod offline;
pub mod paginated;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;

use crate::app::Result;

#[derive(Debug)]
pub enum FetchResult {
    /// Resource fetched successfully
    Content { body: Vec<u8> },
    /// The server has no such resource (HTTP 404/410); ends pagination
    NotFound,
}

/// Source of remote bytes: feed pages and images.
///
/// Only a missing resource is reported as [`FetchResult::NotFound`]; timeouts,
/// connection failures and other error statuses are errors.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult>;
}
