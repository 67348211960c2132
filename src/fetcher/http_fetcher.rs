use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::app::{BinderyError, Result};
use crate::config::HttpConfig;
use crate::fetcher::{FetchResult, Fetcher};

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult> {
        let response = self.client.get(url).send().await?;

        match classify(url, response.status())? {
            Status::Missing => {
                tracing::debug!("{} answered {}", url, response.status());
                Ok(FetchResult::NotFound)
            }
            Status::Body => {
                let body = response.bytes().await?.to_vec();
                Ok(FetchResult::Content { body })
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Status {
    Body,
    Missing,
}

/// 404 and 410 mean the resource does not exist; any other non-success
/// status is an error.
fn classify(url: &str, status: StatusCode) -> Result<Status> {
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => Ok(Status::Missing),
        s if s.is_success() => Ok(Status::Body),
        s => Err(BinderyError::HttpStatus {
            url: url.to_string(),
            status: s.as_u16(),
        }),
    }
}
