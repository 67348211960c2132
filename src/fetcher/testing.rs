//! In-memory fetcher for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::{BinderyError, Result};
use crate::fetcher::{FetchResult, Fetcher};

/// Serves canned bodies and records every requested URL.
///
/// Unknown URLs are [`FetchResult::NotFound`] unless a body was given with
/// [`MemoryFetcher::otherwise`]; URLs registered with [`MemoryFetcher::fail`]
/// return an I/O error.
#[derive(Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Vec<u8>>,
    failures: HashSet<String>,
    fallback: Option<Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }

    pub fn fail(mut self, url: impl Into<String>) -> Self {
        self.failures.insert(url.into());
        self
    }

    pub fn otherwise(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.fallback = Some(body.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        if self.failures.contains(url) {
            return Err(BinderyError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                format!("connection reset fetching {}", url),
            )));
        }

        Ok(match self.responses.get(url).or(self.fallback.as_ref()) {
            Some(body) => FetchResult::Content { body: body.clone() },
            None => FetchResult::NotFound,
        })
    }
}
