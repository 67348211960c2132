use std::fs;
use std::path::{Path, PathBuf};

use crate::app::Result;
use crate::domain::CachedPage;

pub const PAGE_FILE_PREFIX: &str = "rss_page";
pub const PAGE_FILE_SUFFIX: &str = ".xml";

/// On-disk mirror of the paginated feed, one file per page.
///
/// Pages are never deleted. Storing a page number that already exists
/// overwrites it, which is how the last page gets refreshed.
pub struct PageCache {
    dir: PathBuf,
}

impl PageCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn page_path(&self, number: u32) -> PathBuf {
        self.dir.join(format!(
            "{}{:04}{}",
            PAGE_FILE_PREFIX, number, PAGE_FILE_SUFFIX
        ))
    }

    /// Page number encoded in a cache file name, if it is one.
    fn parse_file_name(name: &str) -> Option<u32> {
        let digits = name
            .strip_prefix(PAGE_FILE_PREFIX)?
            .strip_suffix(PAGE_FILE_SUFFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().filter(|n| *n > 0)
    }

    /// All cached pages, ascending by page number.
    pub fn list_cached_pages(&self) -> Result<Vec<CachedPage>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut pages = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if let Some(number) = name.to_str().and_then(Self::parse_file_name) {
                pages.push(CachedPage {
                    number,
                    path: entry.path(),
                });
            }
        }

        pages.sort_by_key(|p| p.number);
        Ok(pages)
    }

    /// Highest cached page number, or 1 when nothing is cached.
    pub fn last_cached_page_number(&self) -> Result<u32> {
        Ok(self
            .list_cached_pages()?
            .last()
            .map(|p| p.number)
            .unwrap_or(1))
    }

    /// Persist a page, creating the cache directory on first use.
    pub fn store(&self, number: u32, content: &[u8]) -> Result<CachedPage> {
        fs::create_dir_all(&self.dir)?;
        let path = self.page_path(number);
        fs::write(&path, content)?;
        tracing::debug!("Cached page {} at {}", number, path.display());
        Ok(CachedPage { number, path })
    }

    pub fn load(&self, page: &CachedPage) -> Result<Vec<u8>> {
        Ok(fs::read(&page.path)?)
    }
}
