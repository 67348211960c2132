//! Image localization.
//!
//! ```text
//! <img src> → resolve against post URL → host check → media cache → output copy → rewrite src
//! ```
//!
//! Images from other hosts are left alone. Originals are cached under
//! `<cache_dir>/media` and never fetched twice; the (possibly downscaled)
//! copy the book references lives in `<output_dir>/<directory>`.

mod resize;

pub use resize::write_scaled;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use html_escape::decode_html_entities;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use url::Url;

use crate::app::{BinderyError, Result};
use crate::corpus::Corpus;
use crate::fetcher::{FetchResult, Fetcher};

pub const MEDIA_CACHE_DIR: &str = "media";

/// Counters for one localization pass, one entry per distinct image.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MediaStats {
    /// Downloaded during this run
    pub downloaded: usize,
    /// Served from the media cache
    pub cached: usize,
    /// Hosted elsewhere, left untouched
    pub skipped: usize,
    /// Missing or failed to download, left untouched
    pub failed: usize,
}

impl MediaStats {
    pub fn localized(&self) -> usize {
        self.downloaded + self.cached
    }
}

pub struct MediaLocalizer {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    allowed_host: Option<String>,
    cache_dir: PathBuf,
    output_dir: PathBuf,
    directory: String,
    max_width: Option<u32>,
}

impl MediaLocalizer {
    /// `cache_root` is the feed cache directory, images go below it in
    /// [`MEDIA_CACHE_DIR`]. `directory` is relative to `output_dir` and is
    /// also the prefix of rewritten references.
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        allowed_host: Option<String>,
        cache_root: &Path,
        output_dir: &Path,
        directory: &str,
        max_width: Option<u32>,
    ) -> Self {
        Self {
            fetcher,
            allowed_host,
            cache_dir: cache_root.join(MEDIA_CACHE_DIR),
            output_dir: output_dir.to_path_buf(),
            directory: directory.trim_matches('/').to_string(),
            max_width,
        }
    }

    /// Localize the images of every post, rewriting bodies in place.
    ///
    /// Download failures are logged and counted, never returned; only
    /// local disk errors abort.
    pub async fn localize(&self, corpus: &mut Corpus) -> Result<MediaStats> {
        let mut stats = MediaStats::default();
        // Resolved URL → local reference, shared across posts
        let mut seen: HashMap<String, Option<String>> = HashMap::new();

        for post in corpus.posts_mut() {
            let mut replacements = HashMap::new();

            for src in image_sources(&post.body)? {
                let resolved = match resolve(&post.remote_url, &src) {
                    Some(url) => url,
                    None => {
                        tracing::debug!("{}: ignoring image {}", post.local_name, src);
                        continue;
                    }
                };

                let local = match seen.get(resolved.as_str()) {
                    Some(local) => local.clone(),
                    None => {
                        let local = self.localize_one(&resolved, &mut stats).await?;
                        seen.insert(resolved.to_string(), local.clone());
                        local
                    }
                };

                if let Some(local) = local {
                    replacements.insert(src, local);
                }
            }

            if !replacements.is_empty() {
                post.body = rewrite_images(&post.body, &replacements)?;
            }
        }

        tracing::info!(
            "Images: {} downloaded, {} cached, {} skipped, {} failed",
            stats.downloaded,
            stats.cached,
            stats.skipped,
            stats.failed
        );
        Ok(stats)
    }

    fn is_allowed(&self, url: &Url) -> bool {
        match (&self.allowed_host, url.host_str()) {
            (Some(allowed), Some(host)) => allowed.eq_ignore_ascii_case(host),
            _ => false,
        }
    }

    async fn localize_one(&self, url: &Url, stats: &mut MediaStats) -> Result<Option<String>> {
        if !self.is_allowed(url) {
            tracing::info!("Skipping image from foreign host: {}", url);
            stats.skipped += 1;
            return Ok(None);
        }

        let name = media_file_name(url);
        let cached = self.cache_dir.join(&name);

        let bytes = if cached.is_file() {
            stats.cached += 1;
            fs::read(&cached)?
        } else {
            match self.fetcher.fetch(url.as_str()).await {
                Ok(FetchResult::Content { body }) => {
                    fs::create_dir_all(&self.cache_dir)?;
                    fs::write(&cached, &body)?;
                    stats.downloaded += 1;
                    body
                }
                Ok(FetchResult::NotFound) => {
                    tracing::warn!("Image not found: {}", url);
                    stats.failed += 1;
                    return Ok(None);
                }
                Err(e) => {
                    tracing::warn!("Failed to download image {}: {}", url, e);
                    stats.failed += 1;
                    return Ok(None);
                }
            }
        };

        let target = self.output_dir.join(&self.directory).join(&name);
        if !target.exists() {
            write_scaled(&bytes, &target, self.max_width)?;
        }

        Ok(Some(format!("{}/{}", self.directory, name)))
    }
}

/// Distinct, non-empty `src` values of the `<img>` elements in `html`.
fn image_sources(html: &str) -> Result<Vec<String>> {
    let selector =
        Selector::parse("img[src]").map_err(|e| BinderyError::Rewrite(e.to_string()))?;
    let document = Html::parse_fragment(html);

    let mut sources: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        if let Some(src) = element.value().attr("src").map(str::trim) {
            if !src.is_empty() && !sources.iter().any(|s| s == src) {
                sources.push(src.to_string());
            }
        }
    }
    Ok(sources)
}

/// Absolute http(s) URL of an image reference, relative to its post.
fn resolve(base: &str, src: &str) -> Option<Url> {
    let url = Url::parse(base).ok()?.join(src).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Cache file name: readable stem plus a hash of the source path.
///
/// Uploads in different directories often share a file name, the hash keeps
/// them apart.
pub fn media_file_name(url: &Url) -> String {
    let mut source = url.path().to_string();
    if let Some(query) = url.query() {
        source.push('?');
        source.push_str(query);
    }
    let digest = hex::encode(Sha256::digest(source.as_bytes()));

    let file = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    let (stem, ext) = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file, None),
    };

    let clean = |s: &str| -> String {
        s.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    };

    match ext.map(clean).filter(|e| !e.is_empty()) {
        Some(ext) => format!("{}-{}.{}", clean(stem), &digest[..12], ext.to_ascii_lowercase()),
        None => format!("{}-{}", clean(stem), &digest[..12]),
    }
}

/// Point localized images at their local copy and drop responsive variants
/// that would still reference the remote host.
fn rewrite_images(html: &str, replacements: &HashMap<String, String>) -> Result<String> {
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img[src]", |el| {
                if let Some(raw) = el.get_attribute("src") {
                    let src = decode_html_entities(&raw);
                    if let Some(local) = replacements.get(src.trim()) {
                        el.set_attribute("src", local)?;
                        el.remove_attribute("srcset");
                        el.remove_attribute("sizes");
                    }
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| BinderyError::Rewrite(e.to_string()))
}
