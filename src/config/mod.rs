//! Configuration management for Bindery.
//!
//! Configuration is read from `~/.config/bindery/config.toml` unless a path is
//! given on the command line. If the default file doesn't exist, a default
//! configuration with comments is created.

pub mod converter;
pub mod media;

pub use converter::ConverterConfig;
pub use media::MediaConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Placeholder replaced by the page number in [`FeedConfig::url_template`].
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub paths: PathsConfig,
    pub http: HttpConfig,
    pub media: MediaConfig,
    pub converter: ConverterConfig,
}

/// The blog being bound.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Paginated feed URL, `{page}` is replaced by the 1-based page number
    pub url_template: String,
    /// Book title handed to the converter
    pub title: String,
    /// Book author handed to the converter
    pub author: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url_template: "https://www.mrmoneymustache.com/feed/?order=ASC&paged={page}"
                .to_string(),
            title: "Mr. Money Mustache".to_string(),
            author: "Mr. Money Mustache".to_string(),
        }
    }
}

impl FeedConfig {
    pub fn page_url(&self, page: u32) -> String {
        self.url_template.replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    /// Host of the feed, used as the default image host.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.page_url(1))
            .ok()
            .and_then(|u| u.host_str().map(String::from))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Feed pages, downloaded media and the URL map
    pub cache_dir: PathBuf,
    /// Generated HTML book; wiped on every build
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".cached"),
            output_dir: PathBuf::from("book"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "bindery/0.1.0".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used and
    /// created with commented defaults if missing. Missing fields fall back to
    /// default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: config_path,
                source,
            },
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.feed.url_template.contains(PAGE_PLACEHOLDER) {
            return Err(ConfigError::Invalid(format!(
                "feed.url_template must contain {}",
                PAGE_PLACEHOLDER
            )));
        }
        let output_dir = lexical_normalize(&self.paths.output_dir);
        if output_dir.as_os_str().is_empty() || output_dir.starts_with("..") {
            return Err(ConfigError::Invalid(
                "paths.output_dir must be below the working directory, it is wiped on every build"
                    .into(),
            ));
        }
        if lexical_normalize(&self.paths.cache_dir).starts_with(&output_dir) {
            return Err(ConfigError::Invalid(
                "paths.cache_dir must not be inside paths.output_dir, which is wiped on every build"
                    .into(),
            ));
        }
        if self.converter.enabled && self.converter.formats.is_empty() {
            return Err(ConfigError::Invalid(
                "converter.formats is empty but the converter is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Image host allowed for localization: explicit setting or the feed's host.
    pub fn media_host(&self) -> Option<String> {
        self.media
            .allowed_host
            .clone()
            .or_else(|| self.feed.host())
    }

    /// Get the default config file path: `~/.config/bindery/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("bindery").join("config.toml"))
    }

    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Bindery Configuration
#
# Relative paths are resolved against the working directory.

[feed]
# Paginated feed; {page} starts at 1 and increases until the server answers 404
url_template = "https://www.mrmoneymustache.com/feed/?order=ASC&paged={page}"
title = "Mr. Money Mustache"
author = "Mr. Money Mustache"

[paths]
cache_dir = ".cached"
# Wiped and regenerated on every build
output_dir = "book"

[http]
timeout_secs = 30
user_agent = "bindery/0.1.0"

[media]
enabled = true
# Only images from this host are downloaded (default: the feed's host)
# allowed_host = "www.mrmoneymustache.com"
# Images wider than this are downscaled, 0 keeps the original size
max_width = 600
# Subdirectory of output_dir holding the images
directory = "images"

[converter]
enabled = true
program = "ebook-convert"
# One file per format, named <output_name>.<format>
formats = ["azw3", "epub", "pdf"]
output_name = "book"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Resolve `.` and `..` without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = out.components().next_back();
                let at_root = matches!(last, Some(Component::RootDir | Component::Prefix(_)));
                let above_start = matches!(last, None | Some(Component::ParentDir));
                if above_start {
                    out.push("..");
                } else if !at_root {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
