use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum BinderyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Feed parsing error on page {page}: {message}")]
    FeedParse { page: u32, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTML rewriting error: {0}")]
    Rewrite(String),

    #[error("Converter error: {0}")]
    Converter(String),

    #[error("{0}")]
    Other(String),
}

impl BinderyError {
    pub fn feed_parse(page: u32, message: impl Into<String>) -> Self {
        Self::FeedParse {
            page,
            message: message.into(),
        }
    }

    /// Process exit code for this class of failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            BinderyError::Config(_) => 2,
            BinderyError::Http(_) | BinderyError::HttpStatus { .. } | BinderyError::InvalidUrl(_) => 3,
            BinderyError::FeedParse { .. } => 4,
            BinderyError::Io(_) | BinderyError::Json(_) => 5,
            BinderyError::Rewrite(_) => 6,
            BinderyError::Converter(_) => 7,
            BinderyError::Other(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, BinderyError>;
