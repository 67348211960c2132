use serde::Deserialize;

/// Configuration for image localization
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Download and rewrite images (default: true)
    pub enabled: bool,

    /// Only images served from this host are localized (default: feed host)
    pub allowed_host: Option<String>,

    /// Downscale images wider than this many pixels, 0 disables (default: 600)
    pub max_width: u32,

    /// Subdirectory of the output directory holding images (default: "images")
    pub directory: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_host: None,
            max_width: 600,
            directory: "images".to_string(),
        }
    }
}

impl MediaConfig {
    /// Width limit, if resizing is enabled
    pub fn width_limit(&self) -> Option<u32> {
        (self.max_width > 0).then_some(self.max_width)
    }
}
