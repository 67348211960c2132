use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::corpus::Corpus;

pub const URL_MAP_FILE: &str = "url_map.json";

/// Remote URL to local file name mapping of one build, in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMap {
    pub remote_to_local: BTreeMap<String, String>,
    pub local_to_remote: BTreeMap<String, String>,
}

impl UrlMap {
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let mut map = Self::default();
        for post in corpus.iter() {
            map.remote_to_local
                .insert(post.remote_url.clone(), post.local_name.clone());
            map.local_to_remote
                .insert(post.local_name.clone(), post.remote_url.clone());
        }
        map
    }

    pub fn path_in(cache_dir: &Path) -> PathBuf {
        cache_dir.join(URL_MAP_FILE)
    }

    /// Load the map saved by the previous build, empty if there is none.
    pub fn load(cache_dir: &Path) -> Result<Self> {
        let path = Self::path_in(cache_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, cache_dir: &Path) -> Result<()> {
        fs::create_dir_all(cache_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::path_in(cache_dir), content)?;
        Ok(())
    }

    /// Remote URLs whose local name differs from `previous`.
    ///
    /// Ordinals are stable for a stable cache, so anything listed here means
    /// the cached pages changed underneath earlier output.
    pub fn moved_since(&self, previous: &UrlMap) -> Vec<&str> {
        self.remote_to_local
            .iter()
            .filter(|(remote, local)| {
                previous
                    .remote_to_local
                    .get(*remote)
                    .is_some_and(|old| old != *local)
            })
            .map(|(remote, _)| remote.as_str())
            .collect()
    }
}
