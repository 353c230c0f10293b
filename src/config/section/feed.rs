//! `[feed]` section configuration.
//!
//! ```toml
//! [feed]
//! enable = true
//! path = "feed.xml"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Generate an RSS feed of recent posts.
    pub enable: bool,

    /// Feed output path, relative to the output directory.
    pub path: PathBuf,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enable: false,
            path: "feed.xml".into(),
        }
    }
}
