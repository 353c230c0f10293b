//! `[site]` section configuration.
//!
//! ```toml
//! [site]
//! title = "My Blog"
//! url = "https://example.com/blog"   # path part becomes the URL prefix
//! description = "Notes and puzzles"
//! author = "Someone"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfoConfig {
    /// Site title, available to templates as `$site.title$`.
    pub title: String,

    /// Public base URL. Required for absolute links and the feed.
    pub url: Option<String>,

    pub description: String,

    pub author: String,
}

impl SiteInfoConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(url) = &self.url
            && url::Url::parse(url).is_err()
        {
            diag.error_with_hint(
                FieldPath::new("site.url"),
                format!("`{url}` is not a valid URL"),
                "use a full URL such as https://example.com/blog",
            );
        }
        if self.title.is_empty() {
            diag.warn(FieldPath::new("site.title"), "site title is empty");
        }
    }
}
