//! `[links]` section configuration.
//!
//! ```toml
//! [links]
//! mode = "strict"     # strict | lenient
//! style = "root"      # root | absolute
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub mode: LinkMode,
    pub style: LinkStyle,
}

/// What to do with internal links that resolve to nothing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Record a broken-link failure for the page.
    #[default]
    Strict,
    /// Leave the link as written and log a warning.
    Lenient,
}

/// Shape of rewritten internal links.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// `/prefix/posts/a.html`
    #[default]
    Root,
    /// `https://example.com/prefix/posts/a.html`
    Absolute,
}
