//! `[build]` section configuration.
//!
//! ```toml
//! [build]
//! output = "_site"            # Output directory (relative to site root)
//! templates = "templates"     # Template directory (relative to site root)
//! date_format = "%B %e, %Y"   # Pattern for `$published$` / `$last$`
//! recent_posts = 5            # Posts listed on index.html and in the feed
//! teaser_length = 200         # Characters of plain text in `$teaser$`
//! tag_pages = false           # Generate tags/<slug>.html
//! fail_on_errors = true       # Exit non-zero when any document failed
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Component, PathBuf};

use super::validate_relative_dir;
use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Build output directory.
    pub output: PathBuf,

    /// Directory holding `<name>.html` templates.
    pub templates: PathBuf,

    /// strftime-style pattern used for formatted date fields.
    pub date_format: String,

    /// Number of posts in the `recent` collection.
    pub recent_posts: usize,

    /// Maximum characters of plain text kept for teasers.
    pub teaser_length: usize,

    /// Generate one page per tag.
    pub tag_pages: bool,

    /// Whether per-document failures make the build exit non-zero.
    pub fail_on_errors: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            output: "_site".into(),
            templates: "templates".into(),
            date_format: "%B %e, %Y".into(),
            recent_posts: 5,
            teaser_length: 200,
            tag_pages: false,
            fail_on_errors: true,
        }
    }
}

impl BuildSectionConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.output.components().all(|c| c == Component::CurDir) {
            diag.error_with_hint(
                FieldPath::new("build.output"),
                "output must be a subdirectory of the site root",
                "the output directory is replaced on every build",
            );
        } else {
            validate_relative_dir(&self.output, FieldPath::new("build.output"), diag);
        }
        validate_relative_dir(&self.templates, FieldPath::new("build.templates"), diag);
        if self.recent_posts == 0 {
            diag.warn(
                FieldPath::new("build.recent_posts"),
                "recent_posts is 0, index.html will list no posts",
            );
        }
        if self.date_format.is_empty() {
            diag.error(FieldPath::new("build.date_format"), "date format is empty");
        }
    }
}
