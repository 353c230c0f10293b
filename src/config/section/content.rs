//! `[[content]]` and `[static]` configuration.
//!
//! ```toml
//! [[content]]
//! dir = "posts"
//! extensions = ["md", "lhs"]
//! templates = ["post", "default"]
//! listed = true
//!
//! [[content]]
//! dir = "pages"
//! templates = ["default"]
//! listed = false
//!
//! [static]
//! dirs = ["images", "css"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::config::{ConfigDiagnostics, FieldPath};

/// One content root: every file under `dir` with a matching extension
/// becomes a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentRoot {
    /// Directory relative to the site root.
    pub dir: PathBuf,

    /// File extensions (without dot) treated as documents.
    pub extensions: Vec<String>,

    /// Template chain, innermost first. Each template's output becomes
    /// `$body$` for the next.
    pub templates: Vec<String>,

    /// Whether documents appear in collections (archive, index, feed).
    pub listed: bool,
}

impl Default for ContentRoot {
    fn default() -> Self {
        Self {
            dir: "posts".into(),
            extensions: vec!["md".into(), "markdown".into(), "lhs".into()],
            templates: vec!["post".into(), "default".into()],
            listed: true,
        }
    }
}

impl ContentRoot {
    /// Whether `path` has one of this root's extensions.
    pub fn matches(&self, path: &Path) -> bool {
        crate::utils::path::extension_of(path)
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        validate_relative_dir(&self.dir, FieldPath::new("content.dir"), diag);
        if self.extensions.is_empty() {
            diag.error(
                FieldPath::new("content.extensions"),
                format!("content root `{}` matches no extensions", self.dir.display()),
            );
        }
        if self.templates.is_empty() {
            diag.error_with_hint(
                FieldPath::new("content.templates"),
                format!("content root `{}` has no templates", self.dir.display()),
                "use at least [\"default\"]",
            );
        }
    }
}

/// Directories copied verbatim into the output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    pub dirs: Vec<PathBuf>,
}

impl StaticConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for dir in &self.dirs {
            validate_relative_dir(dir, FieldPath::new("static.dirs"), diag);
        }
    }
}

/// Directories must live inside the site root so that site paths stay
/// meaningful.
pub(crate) fn validate_relative_dir(dir: &Path, field: FieldPath, diag: &mut ConfigDiagnostics) {
    let escapes = dir
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if dir.as_os_str().is_empty() || escapes {
        diag.error_with_hint(
            field,
            format!("`{}` must be a relative path inside the site root", dir.display()),
            "remove leading `/` and `..` segments",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_extension() {
        let root = ContentRoot::default();
        assert!(root.matches(Path::new("posts/a.md")));
        assert!(root.matches(Path::new("posts/a.LHS")));
        assert!(!root.matches(Path::new("posts/a.png")));
        assert!(!root.matches(Path::new("posts/README")));
    }

    #[test]
    fn test_rejects_escaping_dirs() {
        let mut diag = ConfigDiagnostics::new();
        let root = ContentRoot {
            dir: "../elsewhere".into(),
            ..Default::default()
        };
        root.validate(&mut diag);
        assert!(diag.has_errors());

        let mut diag = ConfigDiagnostics::new();
        let statics = StaticConfig {
            dirs: vec!["images".into(), "./css".into()],
        };
        statics.validate(&mut diag);
        assert!(!diag.has_errors());
    }
}
