//! `[markup]` section configuration.
//!
//! ```toml
//! [markup]
//! extensions = ["footnotes", "tables", "strikethrough", "literate"]
//! literate_extensions = ["lhs"]
//! literate_language = "haskell"
//! ```

use serde::{Deserialize, Serialize};

/// Optional Markdown syntax extensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum MarkupExtension {
    Tables,
    Footnotes,
    Strikethrough,
    Tasklists,
    SmartPunctuation,
    HeadingAttributes,
    /// Bird-track and `\begin{code}` regions become code blocks.
    Literate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    pub extensions: Vec<MarkupExtension>,

    /// Source extensions whose documents are read as literate programs.
    pub literate_extensions: Vec<String>,

    /// Language tag given to literate code blocks.
    pub literate_language: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            extensions: vec![
                MarkupExtension::Footnotes,
                MarkupExtension::Tables,
                MarkupExtension::Strikethrough,
                MarkupExtension::Literate,
            ],
            literate_extensions: vec!["lhs".into()],
            literate_language: "haskell".into(),
        }
    }
}
