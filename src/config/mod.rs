//! Site configuration management for `quire.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # One module per table
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # URL path extraction, config file lookup
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section              | Purpose                                        |
//! |----------------------|------------------------------------------------|
//! | `[site]`             | Title, base URL, description, author           |
//! | `[build]`            | Output/template dirs, dates, listings, failures |
//! | `[[content]]`        | Content roots and their template chains        |
//! | `[static]`           | Directories copied verbatim                    |
//! | `[markup]`           | Markdown extensions, literate code settings    |
//! | `[links]`            | Strict/lenient link checking, link style       |
//! | `[feed]`             | RSS feed                                       |
//! | `[template]`         | Field defaults                                 |
//!
//! The loaded config is passed explicitly into every stage.

pub mod section;
pub mod types;
mod util;

use util::{extract_url_path, find_config_file};

pub use section::{
    BuildSectionConfig, ContentRoot, FeedConfig, LinkMode, LinkStyle, LinksConfig, MarkupConfig,
    MarkupExtension, SiteInfoConfig, StaticConfig, TemplateConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing quire.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// URL path prefix derived from `site.url` (internal use only)
    #[serde(skip)]
    pub path_prefix: String,

    pub site: SiteInfoConfig,

    pub build: BuildSectionConfig,

    pub content: Vec<ContentRoot>,

    #[serde(rename = "static")]
    pub statics: StaticConfig,

    pub markup: MarkupConfig,

    pub links: LinksConfig,

    pub feed: FeedConfig,

    pub template: TemplateConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            path_prefix: String::new(),
            site: SiteInfoConfig::default(),
            build: BuildSectionConfig::default(),
            content: vec![ContentRoot::default()],
            statics: StaticConfig::default(),
            markup: MarkupConfig::default(),
            links: LinksConfig::default(),
            feed: FeedConfig::default(),
            template: TemplateConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The site root is the
    /// config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let config_path = find_config_file(&cli.config, &cwd)
            .ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;
        let config_path = crate::utils::path::normalize_path(&config_path);

        let mut config = Self::from_path(&config_path)?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        config.config_path = config_path;
        config.root = root;
        config.apply_command_options(cli);
        config.finalize();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}: {}", display_path, fields.join(", "));
    }

    /// Derived settings that depend on the final field values.
    fn finalize(&mut self) {
        self.path_prefix = self
            .site
            .url
            .as_deref()
            .and_then(extract_url_path)
            .unwrap_or_default();
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
        }
    }

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.build.output, args.output.as_ref());
        if args.strict {
            self.links.mode = LinkMode::Strict;
        }
        if args.lenient {
            self.links.mode = LinkMode::Lenient;
        }
        if args.keep_going {
            self.build.fail_on_errors = false;
        }
        if let Some(url) = &args.site_url {
            self.site.url = Some(url.clone());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // paths
    // ========================================================================

    /// Get the site root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Join a path with the site root.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Absolute output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.root_join(&self.build.output)
    }

    /// Absolute template directory.
    pub fn templates_dir(&self) -> PathBuf {
        self.root_join(&self.build.templates)
    }

    /// Base URL without trailing slash, when configured.
    pub fn base_url(&self) -> Option<&str> {
        self.site.url.as_deref().map(|u| u.trim_end_matches('/'))
    }

    /// Root-relative URL for a site output path, honouring the URL prefix.
    ///
    /// `posts/a.html` -> `/blog/posts/a.html` with prefix `blog`.
    pub fn url_for(&self, output_path: &str) -> String {
        if self.path_prefix.is_empty() {
            format!("/{output_path}")
        } else {
            format!("/{}/{output_path}", self.path_prefix)
        }
    }

    /// URL for an output path in the configured link style.
    pub fn link_for(&self, output_path: &str) -> String {
        match (self.links.style, self.site.url.as_deref()) {
            (LinkStyle::Absolute, Some(_)) => self.absolute_url_for(output_path),
            _ => self.url_for(output_path),
        }
    }

    /// Absolute URL for an output path; falls back to root-relative
    /// when no site URL is set.
    pub fn absolute_url_for(&self, output_path: &str) -> String {
        let Some(url) = self.site.url.as_deref().and_then(|u| url::Url::parse(u).ok()) else {
            return self.url_for(output_path);
        };
        let origin = url.origin().ascii_serialization();
        format!("{origin}{}", self.url_for(output_path))
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting all errors at once.
    pub fn validate(&self) -> Result<()> {
        let diag = self.diagnostics();
        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    fn diagnostics(&self) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();

        self.site.validate(&mut diag);
        self.build.validate(&mut diag);
        self.statics.validate(&mut diag);

        if self.content.is_empty() {
            diag.error_with_hint(
                FieldPath::new("content"),
                "no content roots configured",
                "add a [[content]] table with `dir = \"posts\"`",
            );
        }
        for root in &self.content {
            root.validate(&mut diag);
        }
        self.check_output_overlap(&mut diag);

        if self.links.style == LinkStyle::Absolute && self.site.url.is_none() {
            diag.error_with_hint(
                FieldPath::new("links.style"),
                "absolute links need a site URL",
                "set [site] url or use style = \"root\"",
            );
        }
        if self.feed.enable && self.site.url.is_none() {
            diag.warn(
                FieldPath::new("feed.enable"),
                "feed is enabled but [site] url is not set, skipping feed",
            );
        }

        diag
    }

    /// The output directory is replaced on every build, so it must not
    /// contain or sit inside any directory the build reads from.
    fn check_output_overlap(&self, diag: &mut ConfigDiagnostics) {
        let output = site_relative(&self.build.output);
        if output.as_os_str().is_empty() {
            return;
        }

        let sources = self
            .content
            .iter()
            .map(|root| ("content", &root.dir))
            .chain(self.statics.dirs.iter().map(|dir| ("static", dir)))
            .chain([("templates", &self.build.templates)]);

        for (kind, dir) in sources {
            let dir = site_relative(dir);
            if output.starts_with(&dir) || dir.starts_with(&output) {
                diag.error_with_hint(
                    FieldPath::new("build.output"),
                    format!(
                        "output `{}` overlaps {kind} directory `{}`",
                        output.display(),
                        dir.display()
                    ),
                    "the output directory is replaced on every build, pick a separate one",
                );
            }
        }
    }
}

/// Path relative to the site root with `.` segments dropped.
fn site_relative(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config text, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (mut parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed.finalize();
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.output, PathBuf::from("_site"));
        assert_eq!(config.build.templates, PathBuf::from("templates"));
        assert_eq!(config.build.recent_posts, 5);
        assert!(config.build.fail_on_errors);
        assert_eq!(config.content.len(), 1);
        assert_eq!(config.content[0].templates, vec!["post", "default"]);
        assert_eq!(config.links.mode, LinkMode::Strict);
        assert_eq!(config.links.style, LinkStyle::Root);
        assert!(config.markup.extensions.contains(&MarkupExtension::Literate));
    }

    #[test]
    fn test_full_config() {
        let config = test_parse_config(
            r#"
[site]
title = "Advent"
url = "https://example.com/blog/"

[build]
output = "public"
recent_posts = 3
tag_pages = true

[[content]]
dir = "posts"
templates = ["post", "default"]

[[content]]
dir = "pages"
templates = ["default"]
listed = false

[static]
dirs = ["images", "css"]

[markup]
extensions = ["footnotes", "smart-punctuation"]

[links]
mode = "lenient"
style = "absolute"

[feed]
enable = true

[template.defaults]
author = "Anonymous"
"#,
        );
        assert_eq!(config.site.title, "Advent");
        assert_eq!(config.path_prefix, "blog");
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.content.len(), 2);
        assert!(!config.content[1].listed);
        assert_eq!(config.content[1].extensions, vec!["md", "markdown", "lhs"]);
        assert_eq!(config.statics.dirs.len(), 2);
        assert_eq!(
            config.markup.extensions,
            vec![MarkupExtension::Footnotes, MarkupExtension::SmartPunctuation]
        );
        assert_eq!(config.links.mode, LinkMode::Lenient);
        assert_eq!(config.template.defaults.get("author").map(String::as_str), Some("Anonymous"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[site]\ntitle = \"Test\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
        assert_eq!(config.site.title, "Test");
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(SiteConfig::parse_with_ignored("[site\ntitle = 1").is_err());
    }

    #[test]
    fn test_absolute_links_need_url() {
        let config = test_parse_config("[links]\nstyle = \"absolute\"");
        assert!(config.diagnostics().has_errors());
    }

    #[test]
    fn test_output_cannot_be_root() {
        let config = test_parse_config("[build]\noutput = \".\"");
        assert!(config.diagnostics().has_errors());
    }

    #[test]
    fn test_output_must_stay_inside_root() {
        for output in ["..", "../public", "/tmp/site", "public/../.."] {
            let config = test_parse_config(&format!("[build]\noutput = \"{output}\""));
            assert!(config.diagnostics().has_errors(), "{output}");
        }
    }

    #[test]
    fn test_output_must_not_overlap_sources() {
        for output in ["posts", "./posts", "posts/out", "templates", "images", "images/x"] {
            let config = test_parse_config(&format!(
                "[build]\noutput = \"{output}\"\n[static]\ndirs = [\"images\"]"
            ));
            assert!(config.diagnostics().has_errors(), "{output}");
        }

        let config = test_parse_config("[build]\noutput = \"site\"\n[[content]]\ndir = \"site/posts\"");
        assert!(config.diagnostics().has_errors());

        let config = test_parse_config("[build]\noutput = \"posts-out\"");
        assert!(!config.diagnostics().has_errors());
    }

    #[test]
    fn test_cli_output_override_is_checked() {
        let cli = Cli::try_parse_from(["quire", "build", "-o", "posts"]).unwrap();
        let mut config = test_parse_config("");
        assert!(!config.diagnostics().has_errors());
        config.apply_command_options(&cli);
        config.finalize();
        assert!(config.diagnostics().has_errors());
    }

    #[test]
    fn test_urls_with_prefix() {
        let config = test_parse_config("[site]\nurl = \"https://example.com/blog\"");
        assert_eq!(config.url_for("posts/a.html"), "/blog/posts/a.html");
        assert_eq!(
            config.absolute_url_for("posts/a.html"),
            "https://example.com/blog/posts/a.html"
        );
        assert_eq!(config.link_for("a.html"), "/blog/a.html");

        let config = test_parse_config("");
        assert_eq!(config.url_for("index.html"), "/index.html");
        assert_eq!(config.absolute_url_for("index.html"), "/index.html");
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "quire", "build", "--lenient", "-k", "-o", "public", "-U", "https://x.org/sub",
        ])
        .unwrap();
        let mut config = test_parse_config("");
        config.apply_command_options(&cli);
        config.finalize();
        assert_eq!(config.links.mode, LinkMode::Lenient);
        assert!(!config.build.fail_on_errors);
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.path_prefix, "sub");
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("quire.toml");
        fs::write(&path, "[site]\ntitle = \"Disk\"").unwrap();
        let config = SiteConfig::from_path(&path).unwrap();
        assert_eq!(config.site.title, "Disk");

        assert!(SiteConfig::from_path(&dir.path().join("missing.toml")).is_err());
    }
}
