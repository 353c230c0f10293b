//! Document discovery and loading.
//!
//! Content roots yield [`Document`]s, static roots yield [`Asset`]s. All
//! paths handed to later stages are site paths: `/`-separated and relative
//! to the site root.

mod meta;

pub use meta::{Metadata, split_front_matter};

use jwalk::WalkDir;
use rustc_hash::FxHashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{ContentRoot, SiteConfig};
use crate::core::BuildError;
use crate::utils::path::{to_site_path, with_html_extension};

/// OS junk that never becomes content or an asset.
const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// A source file matched by a content root, not read yet.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Site path, e.g. `posts/2020-12-07-x.md`.
    pub path: String,
    /// Absolute path on disk.
    pub abs: PathBuf,
    /// Index into `config.content`.
    pub root: usize,
}

/// A loaded document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Site path of the source file (identity).
    pub path: String,
    /// Output path, relative to the output root.
    pub output: String,
    pub meta: Metadata,
    /// Raw markup after the header block.
    pub body: String,
    /// Template chain for this document, innermost first.
    pub templates: Vec<String>,
    /// Whether the document takes part in collections.
    pub listed: bool,
    /// Rendered HTML fragment; `None` until the renderer runs.
    pub rendered: Option<String>,
}

impl Document {
    /// Build a document from file content.
    pub fn parse(path: String, content: &str, root: &ContentRoot) -> Result<Self, BuildError> {
        let (meta, body) = split_front_matter(content)?;

        let mut templates = root.templates.clone();
        if let (Some(first), Some(name)) = (templates.first_mut(), meta.template()) {
            *first = name.to_string();
        }

        Ok(Self {
            output: with_html_extension(&path),
            path,
            body: body.to_string(),
            meta,
            templates,
            listed: root.listed,
            rendered: None,
        })
    }

    /// Extension of the source file, lowercased.
    pub fn extension(&self) -> Option<String> {
        crate::utils::path::extension_of(Path::new(&self.path))
    }
}

/// A static file copied verbatim.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Site path; also the output path.
    pub path: String,
    pub abs: PathBuf,
}

// ============================================================================
// discovery
// ============================================================================

/// Collect all files under `dir`, sorted, skipping hidden files and junk.
fn collect_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort(true)
        .skip_hidden(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.path())
        .collect()
}

fn site_path(config: &SiteConfig, abs: &Path) -> String {
    to_site_path(abs.strip_prefix(config.get_root()).unwrap_or(abs))
}

fn require_dir(config: &SiteConfig, dir: &Path) -> Result<PathBuf, BuildError> {
    let abs = config.root_join(dir);
    if abs.is_dir() {
        Ok(abs)
    } else {
        Err(BuildError::NotFound(dir.to_path_buf()))
    }
}

/// Find every document under the configured content roots.
///
/// A missing root is fatal. A file matched by several roots belongs to
/// the first. The result is sorted by site path.
pub fn discover(config: &SiteConfig) -> Result<Vec<SourceFile>, BuildError> {
    let mut seen = FxHashSet::default();
    let mut files = Vec::new();

    for (index, root) in config.content.iter().enumerate() {
        let dir = require_dir(config, &root.dir)?;
        for abs in collect_files(&dir) {
            if !root.matches(&abs) {
                continue;
            }
            let path = site_path(config, &abs);
            if seen.insert(path.clone()) {
                files.push(SourceFile {
                    path,
                    abs,
                    root: index,
                });
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Find every file under the configured static roots.
pub fn discover_assets(config: &SiteConfig) -> Result<Vec<Asset>, BuildError> {
    let mut assets = Vec::new();
    for dir in &config.statics.dirs {
        let dir = require_dir(config, dir)?;
        assets.extend(collect_files(&dir).into_iter().map(|abs| Asset {
            path: site_path(config, &abs),
            abs,
        }));
    }
    assets.sort_by(|a, b| a.path.cmp(&b.path));
    assets.dedup_by(|a, b| a.path == b.path);
    Ok(assets)
}

/// Read and parse one source file.
///
/// Returns `Ok(None)` for drafts.
pub fn load(file: &SourceFile, config: &SiteConfig) -> Result<Option<Document>, BuildError> {
    let bytes = fs::read(&file.abs).map_err(|e| BuildError::io(&file.abs, e))?;
    let content = String::from_utf8(bytes)
        .map_err(|e| BuildError::io(&file.abs, io::Error::new(io::ErrorKind::InvalidData, e)))?;

    let root = &config.content[file.root];
    let doc = Document::parse(file.path.clone(), &content, root)?;
    if doc.meta.is_draft() {
        crate::debug!("source"; "skipping draft {}", doc.path);
        return Ok(None);
    }
    Ok(Some(doc))
}
