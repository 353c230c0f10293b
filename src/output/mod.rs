//! Output writing.
//!
//! Files are written into a staging directory beside the output
//! (`_site` → `._site.staging`). Once the build is done the staging tree is
//! swapped into place, so a reader never sees a half-written site. A build
//! with fatal errors drops the [`Staging`] before committing, which removes
//! the staging tree and leaves the previous output alone.

use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::{BuildError, Failure};

/// One file of the final site.
#[derive(Debug, Clone)]
pub enum OutputFile {
    Page { path: String, html: String },
    Asset { path: String, source: PathBuf },
}

impl OutputFile {
    /// Output path relative to the output root.
    pub fn path(&self) -> &str {
        match self {
            Self::Page { path, .. } | Self::Asset { path, .. } => path,
        }
    }

    pub fn is_page(&self) -> bool {
        matches!(self, Self::Page { .. })
    }
}

/// A staging directory that becomes the output on [`commit`](Self::commit).
#[derive(Debug)]
pub struct Staging {
    output: PathBuf,
    staging: PathBuf,
    finished: bool,
}

impl Staging {
    /// Create an empty staging directory for `output`.
    pub fn create(output: &Path) -> Result<Self, BuildError> {
        let staging = sibling(output, "staging");
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| BuildError::io(&staging, e))?;
        }
        fs::create_dir_all(&staging).map_err(|e| BuildError::io(&staging, e))?;
        crate::debug!("output"; "staging into {}", staging.display());

        Ok(Self {
            output: output.to_path_buf(),
            staging,
            finished: false,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.staging
    }

    /// Write one file, creating parent directories as needed.
    pub fn write(&self, file: &OutputFile) -> Result<(), BuildError> {
        let dest = self.staging.join(file.path());
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        match file {
            OutputFile::Page { html, .. } => fs::write(&dest, html),
            OutputFile::Asset { source, .. } => fs::copy(source, &dest).map(drop),
        }
        .map_err(|e| BuildError::io(&dest, e))
    }

    /// Write all files in parallel. A failing file does not stop the
    /// others; each failure is returned.
    pub fn write_all<F>(&self, files: &[OutputFile], on_written: F) -> Vec<Failure>
    where
        F: Fn(&OutputFile) + Sync,
    {
        let mut failures: Vec<Failure> = files
            .par_iter()
            .filter_map(|file| {
                let result = self.write(file);
                on_written(file);
                result.err().map(|e| Failure::new(file.path(), e))
            })
            .collect();
        failures.sort_by(|a, b| a.path.cmp(&b.path));
        failures
    }

    /// Replace the output directory with the staged tree.
    pub fn commit(mut self) -> Result<(), BuildError> {
        self.finished = true;
        let previous = sibling(&self.output, "old");

        if previous.exists() {
            fs::remove_dir_all(&previous).map_err(|e| BuildError::io(&previous, e))?;
        }
        let had_output = self.output.exists();
        if had_output {
            fs::rename(&self.output, &previous).map_err(|e| BuildError::io(&self.output, e))?;
        }

        if let Err(e) = fs::rename(&self.staging, &self.output) {
            if had_output {
                fs::rename(&previous, &self.output).ok();
            }
            fs::remove_dir_all(&self.staging).ok();
            return Err(BuildError::io(&self.output, e));
        }

        if had_output {
            fs::remove_dir_all(&previous).map_err(|e| BuildError::io(&previous, e))?;
        }
        Ok(())
    }

}

impl Drop for Staging {
    fn drop(&mut self) {
        if !self.finished {
            remove_quietly(&self.staging);
        }
    }
}

fn remove_quietly(dir: &Path) {
    if let Err(e) = fs::remove_dir_all(dir)
        && e.kind() != io::ErrorKind::NotFound
    {
        crate::log!("warning"; "could not remove {}: {}", dir.display(), e);
    }
}

/// `<parent>/.<name>.<suffix>`
fn sibling(output: &Path, suffix: &str) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "site".into());
    let parent = output.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!(".{name}.{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn page(path: &str, html: &str) -> OutputFile {
        OutputFile::Page {
            path: path.into(),
            html: html.into(),
        }
    }

    #[test]
    fn test_commit_replaces_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("_site");
        fs::create_dir_all(output.join("stale")).unwrap();
        fs::write(output.join("stale/old.html"), "old").unwrap();

        let source = dir.path().join("cat.png");
        fs::write(&source, [1u8, 2, 3]).unwrap();

        let staging = Staging::create(&output).unwrap();
        let files = vec![
            page("index.html", "<p>home</p>"),
            page("posts/deep/a.html", "a"),
            OutputFile::Asset {
                path: "images/cat.png".into(),
                source,
            },
        ];
        assert!(staging.write_all(&files, |_| {}).is_empty());
        staging.commit().unwrap();

        assert_eq!(fs::read_to_string(output.join("index.html")).unwrap(), "<p>home</p>");
        assert_eq!(fs::read_to_string(output.join("posts/deep/a.html")).unwrap(), "a");
        assert_eq!(fs::read(output.join("images/cat.png")).unwrap(), vec![1, 2, 3]);
        assert!(!output.join("stale").exists());
        assert!(!dir.path().join("._site.staging").exists());
        assert!(!dir.path().join("._site.old").exists());
    }

    #[test]
    fn test_failed_file_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("_site");
        let staging = Staging::create(&output).unwrap();

        let files = vec![
            page("a.html", "a"),
            OutputFile::Asset {
                path: "missing.png".into(),
                source: dir.path().join("does-not-exist.png"),
            },
            page("b.html", "b"),
        ];
        let failures = staging.write_all(&files, |_| {});
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, "missing.png");
        assert_eq!(failures[0].kind(), crate::core::ErrorKind::Io);
        assert!(staging.dir().join("a.html").exists());
        assert!(staging.dir().join("b.html").exists());
    }

    #[test]
    fn test_uncommitted_keeps_previous_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("_site");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("index.html"), "previous").unwrap();

        let staging = Staging::create(&output).unwrap();
        staging.write(&page("index.html", "next")).unwrap();
        let staged = staging.dir().to_path_buf();
        drop(staging);

        assert!(!staged.exists());
        assert_eq!(fs::read_to_string(output.join("index.html")).unwrap(), "previous");
    }

    #[test]
    fn test_drop_cleans_up() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("_site");
        let staged = {
            let staging = Staging::create(&output).unwrap();
            staging.dir().to_path_buf()
        };
        assert!(!staged.exists());
        assert!(!output.exists());
    }
}
