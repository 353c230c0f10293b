//! Build error taxonomy.
//!
//! Every stage reports problems as [`BuildError`]. Errors that concern a
//! single document are wrapped in a [`Failure`] and collected; the build
//! keeps going and reports them at the end.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while building the site.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("`{}` does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("front matter line {line}: {reason}")]
    MalformedMetadata { line: usize, reason: String },

    #[error("template `{0}` does not exist")]
    MissingTemplate(String),

    #[error("template `{template}` uses `${field}$` but it is not set and has no default")]
    MissingField { template: String, field: String },

    #[error("template `{name}` line {line}: {reason}")]
    TemplateSyntax {
        name: String,
        line: usize,
        reason: String,
    },

    #[error("`{link}` does not resolve to any page or asset")]
    BrokenLink { link: String },

    #[error("`{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::MalformedMetadata { .. } => ErrorKind::MalformedMetadata,
            Self::MissingTemplate(_) => ErrorKind::MissingTemplate,
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::TemplateSyntax { .. } => ErrorKind::TemplateSyntax,
            Self::BrokenLink { .. } => ErrorKind::BrokenLink,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Error kind as shown in the failure report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    NotFound,
    MalformedMetadata,
    MissingTemplate,
    MissingField,
    TemplateSyntax,
    BrokenLink,
    Io,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NotFoundError",
            Self::MalformedMetadata => "MalformedMetadataError",
            Self::MissingTemplate => "MissingTemplateError",
            Self::MissingField => "MissingFieldError",
            Self::TemplateSyntax => "TemplateSyntaxError",
            Self::BrokenLink => "BrokenLinkError",
            Self::Io => "IOError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-document (or per-file) failure, keyed by site path.
#[derive(Debug)]
pub struct Failure {
    /// Site path of the source document, or the output path for write errors.
    pub path: String,
    pub error: BuildError,
}

impl Failure {
    pub fn new(path: impl Into<String>, error: BuildError) -> Self {
        Self {
            path: path.into(),
            error,
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.path, self.kind(), self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        let failure = Failure::new(
            "posts/bad.md",
            BuildError::MalformedMetadata {
                line: 3,
                reason: "expected `key: value`".into(),
            },
        );
        assert_eq!(
            failure.to_string(),
            "posts/bad.md: MalformedMetadataError: front matter line 3: expected `key: value`"
        );
    }

    #[test]
    fn test_missing_field_display() {
        let err = BuildError::MissingField {
            template: "post".into(),
            field: "author".into(),
        };
        assert_eq!(err.kind(), ErrorKind::MissingField);
        assert!(err.to_string().contains("$author$"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error;

        let err = BuildError::io(
            "_site/a.html",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind().as_str(), "IOError");
        assert!(err.to_string().contains("_site/a.html"));
        assert!(err.source().is_some());
    }
}
