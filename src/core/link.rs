//! Link classification utilities.

use crate::utils::path::is_external_link;

/// Syntactic classification of links found in rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind<'a> {
    /// External link with URL scheme (https://, mailto:, //host, etc.)
    External(&'a str),
    /// Pure fragment/anchor or query link (`#section`, `?page=2`).
    Local(&'a str),
    /// Site-root-relative path (`/css/site.css`).
    SiteRoot(&'a str),
    /// File-relative path (`./b.md`, `../images/x.png`).
    FileRelative(&'a str),
}

impl<'a> LinkKind<'a> {
    /// Parse a link string into its syntactic kind.
    #[inline]
    pub fn parse(link: &'a str) -> Self {
        if is_external_link(link) {
            Self::External(link)
        } else if link.is_empty() || link.starts_with(['#', '?']) {
            Self::Local(link)
        } else if link.starts_with('/') {
            Self::SiteRoot(link)
        } else {
            Self::FileRelative(link)
        }
    }

    /// Whether the link points into the built site.
    #[inline]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::SiteRoot(_) | Self::FileRelative(_))
    }
}
