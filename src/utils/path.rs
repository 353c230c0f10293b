//! Path and URL utilities.
//!
//! Pure functions, no filesystem access except `normalize_path`.
//!
//! Site paths (`posts/2020-12-07-x.md`) are always `/`-separated and
//! relative to the site root, independent of the host platform.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first, then falls back to joining with the
/// current directory.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Check if a link is external (has a URL scheme like `http:`, `mailto:`,
/// or is protocol-relative `//host/...`).
///
/// A valid scheme has at least 1 character before the colon and only
/// contains ASCII alphanumeric or `+`, `-`, `.`
#[inline]
pub fn is_external_link(link: &str) -> bool {
    if link.starts_with("//") {
        return true;
    }
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Split a link into `(path, suffix)` where suffix is the query and/or
/// fragment including its leading `?` or `#`.
///
/// ```ignore
/// assert_eq!(split_link_suffix("a.md?x=1#top"), ("a.md", "?x=1#top"));
/// ```
#[inline]
pub fn split_link_suffix(link: &str) -> (&str, &str) {
    match link.find(['?', '#']) {
        Some(pos) => link.split_at(pos),
        None => (link, ""),
    }
}

/// Render a relative path as a `/`-separated site path.
pub fn to_site_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}

/// Directory part of a site path (`posts/a.md` -> `posts`, `a.md` -> ``).
#[inline]
pub fn site_parent(path: &str) -> &str {
    path.rfind('/').map_or("", |pos| &path[..pos])
}

/// Resolve `link` against site directory `base`, collapsing `.` and `..`.
///
/// Returns `None` when the link climbs above the site root.
pub fn join_site_path(base: &str, link: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();

    let start = if let Some(rooted) = link.strip_prefix('/') {
        rooted
    } else {
        parts.extend(base.split('/').filter(|s| !s.is_empty()));
        link
    };

    for segment in start.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            s => parts.push(s),
        }
    }

    Some(parts.join("/"))
}

/// Replace the extension of a site path with `.html`.
///
/// ```ignore
/// assert_eq!(with_html_extension("posts/a.md"), "posts/a.html");
/// ```
pub fn with_html_extension(path: &str) -> String {
    let file_start = path.rfind('/').map_or(0, |pos| pos + 1);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => format!("{}.html", &path[..file_start + dot]),
        _ => format!("{path}.html"),
    }
}

/// File extension of a site path, lowercased.
#[inline]
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_external_link() {
        assert!(is_external_link("https://example.com"));
        assert!(is_external_link("mailto:user@example.com"));
        assert!(is_external_link("//cdn.example.com/x.js"));
        assert!(!is_external_link("/about"));
        assert!(!is_external_link("./file.txt"));
        assert!(!is_external_link("#section"));
        assert!(!is_external_link(":weird"));
    }

    #[test]
    fn test_split_link_suffix() {
        assert_eq!(split_link_suffix("a.md#top"), ("a.md", "#top"));
        assert_eq!(split_link_suffix("a.md?x=1#top"), ("a.md", "?x=1#top"));
        assert_eq!(split_link_suffix("a.md"), ("a.md", ""));
        assert_eq!(split_link_suffix("#top"), ("", "#top"));
    }

    #[test]
    fn test_to_site_path() {
        assert_eq!(to_site_path(Path::new("posts/a.md")), "posts/a.md");
        assert_eq!(to_site_path(Path::new("./posts/a.md")), "posts/a.md");
        assert_eq!(to_site_path(Path::new("a.md")), "a.md");
    }

    #[test]
    fn test_site_parent() {
        assert_eq!(site_parent("posts/2020/a.md"), "posts/2020");
        assert_eq!(site_parent("a.md"), "");
    }

    #[test]
    fn test_join_site_path() {
        assert_eq!(join_site_path("posts", "b.md").as_deref(), Some("posts/b.md"));
        assert_eq!(
            join_site_path("posts", "../images/x.png").as_deref(),
            Some("images/x.png")
        );
        assert_eq!(join_site_path("posts", "./b.md").as_deref(), Some("posts/b.md"));
        assert_eq!(join_site_path("posts", "/css/a.css").as_deref(), Some("css/a.css"));
        assert_eq!(join_site_path("", "a.md").as_deref(), Some("a.md"));
        assert_eq!(join_site_path("posts", "../../x"), None);
    }

    #[test]
    fn test_with_html_extension() {
        assert_eq!(with_html_extension("posts/a.md"), "posts/a.html");
        assert_eq!(with_html_extension("posts/a.lhs"), "posts/a.html");
        assert_eq!(with_html_extension("posts/v1.2/readme"), "posts/v1.2/readme.html");
        assert_eq!(with_html_extension(".hidden"), ".hidden.html");
    }
}
