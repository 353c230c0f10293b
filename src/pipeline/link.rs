//! Link rewriting over rendered pages.
//!
//! Only `a[href]`, `img[src]`, `link[href]` and `script[src]` are links;
//! text that merely looks like an attribute (code samples) is left alone.
//! Every link is classified with [`LinkKind`]:
//!
//! | LinkKind       | Example              | Result                          |
//! |----------------|----------------------|---------------------------------|
//! | `External`     | `https://...`        | Preserved as-is                 |
//! | `Local`        | `#section`           | Preserved as-is                 |
//! | `SiteRoot`     | `/posts/a.md`        | Looked up from the site root    |
//! | `FileRelative` | `../images/x.png`    | Looked up from the page's dir   |
//!
//! Internal links are looked up in the [`PathMap`], first as a source path
//! then as an output path, and written back in the configured style.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use rustc_hash::{FxHashMap, FxHashSet};
use std::borrow::Cow;
use std::ops::Range;

use crate::config::SiteConfig;
use crate::core::LinkKind;
use crate::utils::html::{escape, unescape};
use crate::utils::path::{join_site_path, split_link_suffix};

/// Characters escaped when writing an output path into a URL.
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Percent-encode an output path for use in a URL.
pub fn encode_path(output: &str) -> String {
    utf8_percent_encode(output, PATH_ESCAPE).to_string()
}

// =============================================================================
// PathMap
// =============================================================================

/// Source path → output path for every document, plus every output path
/// the build produces.
///
/// Filled before rewriting starts. Strict builds remove the outputs of
/// dropped pages between rewriting passes.
#[derive(Debug, Default, Clone)]
pub struct PathMap {
    sources: FxHashMap<String, String>,
    outputs: FxHashSet<String>,
}

impl PathMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document. Returns `false` if its output path is
    /// already taken; the map is left unchanged in that case.
    pub fn insert_source(&mut self, source: impl Into<String>, output: impl Into<String>) -> bool {
        let output = output.into();
        if self.outputs.contains(&output) {
            return false;
        }
        self.outputs.insert(output.clone());
        self.sources.insert(source.into(), output);
        true
    }

    /// Register an output with no source document (assets, synthetic
    /// pages, the feed). Returns `false` if already present.
    pub fn insert_output(&mut self, output: impl Into<String>) -> bool {
        self.outputs.insert(output.into())
    }

    /// Forget an output and the document that produced it.
    pub fn remove_output(&mut self, output: &str) {
        self.outputs.remove(output);
        self.sources.retain(|_, out| out != output);
    }

    /// Output path for a site path, trying it as a source, then as an
    /// output. Directory paths resolve to their `index.html`.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        if path.is_empty() || path.ends_with('/') {
            let index = format!("{path}index.html");
            return self.outputs.get(index.as_str()).map(String::as_str);
        }
        self.sources
            .get(path)
            .or_else(|| self.outputs.get(path))
            .map(String::as_str)
    }
}

// =============================================================================
// Rewriter
// =============================================================================

/// Result of rewriting one page.
#[derive(Debug, Default)]
pub struct Rewritten {
    pub html: String,
    /// Internal links that resolve to nothing, as written. They are left
    /// unchanged in `html`.
    pub broken: Vec<String>,
}

pub struct LinkRewriter<'a> {
    map: &'a PathMap,
    config: &'a SiteConfig,
}

/// Elements whose attribute is a link, with that attribute.
const LINK_ATTRS: [(&str, &str); 4] = [
    ("a", "href"),
    ("img", "src"),
    ("link", "href"),
    ("script", "src"),
];

/// Byte ranges of every link attribute value in `html`, in document order.
///
/// Values are located by parsing with `tl` and mapped back onto the input,
/// so everything outside them is kept byte for byte.
pub(crate) fn link_ranges(html: &str) -> Vec<Range<usize>> {
    let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
        return Vec::new();
    };

    let base = html.as_ptr() as usize;
    let mut ranges: Vec<Range<usize>> = dom
        .nodes()
        .iter()
        .filter_map(tl::Node::as_tag)
        .filter_map(|tag| {
            let name = tag.name().as_utf8_str();
            let (_, attr) = LINK_ATTRS
                .iter()
                .find(|(element, _)| name.eq_ignore_ascii_case(element))?;
            let value = tag.attributes().get(*attr)??.as_bytes();
            let start = (value.as_ptr() as usize).checked_sub(base)?;
            let range = start..start + value.len();
            // tl borrows from the input; anything else is not ours to splice
            (html.get(range.clone())?.as_bytes() == value).then_some(range)
        })
        .collect();

    ranges.sort_by_key(|range| range.start);
    ranges
}

impl<'a> LinkRewriter<'a> {
    pub fn new(map: &'a PathMap, config: &'a SiteConfig) -> Self {
        Self { map, config }
    }

    /// Rewrite all internal links of `html`. `base_dir` is the site
    /// directory relative links resolve against.
    pub fn rewrite(&self, html: &str, base_dir: &str) -> Rewritten {
        let mut out = String::with_capacity(html.len());
        let mut broken = Vec::new();
        let mut last = 0;

        for range in link_ranges(html) {
            let link = unescape(&html[range.clone()]);
            match self.resolve_link(&link, base_dir) {
                Resolution::Keep => {}
                Resolution::Broken => broken.push(link.into_owned()),
                Resolution::Rewritten(url) => {
                    out.push_str(&html[last..range.start]);
                    out.push_str(&escape(&url));
                    last = range.end;
                }
            }
        }
        out.push_str(&html[last..]);

        Rewritten { html: out, broken }
    }

    fn resolve_link(&self, link: &str, base_dir: &str) -> Resolution {
        let link = link.trim();
        let kind = LinkKind::parse(link);
        if !kind.is_internal() {
            return Resolution::Keep;
        }

        let (path, suffix) = split_link_suffix(link);
        let decoded: Cow<'_, str> = percent_decode_str(path).decode_utf8_lossy();

        let Some(site_path) = join_site_path(base_dir, &decoded) else {
            return Resolution::Broken;
        };
        // Keep the trailing slash so directory links find their index.
        let site_path = if decoded.ends_with('/') && !site_path.is_empty() {
            format!("{site_path}/")
        } else {
            site_path
        };

        match self.map.resolve(&site_path) {
            Some(output) => {
                let url = self.config.link_for(&encode_path(output));
                Resolution::Rewritten(format!("{url}{suffix}"))
            }
            None => Resolution::Broken,
        }
    }
}

enum Resolution {
    Keep,
    Broken,
    Rewritten(String),
}
