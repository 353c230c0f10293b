//! Site graph: collections over all rendered documents, and the synthetic
//! pages built from them.
//!
//! Runs once every regular document has been rendered. Listing entries are
//! [`Summary`] values captured at render time, so nothing is rendered
//! twice.

mod context;

pub use context::{document_context, list_value, root_url, site_context, tag_output};

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::SiteConfig;
use crate::core::{BuildError, Failure};
use crate::source::Document;
use crate::template::{Context, TemplateSet};
use crate::utils::date::DateTimeUtc;
use crate::utils::slug::slugify;

pub const ARCHIVE_CHAIN: &[&str] = &["archive", "default"];
pub const INDEX_CHAIN: &[&str] = &["index", "default"];
pub const TAG_CHAIN: &[&str] = &["tag", "default"];

/// What listings need to know about a rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Source site path.
    pub path: String,
    /// Output path.
    pub output: String,
    pub title: Option<String>,
    pub published: Option<DateTimeUtc>,
    pub last: Option<DateTimeUtc>,
    pub tags: Vec<String>,
    /// `author` from the document header, if any.
    pub author: Option<String>,
    pub teaser: String,
    pub listed: bool,
}

impl Summary {
    pub fn new(doc: &Document, teaser: String) -> Self {
        Self {
            path: doc.path.clone(),
            output: doc.output.clone(),
            title: doc.meta.title().map(str::to_string),
            published: doc.meta.published(),
            last: doc.meta.last(),
            tags: doc.meta.tags().into_iter().map(str::to_string).collect(),
            author: doc.meta.get("author").map(str::to_string),
            teaser,
            listed: doc.listed,
        }
    }

    /// Check the fields listings depend on.
    ///
    /// A listed, dated document without a title cannot appear in a
    /// listing.
    pub fn check_listable(&self) -> Result<(), BuildError> {
        if self.listed && self.published.is_some() && self.title.is_none() {
            return Err(BuildError::MissingField {
                template: ARCHIVE_CHAIN[0].to_string(),
                field: "title".into(),
            });
        }
        Ok(())
    }

    fn is_listable(&self) -> bool {
        self.listed && self.published.is_some() && self.title.is_some()
    }
}

/// Newest first; equal dates by path ascending.
fn by_date_desc(a: &Summary, b: &Summary) -> Ordering {
    b.published
        .cmp(&a.published)
        .then_with(|| a.path.cmp(&b.path))
}

/// Posts sharing one tag.
#[derive(Debug, Clone)]
pub struct TagCollection<'a> {
    /// Display name, as first seen in date order.
    pub name: String,
    pub slug: String,
    pub posts: Vec<&'a Summary>,
}

/// All collections of one build.
#[derive(Debug, Clone)]
pub struct Collections<'a> {
    /// Listed documents with a usable `published` date, newest first.
    pub posts: Vec<&'a Summary>,
    /// Prefix of `posts`.
    pub recent: Vec<&'a Summary>,
    /// Keyed by slug.
    pub tags: BTreeMap<String, TagCollection<'a>>,
}

impl<'a> Collections<'a> {
    pub fn build(summaries: &'a [Summary], recent_posts: usize) -> Self {
        let mut posts: Vec<&Summary> = summaries.iter().filter(|s| s.is_listable()).collect();
        posts.sort_by(|a, b| by_date_desc(a, b));

        let recent = posts.iter().take(recent_posts).copied().collect();

        let mut tags: BTreeMap<String, TagCollection<'a>> = BTreeMap::new();
        for post in &posts {
            for name in &post.tags {
                let slug = slugify(name);
                tags.entry(slug.clone())
                    .or_insert_with(|| TagCollection {
                        name: name.clone(),
                        slug,
                        posts: Vec::new(),
                    })
                    .posts
                    .push(*post);
            }
        }

        Self {
            posts,
            recent,
            tags,
        }
    }
}

/// A rendered synthetic page.
#[derive(Debug, Clone)]
pub struct SyntheticPage {
    pub output: String,
    pub html: String,
}

/// Template chains the synthetic pages of this configuration use.
pub fn synthetic_chains(config: &SiteConfig) -> Vec<&'static [&'static str]> {
    let mut chains = vec![INDEX_CHAIN, ARCHIVE_CHAIN];
    if config.build.tag_pages {
        chains.push(TAG_CHAIN);
    }
    chains
}

/// Render `index.html`, `archive.html` and tag pages.
///
/// A page whose templates fail is reported and left out.
pub fn build_synthetic(
    collections: &Collections<'_>,
    templates: &TemplateSet,
    config: &SiteConfig,
) -> (Vec<SyntheticPage>, Vec<Failure>) {
    let mut jobs: Vec<(String, &[&str], Context)> = Vec::new();

    let home_title = if config.site.title.is_empty() {
        "Home"
    } else {
        config.site.title.as_str()
    };
    jobs.push((
        "index.html".into(),
        INDEX_CHAIN,
        page_context(home_title, "index.html", config)
            .with("posts", list_value(collections.recent.iter().copied(), config)),
    ));
    jobs.push((
        "archive.html".into(),
        ARCHIVE_CHAIN,
        page_context("Archive", "archive.html", config)
            .with("posts", list_value(collections.posts.iter().copied(), config)),
    ));

    if config.build.tag_pages {
        for tag in collections.tags.values() {
            let output = tag_output(&tag.slug);
            let title = format!("Posts tagged “{}”", tag.name);
            let ctx = page_context(&title, &output, config)
                .with("tag", crate::utils::html::escape(&tag.name).into_owned())
                .with("posts", list_value(tag.posts.iter().copied(), config));
            jobs.push((output, TAG_CHAIN, ctx));
        }
    }

    let mut pages = Vec::with_capacity(jobs.len());
    let mut failures = Vec::new();
    for (output, chain, ctx) in jobs {
        match templates.apply_chain(chain, ctx) {
            Ok(html) => pages.push(SyntheticPage { output, html }),
            Err(err) => failures.push(Failure::new(output, err)),
        }
    }
    (pages, failures)
}

fn page_context(title: &str, output: &str, config: &SiteConfig) -> Context {
    Context::new()
        .with("title", crate::utils::html::escape(title).into_owned())
        .with("url", root_url(output))
        .with("body", "")
        .with("site", site_context(config))
}
