//! Template contexts for documents, listing entries and the site.
//!
//! Metadata is plain text and escaped on the way in. The rendered body is
//! HTML and inserted as-is. URLs are site-root paths (`/posts/x.html`); the
//! link rewriter turns them into their final form.

use crate::config::SiteConfig;
use crate::source::Document;
use crate::template::{Context, Value};
use crate::utils::date::DateTimeUtc;
use crate::utils::html::escape;
use crate::utils::slug::slugify;

use super::Summary;

/// `site.*` fields.
pub fn site_context(config: &SiteConfig) -> Context {
    let mut site = Context::new()
        .with("title", escape(&config.site.title).into_owned())
        .with("description", escape(&config.site.description).into_owned())
        .with("author", escape(&config.site.author).into_owned());
    if let Some(url) = config.base_url() {
        site.insert("url", escape(url).into_owned());
    }
    site
}

/// Site-root URL of an output path.
pub fn root_url(output: &str) -> String {
    format!("/{output}")
}

/// Output path of a tag page.
pub fn tag_output(slug: &str) -> String {
    format!("tags/{slug}.html")
}

/// Full context for a document page: metadata, summary fields, `body`
/// and `site`.
pub fn document_context(doc: &Document, summary: &Summary, config: &SiteConfig) -> Context {
    let mut ctx = Context::new();
    for (key, value) in doc.meta.iter() {
        ctx.insert(key, escape(value).into_owned());
    }
    summary_fields(&mut ctx, summary, config);
    ctx.insert("body", doc.rendered.clone().unwrap_or_default());
    ctx.insert("site", site_context(config));
    ctx
}

/// Context of one entry in a listing.
fn summary_context(summary: &Summary, config: &SiteConfig) -> Context {
    let mut ctx = Context::new();
    if let Some(title) = &summary.title {
        ctx.insert("title", escape(title).into_owned());
    }
    summary_fields(&mut ctx, summary, config);
    ctx
}

fn summary_fields(ctx: &mut Context, summary: &Summary, config: &SiteConfig) {
    let format = &config.build.date_format;

    ctx.insert("url", root_url(&summary.output));
    ctx.insert("path", escape(&summary.path).into_owned());
    ctx.insert("teaser", escape(&summary.teaser).into_owned());
    insert_date(ctx, "published", summary.published, format);
    insert_date(ctx, "last", summary.last, format);

    let tags: Vec<Context> = summary
        .tags
        .iter()
        .map(|name| tag_context(name, config))
        .collect();
    ctx.insert("tags", tags);
}

fn insert_date(ctx: &mut Context, key: &str, date: Option<DateTimeUtc>, format: &str) {
    if let Some(date) = date {
        ctx.insert(key, escape(&date.format(format)).into_owned());
        ctx.insert(format!("{key}_iso"), date.to_iso_date());
    }
}

fn tag_context(name: &str, config: &SiteConfig) -> Context {
    let slug = slugify(name);
    let mut ctx = Context::new().with("name", escape(name).into_owned());
    if config.build.tag_pages {
        ctx.insert("url", root_url(&tag_output(&slug)));
    }
    ctx.insert("slug", slug);
    ctx
}

/// List value of listing entries, in the given order.
pub fn list_value<'a>(summaries: impl IntoIterator<Item = &'a Summary>, config: &SiteConfig) -> Value {
    Value::List(
        summaries
            .into_iter()
            .map(|s| summary_context(s, config))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentRoot, test_parse_config};

    #[test]
    fn test_document_context() {
        let config = test_parse_config("[site]\ntitle = \"A & B\"\n[build]\ntag_pages = true");
        let mut doc = Document::parse(
            "posts/x.md".into(),
            "---\ntitle: <Day 7>\npublished: 2020-12-07\ntags: Advent Of-Code\n---\nhello",
            &ContentRoot::default(),
        )
        .unwrap();
        doc.rendered = Some("<p>hello</p>\n".into());
        let summary = Summary::new(&doc, "hello".into());

        let ctx = document_context(&doc, &summary, &config);
        assert_eq!(ctx.text("title"), Some("&lt;Day 7&gt;"));
        assert_eq!(ctx.text("body"), Some("<p>hello</p>\n"));
        assert_eq!(ctx.text("url"), Some("/posts/x.html"));
        assert_eq!(ctx.text("published"), Some("December  7, 2020"));
        assert_eq!(ctx.text("published_iso"), Some("2020-12-07"));
        assert!(!ctx.contains("last"));
        assert_eq!(
            ctx.get_path(&["site", "title"]),
            Some(&Value::from("A &amp; B"))
        );

        let Some(Value::List(tags)) = ctx.get("tags") else {
            panic!("tags should be a list");
        };
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1].text("name"), Some("Of-Code"));
        assert_eq!(tags[1].text("url"), Some("/tags/of-code.html"));
    }

    #[test]
    fn test_tag_url_only_with_tag_pages() {
        let config = test_parse_config("");
        let ctx = tag_context("rust", &config);
        assert!(!ctx.contains("url"));
        assert_eq!(ctx.text("slug"), Some("rust"));
    }
}
