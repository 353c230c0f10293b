//! RSS 2.0 feed generation.
//!
//! Built from the `recent` collection, so it needs no extra pass over the
//! documents.

use anyhow::{Result, anyhow};
use regex::Regex;
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder, validation::Validate};
use std::sync::LazyLock;

use crate::config::SiteConfig;
use crate::pipeline::encode_path;
use crate::site::{Collections, Summary};

/// Whether this build writes a feed.
pub fn is_enabled(config: &SiteConfig) -> bool {
    config.feed.enable && config.site.url.is_some()
}

/// Render the feed XML, or `None` when the feed is disabled.
pub fn build_rss(collections: &Collections<'_>, config: &SiteConfig) -> Result<Option<String>> {
    if !is_enabled(config) {
        return Ok(None);
    }

    let items: Vec<_> = collections
        .recent
        .iter()
        .filter_map(|summary| summary_to_rss_item(summary, config))
        .collect();

    let channel = ChannelBuilder::default()
        .title(&config.site.title)
        .link(config.base_url().unwrap_or_default())
        .description(&config.site.description)
        .generator("quire".to_string())
        .items(items)
        .build();

    channel
        .validate()
        .map_err(|e| anyhow!("RSS validation failed: {e}"))?;
    Ok(Some(channel.to_string()))
}

fn summary_to_rss_item(summary: &Summary, config: &SiteConfig) -> Option<rss::Item> {
    let pub_date = summary.published?.to_rfc2822();
    let link = config.absolute_url_for(&encode_path(&summary.output));

    Some(
        ItemBuilder::default()
            .title(summary.title.clone())
            .link(Some(link.clone()))
            .guid(GuidBuilder::default().permalink(true).value(link).build())
            .description(Some(summary.teaser.clone()).filter(|t| !t.is_empty()))
            .pub_date(pub_date)
            .author(rss_author(summary.author.as_deref(), config))
            .build(),
    )
}

/// RSS wants `email (Name)`; take the document's author, then the site's,
/// and leave the element out when neither has that form.
fn rss_author(author: Option<&str>, config: &SiteConfig) -> Option<String> {
    static RE_VALID_AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}[ \t]*\([^)]+\)$").unwrap()
    });

    author
        .into_iter()
        .chain([config.site.author.as_str()])
        .map(str::trim)
        .find(|author| RE_VALID_AUTHOR.is_match(author))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::utils::date::DateTimeUtc;

    fn summary(path: &str, date: &str) -> Summary {
        Summary {
            path: path.into(),
            output: crate::utils::path::with_html_extension(path),
            title: Some(format!("Title of {path}")),
            published: DateTimeUtc::parse(date),
            last: None,
            tags: Vec::new(),
            author: None,
            teaser: "A <teaser> & more".into(),
            listed: true,
        }
    }

    #[test]
    fn test_disabled_without_url() {
        let config = test_parse_config("[feed]\nenable = true");
        let collections = Collections::build(&[], 5);
        assert!(build_rss(&collections, &config).unwrap().is_none());
    }

    #[test]
    fn test_feed_items_in_recent_order() {
        let config = test_parse_config(
            "[site]\ntitle = \"Blog\"\nurl = \"https://example.com/blog\"\n[feed]\nenable = true",
        );
        let summaries = vec![
            summary("posts/old.md", "2020-12-07"),
            summary("posts/new.md", "2021-01-05"),
        ];
        let collections = Collections::build(&summaries, 5);
        let xml = build_rss(&collections, &config).unwrap().unwrap();

        let new = xml.find("https://example.com/blog/posts/new.html").unwrap();
        let old = xml.find("https://example.com/blog/posts/old.html").unwrap();
        assert!(new < old);
        assert!(xml.contains("Tue, 05 Jan 2021 00:00:00 GMT"));
        assert!(xml.contains("<title>Blog</title>"));
    }

    #[test]
    fn test_item_link_and_date() {
        let config = test_parse_config("[site]\nurl = \"https://example.com\"");
        let item = summary_to_rss_item(&summary("posts/a.md", "2024-01-15"), &config).unwrap();
        assert_eq!(item.link(), Some("https://example.com/posts/a.html"));
        assert_eq!(item.title(), Some("Title of posts/a.md"));
        assert_eq!(item.pub_date(), Some("Mon, 15 Jan 2024 00:00:00 GMT"));
    }

    #[test]
    fn test_author_needs_email_form() {
        let config = test_parse_config("[site]\nauthor = \"ann@example.com (Ann)\"");
        assert_eq!(
            rss_author(Some("bob@example.com (Bob)"), &config).as_deref(),
            Some("bob@example.com (Bob)")
        );
        assert_eq!(
            rss_author(Some("Bob"), &config).as_deref(),
            Some("ann@example.com (Ann)")
        );

        let config = test_parse_config("[site]\nauthor = \"Ann\"");
        assert_eq!(rss_author(Some("Bob"), &config), None);
        assert_eq!(rss_author(None, &config), None);
    }
}
