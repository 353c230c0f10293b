//! Site building orchestration.
//!
//! Build pipeline phases:
//! - **Init** - Load templates, check every chain the build will apply
//! - **Collect** - Discover content documents and static assets
//! - **Compile** - Parallel load → render → template per document
//! - **Graph** - Path map of documents, assets and reserved pages (barrier)
//! - **Rewrite** - Collections, synthetic pages, then parallel link
//!   rewriting against the complete path map. Strict mode repeats this
//!   until no page is dropped.
//! - **Write** - Parallel write into staging, then swap into place
//!
//! Anything that fails in Init or Collect is fatal and leaves the previous
//! output alone. Later failures concern one document and are collected
//! into the [`BuildReport`].

use crate::{
    compiler::{MarkupOptions, render_document},
    config::{LinkMode, SiteConfig},
    core::{BuildError, Failure},
    generator::feed::{self, build_rss},
    log,
    logger::ProgressLine,
    output::{OutputFile, Staging},
    pipeline::{LinkRewriter, PathMap},
    site::{Collections, Summary, build_synthetic, document_context, synthetic_chains},
    source::{self, Asset, SourceFile},
    template::TemplateSet,
    utils::{
        path::{site_parent, to_site_path},
        plural_count,
    },
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

/// Outcome of a build that got past the fatal checks.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: usize,
    pub assets: usize,
    pub drafts: usize,
    /// Sorted by path.
    pub failures: Vec<Failure>,
}

impl BuildReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Print one line per failure, then the summary line.
    pub fn log(&self) {
        for failure in &self.failures {
            log!("failed"; "{failure}");
        }
        if self.drafts > 0 {
            log!("build"; "{} skipped", plural_count(self.drafts, "draft"));
        }
        log!(
            "done";
            "{} and {} written, {}",
            plural_count(self.pages, "page"),
            plural_count(self.assets, "asset"),
            plural_count(self.failures.len(), "failure")
        );
    }
}

/// Build the entire site.
///
/// Pipeline: init -> collect -> compile -> graph -> rewrite -> write
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    // Init
    let templates = load_templates(config)?;

    // Collect
    let sources = source::discover(config)?;
    let assets = source::discover_assets(config)?;
    crate::debug!(
        "build";
        "found {} and {}",
        plural_count(sources.len(), "document"),
        plural_count(assets.len(), "asset")
    );

    let progress = ProgressLine::new(&[("pages", sources.len()), ("assets", assets.len())]);
    let mut failures = Vec::new();

    // Compile
    let options = MarkupOptions::from_config(&config.markup, config.build.teaser_length);
    let mut compiled = Vec::with_capacity(sources.len());
    let mut drafts = 0;
    let outcomes: Vec<_> = sources
        .par_iter()
        .map(|file| {
            let outcome = compile(file, config, &templates, &options);
            progress.inc("pages");
            (file, outcome)
        })
        .collect();
    for (file, outcome) in outcomes {
        match outcome {
            Ok(Some(page)) => compiled.push(page),
            Ok(None) => drafts += 1,
            Err(err) => failures.push(Failure::new(&file.path, err)),
        }
    }

    // Graph
    let mut base = PathMap::new();
    let feed_path = feed::is_enabled(config).then(|| to_site_path(&config.feed.path));
    for reserved in ["index.html", "archive.html"].into_iter().chain(feed_path.as_deref()) {
        base.insert_output(reserved);
    }
    compiled.retain(|page| {
        let registered = base.insert_source(&page.summary.path, &page.summary.output);
        if !registered {
            log!("warning"; "{} skipped, `{}` is already taken", page.summary.path, page.summary.output);
        }
        registered
    });
    failures.extend(compiled.iter().filter_map(|page| {
        let summary = &page.summary;
        summary.check_listable().err().map(|e| Failure::new(&summary.path, e))
    }));

    let assets: Vec<Asset> = assets
        .into_iter()
        .filter(|asset| {
            let registered = base.insert_output(&asset.path);
            if !registered {
                log!("warning"; "asset {} skipped, the path is already taken", asset.path);
            }
            registered
        })
        .collect();

    // Rewrite. A page dropped in strict mode takes its output with it, so
    // listings and links are rebuilt until no further page drops.
    let mut dropped: FxHashSet<String> = FxHashSet::default();
    let (mut files, summaries) = loop {
        let summaries: Vec<Summary> = compiled.iter().map(|page| page.summary.clone()).collect();
        let collections = Collections::build(&summaries, config.build.recent_posts);
        let (synthetic, synthetic_failures) = build_synthetic(&collections, &templates, config);

        let mut map = base.clone();
        let mut jobs: Vec<PageJob<'_>> = compiled
            .iter()
            .map(|page| PageJob {
                origin: &page.summary.path,
                base_dir: site_parent(&page.summary.path),
                output: &page.summary.output,
                html: &page.html,
            })
            .collect();
        let mut taken = Vec::new();
        for page in synthetic.iter().filter(|page| !dropped.contains(&page.output)) {
            let fixed = page.output == "index.html" || page.output == "archive.html";
            if !fixed && !map.insert_output(&page.output) {
                taken.push(page.output.as_str());
                continue;
            }
            jobs.push(PageJob {
                origin: &page.output,
                base_dir: site_parent(&page.output),
                output: &page.output,
                html: &page.html,
            });
        }

        let rewriter = LinkRewriter::new(&map, config);
        let rewritten: Vec<_> = jobs
            .into_par_iter()
            .map(|job| rewrite_page(job, &rewriter, config.links.mode))
            .collect();

        let mut pages = Vec::with_capacity(rewritten.len());
        let mut newly_dropped = Vec::new();
        for result in rewritten {
            match result {
                Ok(file) => pages.push(file),
                Err(page) => newly_dropped.push(page),
            }
        }

        if newly_dropped.is_empty() {
            for output in taken {
                log!("warning"; "tag page `{}` skipped, the path is already taken", output);
            }
            failures.extend(synthetic_failures);
            break (pages, summaries);
        }

        crate::debug!("link"; "{} dropped, relinking", plural_count(newly_dropped.len(), "page"));
        for page in newly_dropped {
            base.remove_output(&page.output);
            failures.extend(page.failures);
            dropped.insert(page.output);
        }
        compiled.retain(|page| !dropped.contains(&page.summary.output));
    };

    files.reserve(assets.len() + 1);
    if let Some(path) = feed_path {
        let collections = Collections::build(&summaries, config.build.recent_posts);
        if let Some(xml) = build_rss(&collections, config)? {
            log!("rss"; "{} with {}", path, plural_count(collections.recent.len(), "item"));
            files.push(OutputFile::Page { path, html: xml });
        }
    }

    files.extend(assets.into_iter().map(|asset| OutputFile::Asset {
        path: asset.path,
        source: asset.abs,
    }));

    // Write
    let output_dir = config.output_dir();
    let staging = Staging::create(&output_dir)?;
    crate::debug!("build"; "writing {} to {}", plural_count(files.len(), "file"), staging.dir().display());
    let write_failures = staging.write_all(&files, |file| {
        if !file.is_page() {
            progress.inc("assets");
        }
    });
    progress.finish();

    let failed: FxHashSet<&str> = write_failures.iter().map(|f| f.path.as_str()).collect();
    let (pages, assets) = files
        .iter()
        .filter(|file| !failed.contains(file.path()))
        .fold((0, 0), |(pages, assets), file| {
            if file.is_page() {
                (pages + 1, assets)
            } else {
                (pages, assets + 1)
            }
        });
    failures.extend(write_failures);

    staging
        .commit()
        .with_context(|| format!("Failed to replace {}", output_dir.display()))?;

    failures.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.kind().cmp(&b.kind())));
    Ok(BuildReport {
        pages,
        assets,
        drafts,
        failures,
    })
}

/// Load the template directory and make sure every chain the build applies
/// can be resolved, partials included.
fn load_templates(config: &SiteConfig) -> Result<TemplateSet, BuildError> {
    let templates = TemplateSet::load(&config.templates_dir(), config.template.defaults.clone())?;

    let configured = config
        .content
        .iter()
        .flat_map(|root| root.templates.iter().map(String::as_str));
    let synthetic = synthetic_chains(config).into_iter().flatten().copied();
    for name in configured.chain(synthetic) {
        templates.check(name)?;
    }
    Ok(templates)
}

/// A document after rendering and templating, before link rewriting.
struct CompiledPage {
    summary: Summary,
    html: String,
}

/// Load, render and template one document. `Ok(None)` for drafts.
fn compile(
    file: &SourceFile,
    config: &SiteConfig,
    templates: &TemplateSet,
    options: &MarkupOptions,
) -> Result<Option<CompiledPage>, BuildError> {
    let Some(mut doc) = source::load(file, config)? else {
        return Ok(None);
    };

    let teaser = render_document(&mut doc, options);
    let summary = Summary::new(&doc, teaser);
    let ctx = document_context(&doc, &summary, config);
    let html = templates.apply_chain(&doc.templates, ctx)?;

    Ok(Some(CompiledPage { summary, html }))
}

/// A page waiting for link rewriting.
struct PageJob<'a> {
    /// Path failures are reported under.
    origin: &'a str,
    /// Site directory relative links resolve against.
    base_dir: &'a str,
    output: &'a str,
    html: &'a str,
}

/// A page left out in strict mode, with one failure per broken link.
struct DroppedPage {
    output: String,
    failures: Vec<Failure>,
}

/// Rewrite one page. In strict mode a page with broken links is not
/// written and each broken link is a failure.
fn rewrite_page(
    job: PageJob<'_>,
    rewriter: &LinkRewriter<'_>,
    mode: LinkMode,
) -> Result<OutputFile, DroppedPage> {
    let rewritten = rewriter.rewrite(job.html, job.base_dir);

    if !rewritten.broken.is_empty() {
        match mode {
            LinkMode::Strict => {
                return Err(DroppedPage {
                    output: job.output.to_string(),
                    failures: rewritten
                        .broken
                        .into_iter()
                        .map(|link| Failure::new(job.origin, BuildError::BrokenLink { link }))
                        .collect(),
                });
            }
            LinkMode::Lenient => {
                for link in &rewritten.broken {
                    log!("link"; "{}: `{}` does not resolve, kept as written", job.origin, link);
                }
            }
        }
    }

    Ok(OutputFile::Page {
        path: job.output.to_string(),
        html: rewritten.html,
    })
}
