//! Markup rendering.
//!
//! Converts a document body to an HTML fragment with pulldown-cmark.
//! Literate sources go through [`literate::unlit`] first. Rendering never
//! fails: markup pulldown-cmark does not recognise is emitted as text.

mod literate;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

use crate::config::{MarkupConfig, MarkupExtension};
use crate::source::Document;

/// Options for markup conversion, resolved once per build.
#[derive(Debug, Clone, Default)]
pub struct MarkupOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable smart quotes and dashes
    pub smart_punctuation: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
    /// Treat code regions of literate sources as code blocks
    pub literate: bool,
    /// Source extensions read as literate programs
    pub literate_extensions: Vec<String>,
    /// Language tag for literate code blocks
    pub literate_language: String,
    /// Maximum teaser length in characters
    pub teaser_length: usize,
}

impl MarkupOptions {
    pub fn from_config(markup: &MarkupConfig, teaser_length: usize) -> Self {
        let has = |ext| markup.extensions.contains(&ext);
        Self {
            tables: has(MarkupExtension::Tables),
            footnotes: has(MarkupExtension::Footnotes),
            strikethrough: has(MarkupExtension::Strikethrough),
            task_lists: has(MarkupExtension::Tasklists),
            smart_punctuation: has(MarkupExtension::SmartPunctuation),
            heading_attributes: has(MarkupExtension::HeadingAttributes),
            literate: has(MarkupExtension::Literate),
            literate_extensions: markup.literate_extensions.clone(),
            literate_language: markup.literate_language.clone(),
            teaser_length,
        }
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.smart_punctuation {
            opts.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }

    fn is_literate(&self, extension: Option<&str>) -> bool {
        self.literate
            && extension.is_some_and(|ext| {
                self.literate_extensions
                    .iter()
                    .any(|e| e.eq_ignore_ascii_case(ext))
            })
    }
}

/// Output of the renderer for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// Plain text of the first paragraph, truncated.
    pub teaser: String,
}

/// Render markup to HTML.
///
/// `extension` is the source file extension and decides whether the
/// literate pre-pass runs.
pub fn render(body: &str, extension: Option<&str>, options: &MarkupOptions) -> Rendered {
    let source = if options.is_literate(extension) {
        literate::unlit(body, &options.literate_language)
    } else {
        body.into()
    };

    let mut teaser = TeaserCollector::default();
    let parser = Parser::new_ext(&source, options.to_pulldown_options())
        .inspect(|event| teaser.observe(event));

    let mut html_out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut html_out, parser);

    Rendered {
        html: html_out,
        teaser: teaser.finish(options.teaser_length),
    }
}

/// Fill in a document's rendered body, returning its teaser.
pub fn render_document(doc: &mut Document, options: &MarkupOptions) -> String {
    let extension = doc.extension();
    let Rendered { html, teaser } = render(&doc.body, extension.as_deref(), options);
    doc.rendered = Some(html);
    teaser
}

// ============================================================================
// teaser
// ============================================================================

/// Collects the text of the first top-level paragraph.
#[derive(Default)]
struct TeaserCollector {
    text: String,
    depth: usize,
    in_paragraph: bool,
    done: bool,
}

impl TeaserCollector {
    fn observe(&mut self, event: &Event<'_>) {
        if self.done {
            return;
        }
        match event {
            Event::Start(Tag::Paragraph) if self.depth == 0 => {
                self.in_paragraph = true;
                self.depth += 1;
            }
            Event::End(TagEnd::Paragraph) if self.in_paragraph && self.depth == 1 => {
                self.in_paragraph = false;
                self.depth -= 1;
                self.done = !self.text.trim().is_empty();
            }
            Event::Start(_) => self.depth += 1,
            Event::End(_) => self.depth = self.depth.saturating_sub(1),
            Event::Text(text) | Event::Code(text) if self.in_paragraph => self.text.push_str(text),
            Event::SoftBreak | Event::HardBreak if self.in_paragraph => self.text.push(' '),
            _ => {}
        }
    }

    fn finish(self, max_chars: usize) -> String {
        truncate_words(self.text.trim(), max_chars)
    }
}

/// Truncate at a word boundary, appending an ellipsis when cut.
fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut = text
        .char_indices()
        .nth(max_chars)
        .map_or(text.len(), |(i, _)| i);
    let head = &text[..cut];
    let head = match head.rfind(char::is_whitespace) {
        Some(space) if space > 0 => &head[..space],
        _ => head,
    };
    format!("{}…", head.trim_end())
}
