//! Template engine.
//!
//! Templates live as `<name>.html` files in the template directory
//! (`partials/nav.html` is named `partials/nav`). They are parsed once per
//! build into a [`TemplateSet`] and then rendered against a [`Context`]
//! per page.

mod context;
mod eval;
mod parser;

pub use context::{Context, Value};

use jwalk::WalkDir;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::BuildError;
use crate::utils::path::to_site_path;
use parser::Node;

/// Maximum `$partial()$` nesting, guards against cycles.
const MAX_PARTIAL_DEPTH: usize = 16;

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    pub fn parse(name: impl Into<String>, src: &str) -> Result<Self, BuildError> {
        let name = name.into();
        let nodes = parser::parse(&name, src)?;
        Ok(Self { name, nodes })
    }
}

/// All templates of a site plus configured field defaults.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: BTreeMap<String, Template>,
    defaults: BTreeMap<String, String>,
}

impl TemplateSet {
    pub fn new(defaults: BTreeMap<String, String>) -> Self {
        Self {
            templates: BTreeMap::new(),
            defaults,
        }
    }

    /// Parse every `*.html` file under `dir`.
    ///
    /// A missing directory is `NotFound`; any syntax error is returned as
    /// `TemplateSyntax`.
    pub fn load(dir: &Path, defaults: BTreeMap<String, String>) -> Result<Self, BuildError> {
        if !dir.is_dir() {
            return Err(BuildError::NotFound(dir.to_path_buf()));
        }

        let mut set = Self::new(defaults);
        let files = WalkDir::new(dir)
            .sort(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "html"));

        for path in files {
            let rel = path.strip_prefix(dir).unwrap_or(&path).with_extension("");
            let name = to_site_path(&rel);
            let src = fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;
            set.insert(Template::parse(name, &src)?);
        }

        crate::debug!("template"; "loaded {} templates from {}", set.len(), dir.display());
        Ok(set)
    }

    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check that `name` exists and every partial it pulls in exists.
    pub fn check(&self, name: &str) -> Result<(), BuildError> {
        let mut pending = vec![(name.to_string(), 0)];
        let mut seen = Vec::new();

        while let Some((current, depth)) = pending.pop() {
            if seen.contains(&current) {
                continue;
            }
            let template = self
                .get(&current)
                .ok_or_else(|| BuildError::MissingTemplate(current.clone()))?;
            if depth < MAX_PARTIAL_DEPTH {
                for (partial, _) in parser::partials(&template.nodes) {
                    pending.push((partial.to_string(), depth + 1));
                }
            }
            seen.push(current);
        }
        Ok(())
    }

    /// Render one template.
    pub fn render(&self, name: &str, ctx: &Context) -> Result<String, BuildError> {
        let template = self
            .get(name)
            .ok_or_else(|| BuildError::MissingTemplate(name.to_string()))?;
        eval::render(self, template, ctx)
    }

    /// Render a chain of templates, each one's output becoming `$body$`
    /// of the next.
    ///
    /// The context's own `body` is the input of the first template.
    pub fn apply_chain<S: AsRef<str>>(
        &self,
        names: &[S],
        mut ctx: Context,
    ) -> Result<String, BuildError> {
        let mut output = ctx.text("body").unwrap_or_default().to_string();
        for name in names {
            output = self.render(name.as_ref(), &ctx)?;
            ctx.insert("body", output.clone());
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn set(templates: &[(&str, &str)]) -> TemplateSet {
        let mut set = TemplateSet::default();
        for (name, src) in templates {
            set.insert(Template::parse(*name, src).unwrap());
        }
        set
    }

    #[test]
    fn test_chain_post_then_default() {
        let set = set(&[
            ("post", "<article><h1>$title$</h1>$body$</article>"),
            ("default", "<html><title>$title$</title>$body$</html>"),
        ]);
        let ctx = Context::new()
            .with("title", "Day 7")
            .with("body", "<p>hello</p>\n");
        let out = set.apply_chain(&["post", "default"], ctx).unwrap();
        assert_eq!(
            out,
            "<html><title>Day 7</title><article><h1>Day 7</h1><p>hello</p>\n</article></html>"
        );
    }

    #[test]
    fn test_missing_template() {
        let set = set(&[]);
        let err = set.render("post", &Context::new()).unwrap_err();
        assert!(matches!(err, BuildError::MissingTemplate(name) if name == "post"));
    }

    #[test]
    fn test_missing_field_and_default() {
        let set = set(&[("post", "by $author$")]);
        let err = set.render("post", &Context::new()).unwrap_err();
        match err {
            BuildError::MissingField { template, field } => {
                assert_eq!(template, "post");
                assert_eq!(field, "author");
            }
            other => panic!("unexpected error: {other}"),
        }

        let mut with_default = set.clone();
        with_default.defaults.insert("author".into(), "Anonymous".into());
        assert_eq!(with_default.render("post", &Context::new()).unwrap(), "by Anonymous");

        let ctx = Context::new().with("author", "Ann");
        assert_eq!(with_default.render("post", &ctx).unwrap(), "by Ann");
    }

    #[test]
    fn test_check_follows_partials() {
        let set = set(&[("default", "$partial(nav)$"), ("post", "x")]);
        assert!(set.check("post").is_ok());
        let err = set.check("default").unwrap_err();
        assert!(matches!(err, BuildError::MissingTemplate(name) if name == "nav"));
    }

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("partials")).unwrap();
        fs::write(dir.path().join("default.html"), "$partial(partials/nav)$$body$").unwrap();
        fs::write(dir.path().join("partials/nav.html"), "<nav>$site.title$</nav>").unwrap();
        fs::write(dir.path().join("notes.txt"), "$ignored").unwrap();

        let set = TemplateSet::load(dir.path(), BTreeMap::new()).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.get("partials/nav").is_some());

        let ctx = Context::new()
            .with("site", Context::new().with("title", "Blog"))
            .with("body", "B");
        assert_eq!(set.render("default", &ctx).unwrap(), "<nav>Blog</nav>B");
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("templates");
        assert!(matches!(
            TemplateSet::load(&missing, BTreeMap::new()),
            Err(BuildError::NotFound(_))
        ));

        fs::create_dir_all(&missing).unwrap();
        fs::write(missing.join("bad.html"), "$if(x)$").unwrap();
        assert!(matches!(
            TemplateSet::load(&missing, BTreeMap::new()),
            Err(BuildError::TemplateSyntax { .. })
        ));
    }
}
