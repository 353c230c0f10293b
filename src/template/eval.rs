//! Template evaluation.
//!
//! Field lookup walks a scope stack from the innermost `$for$` element out
//! to the page context, then falls back to configured defaults.

use super::parser::{FieldRef, Node};
use super::{Context, MAX_PARTIAL_DEPTH, Template, TemplateSet, Value};
use crate::core::BuildError;

struct Evaluator<'a> {
    set: &'a TemplateSet,
    out: String,
}

pub fn render(set: &TemplateSet, template: &Template, ctx: &Context) -> Result<String, BuildError> {
    let mut eval = Evaluator {
        set,
        out: String::new(),
    };
    let mut scopes = vec![ctx];
    eval.nodes(&template.nodes, &template.name, &mut scopes, 0)?;
    Ok(eval.out)
}

enum Lookup<'a> {
    Found(&'a Value),
    Default(&'a str),
    Missing,
}

impl<'a> Evaluator<'a> {
    fn lookup(&self, field: &FieldRef, scopes: &[&'a Context]) -> Lookup<'a> {
        let segments = field.segments();
        let Some(first) = segments.first() else {
            return Lookup::Missing;
        };

        // The innermost scope binding the first segment owns the path.
        let owner = scopes.iter().rev().copied().find(|s| s.contains(first));
        if let Some(value) = owner.and_then(|scope| scope.get_path(&segments)) {
            return Lookup::Found(value);
        }

        let set = self.set;
        match set.defaults.get(&field.name) {
            Some(default) => Lookup::Default(default),
            None => Lookup::Missing,
        }
    }

    fn is_true(&self, field: &FieldRef, scopes: &[&'a Context]) -> bool {
        match self.lookup(field, scopes) {
            Lookup::Found(value) => value.is_truthy(),
            Lookup::Default(text) => !text.is_empty(),
            Lookup::Missing => false,
        }
    }

    /// Evaluate `body` once per element with the element pushed as a scope.
    fn each(
        &mut self,
        items: &'a [Context],
        body: &'a [Node],
        separator: &'a [Node],
        template: &str,
        scopes: &mut Vec<&'a Context>,
        depth: usize,
    ) -> Result<(), BuildError> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.nodes(separator, template, scopes, depth)?;
            }
            scopes.push(item);
            let result = self.nodes(body, template, scopes, depth);
            scopes.pop();
            result?;
        }
        Ok(())
    }

    fn nodes(
        &mut self,
        nodes: &'a [Node],
        template: &str,
        scopes: &mut Vec<&'a Context>,
        depth: usize,
    ) -> Result<(), BuildError> {
        for node in nodes {
            match node {
                Node::Text(text) => self.out.push_str(text),

                Node::Field(field) => match self.lookup(field, scopes) {
                    Lookup::Found(Value::Text(text)) => self.out.push_str(text),
                    // Lists and contexts have no text form.
                    Lookup::Found(_) => {}
                    Lookup::Default(text) => self.out.push_str(text),
                    Lookup::Missing => {
                        return Err(BuildError::MissingField {
                            template: template.to_string(),
                            field: field.name.clone(),
                        });
                    }
                },

                Node::If {
                    branches,
                    otherwise,
                } => {
                    let body = branches
                        .iter()
                        .find(|(cond, _)| self.is_true(cond, scopes))
                        .map_or(otherwise, |(_, body)| body);
                    self.nodes(body, template, scopes, depth)?;
                }

                Node::For {
                    list,
                    body,
                    separator,
                } => match self.lookup(list, scopes) {
                    Lookup::Found(Value::List(items)) => {
                        self.each(items, body, separator, template, scopes, depth)?;
                    }
                    Lookup::Found(Value::Context(item)) => {
                        self.each(std::slice::from_ref(item), body, separator, template, scopes, depth)?;
                    }
                    Lookup::Found(Value::Text(text)) if !text.is_empty() => {
                        self.nodes(body, template, scopes, depth)?;
                    }
                    Lookup::Default(text) if !text.is_empty() => {
                        self.nodes(body, template, scopes, depth)?;
                    }
                    Lookup::Found(_) | Lookup::Default(_) => {}
                    Lookup::Missing => {
                        return Err(BuildError::MissingField {
                            template: template.to_string(),
                            field: list.name.clone(),
                        });
                    }
                },

                Node::Partial { name, line } => {
                    if depth >= MAX_PARTIAL_DEPTH {
                        return Err(BuildError::TemplateSyntax {
                            name: template.to_string(),
                            line: *line,
                            reason: format!(
                                "partial `{name}` nests more than {MAX_PARTIAL_DEPTH} levels"
                            ),
                        });
                    }
                    let set = self.set;
                    let partial = set
                        .get(name)
                        .ok_or_else(|| BuildError::MissingTemplate(name.clone()))?;
                    self.nodes(&partial.nodes, &partial.name, scopes, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_str(src: &str, ctx: &Context) -> Result<String, BuildError> {
        let mut set = TemplateSet::default();
        set.insert(Template::parse("t", src).unwrap());
        set.render("t", ctx)
    }

    fn post(title: &str, url: &str) -> Context {
        Context::new().with("title", title).with("url", url)
    }

    #[test]
    fn test_for_preserves_order_and_sep() {
        let ctx = Context::new().with(
            "posts",
            vec![post("B", "/b.html"), post("A", "/a.html")],
        );
        let out = render_str(
            "$for(posts)$<a href=\"$url$\">$title$</a>$sep$, $endfor$",
            &ctx,
        )
        .unwrap();
        assert_eq!(out, "<a href=\"/b.html\">B</a>, <a href=\"/a.html\">A</a>");
    }

    #[test]
    fn test_loop_fields_shadow_outer() {
        let ctx = Context::new()
            .with("title", "Archive")
            .with("site", Context::new().with("title", "Blog"))
            .with("posts", vec![post("Day 1", "/1.html")]);
        let out = render_str("$title$:$for(posts)$[$title$ $site.title$]$endfor$", &ctx).unwrap();
        assert_eq!(out, "Archive:[Day 1 Blog]");
    }

    #[test]
    fn test_empty_list() {
        let ctx = Context::new().with("posts", Vec::<Context>::new());
        assert_eq!(render_str("[$for(posts)$x$endfor$]", &ctx).unwrap(), "[]");
    }

    #[test]
    fn test_if_never_fails_when_absent() {
        let ctx = Context::new().with("last", "2021-01-01").with("empty", "");
        let src = "$if(missing)$M$elseif(last)$L$endif$|$if(empty)$E$else$N$endif$";
        assert_eq!(render_str(src, &ctx).unwrap(), "L|N");
    }

    #[test]
    fn test_missing_field_inside_loop() {
        let ctx = Context::new().with("posts", vec![post("A", "/a.html")]);
        let err = render_str("$for(posts)$$author$$endfor$", &ctx).unwrap_err();
        assert!(matches!(err, BuildError::MissingField { field, .. } if field == "author"));
    }

    #[test]
    fn test_missing_list() {
        let err = render_str("$for(posts)$x$endfor$", &Context::new()).unwrap_err();
        assert!(matches!(err, BuildError::MissingField { field, .. } if field == "posts"));
    }

    #[test]
    fn test_partial_recursion_limited() {
        let mut set = TemplateSet::default();
        set.insert(Template::parse("loop", "x$partial(loop)$").unwrap());
        let err = set.render("loop", &Context::new()).unwrap_err();
        assert!(matches!(err, BuildError::TemplateSyntax { .. }));
    }

    #[test]
    fn test_partial_sees_loop_scope() {
        let mut set = TemplateSet::default();
        set.insert(Template::parse("item", "<li>$title$</li>").unwrap());
        set.insert(Template::parse("list", "$for(posts)$$partial(item)$$endfor$").unwrap());
        let ctx = Context::new().with("posts", vec![post("A", "/a"), post("B", "/b")]);
        assert_eq!(set.render("list", &ctx).unwrap(), "<li>A</li><li>B</li>");
    }
}
