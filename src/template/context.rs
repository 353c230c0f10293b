//! Template values and contexts.

use std::collections::BTreeMap;

/// A value bound to a template field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Inserted verbatim.
    Text(String),
    /// Iterated by `$for(..)$`.
    List(Vec<Context>),
    /// Reached through dotted paths: `$site.title$`.
    Context(Context),
}

impl Value {
    /// Non-empty text, a non-empty list, or a nested context.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Context(ctx) => !ctx.is_empty(),
        }
    }

    /// Follow a dotted path below this value.
    fn get_path(&self, path: &[&str]) -> Option<&Value> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => match self {
                Self::Context(ctx) => ctx.get(first)?.get_path(rest),
                _ => None,
            },
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<Context>> for Value {
    fn from(items: Vec<Context>) -> Self {
        Self::List(items)
    }
}

impl From<Context> for Value {
    fn from(ctx: Context) -> Self {
        Self::Context(ctx)
    }
}

/// Field bindings for one template evaluation.
///
/// Sorted map so iteration, and therefore output, never depends on
/// insertion history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    fields: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a dotted path, e.g. `["site", "title"]`.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        self.get(first)?.get_path(rest)
    }

    /// Text value of a field, if it is text.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(Value::from("x").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::List(vec![Context::new()]).is_truthy());
        assert!(!Value::Context(Context::new()).is_truthy());
    }

    #[test]
    fn test_get_path() {
        let site = Context::new().with("title", "Blog");
        let ctx = Context::new().with("site", site).with("title", "Post");
        assert_eq!(ctx.get_path(&["site", "title"]), Some(&Value::from("Blog")));
        assert_eq!(ctx.get_path(&["title"]), Some(&Value::from("Post")));
        assert_eq!(ctx.get_path(&["site", "missing"]), None);
        assert_eq!(ctx.get_path(&["title", "nested"]), None);
        assert_eq!(ctx.text("title"), Some("Post"));
        assert_eq!(ctx.text("site"), None);
    }
}
