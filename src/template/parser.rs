//! Template parser.
//!
//! Syntax:
//!
//! | Form                                   | Meaning                          |
//! |----------------------------------------|----------------------------------|
//! | `$title$`, `$site.title$`              | field substitution               |
//! | `$if(x)$ .. $elseif(y)$ .. $else$ .. $endif$` | conditional                |
//! | `$for(posts)$ .. $sep$ .. $endfor$`    | repetition with separator        |
//! | `$partial(nav)$`                       | inline another template          |
//! | `$$`                                   | literal `$`                      |
//! | `$-- text`                             | comment to end of line           |

use crate::core::BuildError;

/// A field reference such as `site.title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    /// Dotted name as written.
    pub name: String,
    /// Line of the reference in its template.
    pub line: usize,
}

impl FieldRef {
    pub fn segments(&self) -> Vec<&str> {
        self.name.split('.').collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Field(FieldRef),
    If {
        branches: Vec<(FieldRef, Vec<Node>)>,
        otherwise: Vec<Node>,
    },
    For {
        list: FieldRef,
        body: Vec<Node>,
        separator: Vec<Node>,
    },
    Partial {
        name: String,
        line: usize,
    },
}

// ============================================================================
// tokens
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Field(FieldRef),
    If(FieldRef),
    ElseIf(FieldRef),
    Else,
    EndIf,
    For(FieldRef),
    Sep,
    EndFor,
    Partial(String),
}

impl Token {
    fn describe(&self) -> &'static str {
        match self {
            Self::ElseIf(_) => "$elseif(..)$",
            Self::Else => "$else$",
            Self::EndIf => "$endif$",
            Self::Sep => "$sep$",
            Self::EndFor => "$endfor$",
            _ => "directive",
        }
    }
}

struct Lexer<'a> {
    name: &'a str,
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn error(&self, line: usize, reason: impl Into<String>) -> BuildError {
        BuildError::TemplateSyntax {
            name: self.name.to_string(),
            line,
            reason: reason.into(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, BuildError> {
        let mut tokens = Vec::new();
        let mut text = String::new();

        while let Some(offset) = self.src[self.pos..].find('$') {
            let literal = &self.src[self.pos..self.pos + offset];
            text.push_str(literal);
            self.line += literal.matches('\n').count();
            self.pos += offset + 1;

            let rest = &self.src[self.pos..];
            if rest.starts_with('$') {
                text.push('$');
                self.pos += 1;
                continue;
            }
            if rest.starts_with("--") {
                // Comment: drop through end of line, newline included.
                match rest.find('\n') {
                    Some(nl) => {
                        self.pos += nl + 1;
                        self.line += 1;
                    }
                    None => self.pos = self.src.len(),
                }
                continue;
            }

            let Some(close) = rest.find(['$', '\n']).filter(|&i| rest.as_bytes()[i] == b'$') else {
                return Err(self.error(self.line, "`$` is never closed on this line"));
            };
            let directive = &rest[..close];
            self.pos += close + 1;

            if !text.is_empty() {
                tokens.push((Token::Text(std::mem::take(&mut text)), self.line));
            }
            tokens.push((self.directive(directive)?, self.line));
        }

        text.push_str(&self.src[self.pos..]);
        if !text.is_empty() {
            tokens.push((Token::Text(text), self.line));
        }
        Ok(tokens)
    }

    fn directive(&self, body: &str) -> Result<Token, BuildError> {
        let body = body.trim();
        let field = |name: &str| -> Result<FieldRef, BuildError> {
            if is_field_path(name) {
                Ok(FieldRef {
                    name: name.to_string(),
                    line: self.line,
                })
            } else {
                Err(self.error(self.line, format!("invalid field name `{name}`")))
            }
        };

        let token = match body {
            "else" => Token::Else,
            "endif" => Token::EndIf,
            "sep" => Token::Sep,
            "endfor" => Token::EndFor,
            _ => match call(body) {
                Some(("if", arg)) => Token::If(field(arg)?),
                Some(("elseif", arg)) => Token::ElseIf(field(arg)?),
                Some(("for", arg)) => Token::For(field(arg)?),
                Some(("partial", arg)) => {
                    let name = arg.trim_matches('"');
                    if name.is_empty() {
                        return Err(self.error(self.line, "`$partial()$` needs a template name"));
                    }
                    Token::Partial(name.to_string())
                }
                Some((other, _)) => {
                    return Err(self.error(self.line, format!("unknown directive `{other}`")));
                }
                None => Token::Field(field(body)?),
            },
        };
        Ok(token)
    }
}

/// Split `name(arg)` into its parts.
fn call(body: &str) -> Option<(&str, &str)> {
    let (name, rest) = body.split_once('(')?;
    let arg = rest.strip_suffix(')')?;
    Some((name.trim(), arg.trim()))
}

fn is_field_path(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|seg| {
            let mut chars = seg.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        })
}

// ============================================================================
// tree
// ============================================================================

struct TreeBuilder<'a> {
    name: &'a str,
    tokens: std::vec::IntoIter<(Token, usize)>,
}

impl TreeBuilder<'_> {
    fn error(&self, line: usize, reason: impl Into<String>) -> BuildError {
        BuildError::TemplateSyntax {
            name: self.name.to_string(),
            line,
            reason: reason.into(),
        }
    }

    /// Parse nodes until one of `stops` (returned) or end of input (`None`).
    fn block(&mut self, stops: &[&str]) -> Result<(Vec<Node>, Option<(Token, usize)>), BuildError> {
        let mut nodes = Vec::new();

        while let Some((token, line)) = self.tokens.next() {
            match token {
                Token::Text(text) => nodes.push(Node::Text(text)),
                Token::Field(field) => nodes.push(Node::Field(field)),
                Token::Partial(name) => nodes.push(Node::Partial { name, line }),
                Token::If(cond) => nodes.push(self.conditional(cond, line)?),
                Token::For(list) => nodes.push(self.repetition(list, line)?),
                stop => {
                    if stops.contains(&stop.describe()) {
                        return Ok((nodes, Some((stop, line))));
                    }
                    return Err(self.error(line, format!("unexpected `{}`", stop.describe())));
                }
            }
        }

        Ok((nodes, None))
    }

    fn conditional(&mut self, first: FieldRef, line: usize) -> Result<Node, BuildError> {
        let mut branches = Vec::new();
        let mut cond = first;

        loop {
            let (body, stop) = self.block(&["$elseif(..)$", "$else$", "$endif$"])?;
            branches.push((cond, body));
            match stop {
                Some((Token::ElseIf(next), _)) => cond = next,
                Some((Token::Else, _)) => {
                    let (otherwise, stop) = self.block(&["$endif$"])?;
                    if stop.is_none() {
                        break;
                    }
                    return Ok(Node::If {
                        branches,
                        otherwise,
                    });
                }
                Some(_) => {
                    return Ok(Node::If {
                        branches,
                        otherwise: Vec::new(),
                    });
                }
                None => break,
            }
        }

        Err(self.error(line, "`$if(..)$` is never closed with `$endif$`"))
    }

    fn repetition(&mut self, list: FieldRef, line: usize) -> Result<Node, BuildError> {
        let (body, stop) = self.block(&["$sep$", "$endfor$"])?;
        let separator = match stop {
            Some((Token::Sep, _)) => match self.block(&["$endfor$"])? {
                (separator, Some(_)) => separator,
                (_, None) => return Err(self.error(line, "`$for(..)$` is never closed with `$endfor$`")),
            },
            Some(_) => Vec::new(),
            None => return Err(self.error(line, "`$for(..)$` is never closed with `$endfor$`")),
        };
        Ok(Node::For {
            list,
            body,
            separator,
        })
    }
}

/// Parse template source into nodes.
pub fn parse(name: &str, src: &str) -> Result<Vec<Node>, BuildError> {
    let tokens = Lexer {
        name,
        src,
        pos: 0,
        line: 1,
    }
    .tokenize()?;

    let mut builder = TreeBuilder {
        name,
        tokens: tokens.into_iter(),
    };
    let (nodes, _) = builder.block(&[])?;
    Ok(nodes)
}

/// Names of partials referenced anywhere in `nodes`.
pub fn partials(nodes: &[Node]) -> Vec<(&str, usize)> {
    let mut out = Vec::new();
    collect_partials(nodes, &mut out);
    out
}

fn collect_partials<'a>(nodes: &'a [Node], out: &mut Vec<(&'a str, usize)>) {
    for node in nodes {
        match node {
            Node::Partial { name, line } => out.push((name, *line)),
            Node::If {
                branches,
                otherwise,
            } => {
                for (_, body) in branches {
                    collect_partials(body, out);
                }
                collect_partials(otherwise, out);
            }
            Node::For {
                body, separator, ..
            } => {
                collect_partials(body, out);
                collect_partials(separator, out);
            }
            Node::Text(_) | Node::Field(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, line: usize) -> FieldRef {
        FieldRef {
            name: name.into(),
            line,
        }
    }

    #[test]
    fn test_text_and_fields() {
        let nodes = parse("t", "<h1>$title$</h1> costs $$5").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Text("<h1>".into()),
                Node::Field(field("title", 1)),
                Node::Text("</h1> costs $5".into()),
            ]
        );
    }

    #[test]
    fn test_comment_dropped() {
        let nodes = parse("t", "a\n$-- note $x$\nb").unwrap();
        assert_eq!(nodes, vec![Node::Text("a\nb".into())]);
    }

    #[test]
    fn test_for_with_sep() {
        let nodes = parse("t", "$for(posts)$$title$$sep$, $endfor$").unwrap();
        assert_eq!(
            nodes,
            vec![Node::For {
                list: field("posts", 1),
                body: vec![Node::Field(field("title", 1))],
                separator: vec![Node::Text(", ".into())],
            }]
        );
    }

    #[test]
    fn test_if_elseif_else() {
        let nodes = parse("t", "$if(a)$A$elseif(b)$B$else$C$endif$").unwrap();
        let Node::If {
            branches,
            otherwise,
        } = &nodes[0]
        else {
            panic!("expected conditional");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(otherwise, &vec![Node::Text("C".into())]);
    }

    #[test]
    fn test_partial_names() {
        let nodes = parse("t", "$partial(nav)$\n$if(x)$$partial(\"footer\")$$endif$").unwrap();
        let names: Vec<_> = partials(&nodes).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["nav", "footer"]);
    }

    #[test]
    fn test_line_numbers_in_errors() {
        let err = parse("post", "line one\nline two\n$for(posts)$ never closed").unwrap_err();
        match err {
            BuildError::TemplateSyntax { name, line, .. } => {
                assert_eq!(name, "post");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse("t", "$unclosed\n$").is_err());
        assert!(parse("t", "$endif$").is_err());
        assert!(parse("t", "$bogus(x)$").is_err());
        assert!(parse("t", "$not a field$").is_err());
        assert!(parse("t", "$if(x)$ no end").is_err());
        assert!(parse("t", "$for(x)$a$sep$b").is_err());
    }
}
