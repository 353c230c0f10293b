//! Literate source pre-pass.
//!
//! Turns the code regions of a literate program into fenced code blocks
//! before Markdown parsing:
//!
//! ```text
//! > main :: IO ()            ```haskell
//! > main = print 42     =>   main :: IO ()
//!                            main = print 42
//!                            ```
//! ```
//!
//! `\begin{code}` ... `\end{code}` regions are handled the same way. Code is
//! only ever displayed.

use std::borrow::Cow;

enum State {
    Prose,
    /// Inside a Markdown fence already present in the source.
    Fenced(String),
    Bird(Vec<String>),
    Latex(Vec<String>),
}

/// Rewrite literate code regions of `source` as fenced blocks tagged
/// with `language`.
pub fn unlit<'a>(source: &'a str, language: &str) -> Cow<'a, str> {
    if !source.lines().any(|l| is_bird(l) || is_begin(l)) {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len() + 64);
    let mut state = State::Prose;

    for line in source.lines() {
        state = match state {
            State::Prose => {
                if is_bird(line) {
                    State::Bird(vec![strip_bird(line).to_string()])
                } else if is_begin(line) {
                    State::Latex(Vec::new())
                } else {
                    push_line(&mut out, line);
                    match markdown_fence(line) {
                        Some(fence) => State::Fenced(fence.to_string()),
                        None => State::Prose,
                    }
                }
            }
            State::Fenced(fence) => {
                push_line(&mut out, line);
                if line.trim_start().starts_with(fence.as_str()) {
                    State::Prose
                } else {
                    State::Fenced(fence)
                }
            }
            State::Bird(mut code) => {
                if is_bird(line) {
                    code.push(strip_bird(line).to_string());
                    State::Bird(code)
                } else {
                    push_block(&mut out, &code, language);
                    push_line(&mut out, line);
                    match markdown_fence(line) {
                        Some(fence) => State::Fenced(fence.to_string()),
                        None => State::Prose,
                    }
                }
            }
            State::Latex(mut code) => {
                if line.trim_end() == "\\end{code}" {
                    push_block(&mut out, &code, language);
                    State::Prose
                } else {
                    code.push(line.to_string());
                    State::Latex(code)
                }
            }
        };
    }

    // Unclosed regions still render as code.
    match state {
        State::Bird(code) | State::Latex(code) => push_block(&mut out, &code, language),
        State::Prose | State::Fenced(_) => {}
    }

    Cow::Owned(out)
}

fn is_bird(line: &str) -> bool {
    line == ">" || line.starts_with("> ")
}

fn strip_bird(line: &str) -> &str {
    line.strip_prefix("> ").unwrap_or("")
}

fn is_begin(line: &str) -> bool {
    line.trim_end() == "\\begin{code}"
}

/// Opening fence of a Markdown code block, if `line` is one.
fn markdown_fence(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    for marker in ['`', '~'] {
        let len = trimmed.chars().take_while(|&c| c == marker).count();
        if len >= 3 {
            return Some(&trimmed[..len]);
        }
    }
    None
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn push_block(out: &mut String, code: &[String], language: &str) {
    // A fence longer than any backtick run inside the code.
    let longest = code
        .iter()
        .flat_map(|l| l.split(|c| c != '`'))
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest.max(2) + 1);

    out.push('\n');
    out.push_str(&fence);
    out.push_str(language);
    out.push('\n');
    for line in code {
        push_line(out, line);
    }
    out.push_str(&fence);
    out.push_str("\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bird_tracks() {
        let src = "Some prose.\n\n> main :: IO ()\n> main = print 42\n\nMore prose.\n";
        let out = unlit(src, "haskell");
        assert!(out.contains("```haskell\nmain :: IO ()\nmain = print 42\n```"));
        assert!(out.contains("More prose."));
        assert!(!out.contains("> main"));
    }

    #[test]
    fn test_latex_block() {
        let src = "Text\n\\begin{code}\nx = 1\n\\end{code}\nafter\n";
        let out = unlit(src, "haskell");
        assert!(out.contains("```haskell\nx = 1\n```"));
        assert!(!out.contains("begin{code}"));
        assert!(out.contains("after"));
    }

    #[test]
    fn test_bird_inside_fence_untouched() {
        let src = "```\n> not code\n```\n";
        let out = unlit(src, "haskell");
        assert!(out.contains("> not code"));
        assert!(!out.contains("```haskell"));
    }

    #[test]
    fn test_no_literate_regions_borrows() {
        assert!(matches!(unlit("plain text\n", "haskell"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_backticks_in_code_lengthen_fence() {
        let out = unlit("> s = \"```\"\n", "haskell");
        assert!(out.contains("````haskell"));
    }

    #[test]
    fn test_unclosed_region() {
        let out = unlit("\\begin{code}\ny = 2\n", "haskell");
        assert!(out.contains("```haskell\ny = 2\n```"));
    }
}
