//! Fixed-point structural cleanup of tokenized markup.
//!
//! One pass applies, in order:
//!
//! 1. unwrap `{{ }}` directly enclosing a `{% %}` tag or a template literal
//! 2. strip template-literal marker tokens
//! 3. merge adjacent text tokens
//! 4. rewrite `for (a in b)` tag bodies to `for a in b`
//!
//! Steps 1-3 remove at least one token whenever they change anything. Step 4
//! never creates work for steps 1-3 and is complete after one pass, so a
//! pass that does not shrink the token list is the last productive one. The
//! loop therefore needs at most `tokens + 1` productive passes.

use tracing::trace;

use super::token::{Token, merge_text, pairs, render};
use crate::error::{Error, Result};
use crate::util::strip_outer_parens;

/// Run cleanup passes until nothing changes.
pub fn cleanup(mut tokens: Vec<Token>) -> Result<Vec<Token>> {
    let limit = tokens.len() + 1;
    let mut passes = 0;
    loop {
        let (next, changed) = pass(tokens);
        tokens = next;
        if !changed {
            trace!(passes, "template cleanup reached a fixed point");
            return Ok(tokens);
        }
        passes += 1;
        if passes > limit {
            return Err(Error::NonConvergentRewrite {
                iterations: passes,
                snippet: snippet(&render(&tokens)),
            });
        }
    }
}

/// Tokenize, clean up, and render markup.
pub fn cleanup_markup(markup: &str) -> Result<String> {
    let tokens = cleanup(super::token::tokenize(markup))?;
    Ok(render(&tokens))
}

fn pass(tokens: Vec<Token>) -> (Vec<Token>, bool) {
    let before = tokens.len();

    let tokens = unwrap_outputs(tokens);
    let tokens: Vec<Token> = tokens.into_iter().filter(|t| !t.is_marker()).collect();
    let mut tokens = merge_text(tokens);

    let mut rewritten = false;
    for i in 1..tokens.len().saturating_sub(1) {
        if tokens[i - 1] != Token::TagOpen || tokens[i + 1] != Token::TagClose {
            continue;
        }
        if let Token::Text(body) = &tokens[i] {
            if let Some(body) = rewrite_for_parens(body) {
                tokens[i] = Token::Text(body);
                rewritten = true;
            }
        }
    }

    let changed = rewritten || tokens.len() != before;
    (tokens, changed)
}

/// Remove `{{`/`}}` pairs whose only non-blank content is one balanced tag
/// or template literal, along with the blank padding inside them.
fn unwrap_outputs(tokens: Vec<Token>) -> Vec<Token> {
    let matches = pairs(&tokens);
    let mut keep = vec![true; tokens.len()];

    for (open, token) in tokens.iter().enumerate() {
        if *token != Token::OutputOpen {
            continue;
        }
        let Some(close) = matches[open] else {
            continue;
        };

        let mut first = open + 1;
        let mut last = close.saturating_sub(1);
        if first < close && tokens[first].is_blank_text() {
            first += 1;
        }
        if last > first && tokens[last].is_blank_text() {
            last -= 1;
        }
        let encloses_group = first < last
            && matches!(tokens[first], Token::TagOpen | Token::TemplateStart)
            && matches[first] == Some(last);
        if !encloses_group {
            continue;
        }

        for index in (open..first).chain(last + 1..=close) {
            keep[index] = false;
        }
    }

    tokens
        .into_iter()
        .zip(keep)
        .filter_map(|(token, keep)| keep.then_some(token))
        .collect()
}

/// `for (a in b)` -> `for a in b`, keeping the surrounding whitespace.
fn rewrite_for_parens(body: &str) -> Option<String> {
    let trimmed = body.trim_start();
    let lead = &body[..body.len() - trimmed.len()];
    let trimmed = trimmed.trim_end();
    let trail = &body[lead.len() + trimmed.len()..];

    let rest = trimmed.strip_prefix("for")?;
    let mut inner = rest.trim_start();
    if !inner.starts_with('(') {
        return None;
    }
    while let Some(stripped) = strip_outer_parens(inner) {
        inner = stripped.trim();
    }
    if inner.starts_with('(') {
        return None;
    }
    Some(format!("{lead}for {inner}{trail}"))
}

fn snippet(text: &str) -> String {
    text.chars().take(80).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{PART_END, PART_START, TEMPLATE_END, TEMPLATE_START};
    use crate::template::token::tokenize;

    fn clean(markup: &str) -> String {
        cleanup_markup(markup).unwrap()
    }

    #[test]
    fn test_unwraps_output_around_tag() {
        assert_eq!(clean("{{ {% if a %} }}x{{ {% endif %} }}"), "{% if a %}x{% endif %}");
        assert_eq!(clean("{{{% endif %}}}"), "{% endif %}");
    }

    #[test]
    fn test_unwraps_template_literal() {
        let markup = format!(
            r#"<a href="{{{{ {TEMPLATE_START}/products/{PART_START}{{{{ handle }}}}{PART_END}{TEMPLATE_END} }}}}">"#
        );
        assert_eq!(clean(&markup), r#"<a href="/products/{{ handle }}">"#);
    }

    #[test]
    fn test_strips_stray_markers() {
        let markup = format!("{TEMPLATE_START}x{TEMPLATE_END}");
        assert_eq!(clean(&markup), "x");
    }

    #[test]
    fn test_keeps_plain_output_tags() {
        assert_eq!(clean("<p>{{ title }}</p>"), "<p>{{ title }}</p>");
        assert_eq!(clean("{{ a }}{{ b }}"), "{{ a }}{{ b }}");
    }

    #[test]
    fn test_rewrites_for_parens() {
        assert_eq!(
            clean("{% for (x in items) %}{{ x }}{% endfor %}"),
            "{% for x in items %}{{ x }}{% endfor %}"
        );
        assert_eq!(clean("{%for ((x in y))%}"), "{%for x in y%}");
        assert_eq!(clean("{% for x in y %}"), "{% for x in y %}");
        assert_eq!(clean("{% form (x) %}"), "{% form (x) %}");
        assert_eq!(clean("{% for (a) in (b) %}"), "{% for (a) in (b) %}");
    }

    #[test]
    fn test_nested_unwrap_converges() {
        assert_eq!(clean("{{ {{ {% if a %} }} }}"), "{% if a %}");
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let inputs = [
            "{{ {% if a %} }}<b>{{ a }}</b>{{ {% endif %} }}",
            "text only",
            "{% for (a in b) %}",
            "}} {{ {%",
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_pass_count_is_bounded() {
        let tokens = tokenize("{{ {{ {{ {% x %} }} }} }}");
        let limit = tokens.len() + 1;
        let cleaned = cleanup(tokens).unwrap();
        assert!(cleaned.len() < limit);
        assert_eq!(render(&cleaned), "{% x %}");
    }
}
