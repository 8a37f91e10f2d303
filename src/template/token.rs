//! Delimiter tokenizer for Liquid markup.

use crate::expr::{PART_END, PART_START, TEMPLATE_END, TEMPLATE_START};

/// One lexical unit of markup.
///
/// Delimiter tokens are always balanced: the tokenizer matches them with a
/// stack and demotes unmatched ones to [`Token::Text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    /// `{{`
    OutputOpen,
    /// `}}`
    OutputClose,
    /// `{%`
    TagOpen,
    /// `%}`
    TagClose,
    TemplateStart,
    PartStart,
    PartEnd,
    TemplateEnd,
}

impl Token {
    /// Source text of the token.
    pub fn as_str(&self) -> &str {
        match self {
            Token::Text(text) => text,
            Token::OutputOpen => "{{",
            Token::OutputClose => "}}",
            Token::TagOpen => "{%",
            Token::TagClose => "%}",
            Token::TemplateStart => TEMPLATE_START,
            Token::PartStart => PART_START,
            Token::PartEnd => PART_END,
            Token::TemplateEnd => TEMPLATE_END,
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            Token::TemplateStart | Token::PartStart | Token::PartEnd | Token::TemplateEnd
        )
    }

    pub(crate) fn is_open(&self) -> bool {
        matches!(
            self,
            Token::OutputOpen | Token::TagOpen | Token::TemplateStart | Token::PartStart
        )
    }

    /// The closing token that balances this opening token.
    pub(crate) fn closer(&self) -> Option<Token> {
        match self {
            Token::OutputOpen => Some(Token::OutputClose),
            Token::TagOpen => Some(Token::TagClose),
            Token::TemplateStart => Some(Token::TemplateEnd),
            Token::PartStart => Some(Token::PartEnd),
            _ => None,
        }
    }

    pub(crate) fn is_blank_text(&self) -> bool {
        matches!(self, Token::Text(text) if text.trim().is_empty())
    }
}

/// Delimiters in match priority at a single position.
const DELIMITERS: &[Token] = &[
    Token::TemplateStart,
    Token::PartStart,
    Token::PartEnd,
    Token::TemplateEnd,
    Token::OutputOpen,
    Token::OutputClose,
    Token::TagOpen,
    Token::TagClose,
];

/// Split markup into text and delimiter tokens.
pub fn tokenize(markup: &str) -> Vec<Token> {
    let bytes = markup.as_bytes();
    let mut tokens: Vec<Token> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(at) = next_candidate(bytes, pos) {
        let rest = &markup[at..];
        let Some(delimiter) = DELIMITERS.iter().find(|d| rest.starts_with(d.as_str())) else {
            pos = at + 1;
            continue;
        };

        let accepted = if delimiter.is_open() {
            // Substitutions only exist inside a template literal.
            *delimiter != Token::PartStart
                || open.last().is_some_and(|&i| tokens[i] == Token::TemplateStart)
        } else {
            open.last()
                .and_then(|&i| tokens[i].closer())
                .is_some_and(|closer| closer == *delimiter)
        };
        if !accepted {
            pos = at + 1;
            continue;
        }

        if text_start < at {
            tokens.push(Token::Text(markup[text_start..at].to_string()));
        }
        if delimiter.is_open() {
            open.push(tokens.len());
        } else {
            open.pop();
        }
        tokens.push(delimiter.clone());
        pos = at + delimiter.as_str().len();
        text_start = pos;
    }
    if text_start < markup.len() {
        tokens.push(Token::Text(markup[text_start..].to_string()));
    }

    for index in open {
        tokens[index] = Token::Text(tokens[index].as_str().to_string());
    }
    merge_text(tokens)
}

/// Position of the next byte that can start a delimiter.
fn next_candidate(bytes: &[u8], from: usize) -> Option<usize> {
    let haystack = bytes.get(from..)?;
    let braces = memchr::memchr3(b'{', b'}', b'%', haystack);
    let markers = memchr::memchr2(b'`', b'_', haystack);
    let offset = match (braces, markers) {
        (Some(a), Some(b)) => a.min(b),
        (a, b) => a.or(b)?,
    };
    Some(from + offset)
}

/// Join runs of adjacent text tokens.
pub(crate) fn merge_text(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match (merged.last_mut(), token) {
            (_, Token::Text(text)) if text.is_empty() => {}
            (Some(Token::Text(prev)), Token::Text(text)) => prev.push_str(&text),
            (_, token) => merged.push(token),
        }
    }
    merged
}

/// Index of the balancing token for every delimiter.
pub(crate) fn pairs(tokens: &[Token]) -> Vec<Option<usize>> {
    let mut matches = vec![None; tokens.len()];
    let mut stack = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.is_open() {
            stack.push(i);
        } else if !matches!(token, Token::Text(_)) {
            if let Some(open) = stack.pop() {
                matches[open] = Some(i);
                matches[i] = Some(open);
            }
        }
    }
    matches
}

/// Concatenate tokens back into markup.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(token.as_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Token {
        Token::Text(s.to_string())
    }

    #[test]
    fn test_tokenize_output_and_tag() {
        let tokens = tokenize("<p>{{ title }}</p>{% if x %}");
        assert_eq!(
            tokens,
            vec![
                text("<p>"),
                Token::OutputOpen,
                text(" title "),
                Token::OutputClose,
                text("</p>"),
                Token::TagOpen,
                text(" if x "),
                Token::TagClose,
            ]
        );
    }

    #[test]
    fn test_unmatched_delimiters_degrade_to_text() {
        assert_eq!(tokenize("a }} b"), vec![text("a }} b")]);
        assert_eq!(tokenize("width:100%}"), vec![text("width:100%}")]);
        assert_eq!(tokenize("{{ open"), vec![text("{{ open")]);
        assert_eq!(tokenize("{{ a %}"), vec![text("{{ a %}")]);
    }

    #[test]
    fn test_nested_output_around_tag() {
        let tokens = tokenize("{{ {% if a %} }}");
        assert_eq!(tokens[0], Token::OutputOpen);
        assert_eq!(tokens[2], Token::TagOpen);
        assert_eq!(tokens[4], Token::TagClose);
        assert_eq!(tokens[6], Token::OutputClose);
    }

    #[test]
    fn test_template_markers() {
        let source = format!("{{{{ {TEMPLATE_START}/p/{PART_START}{{{{ h }}}}{PART_END}{TEMPLATE_END} }}}}");
        let tokens = tokenize(&source);
        assert_eq!(
            tokens,
            vec![
                Token::OutputOpen,
                text(" "),
                Token::TemplateStart,
                text("/p/"),
                Token::PartStart,
                Token::OutputOpen,
                text(" h "),
                Token::OutputClose,
                Token::PartEnd,
                Token::TemplateEnd,
                text(" "),
                Token::OutputClose,
            ]
        );
    }

    #[test]
    fn test_part_start_outside_template_is_text() {
        assert_eq!(tokenize(PART_START), vec![text(PART_START)]);
    }

    #[test]
    fn test_render_restores_source() {
        for source in ["a {{ b }} c", "{% for x in y %}{{ x }}{% endfor %}", "}} {{", "{{{ x }}}"] {
            assert_eq!(render(&tokenize(source)), source);
        }
    }

    #[test]
    fn test_pairs() {
        let tokens = tokenize("{{ a }}{% b %}");
        let matches = pairs(&tokens);
        assert_eq!(matches[0], Some(2));
        assert_eq!(matches[2], Some(0));
        assert_eq!(matches[1], None);
        assert_eq!(matches[3], Some(5));
    }
}
