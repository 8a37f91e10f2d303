//! Tokenizer for binding expressions.

use std::iter::Peekable;
use std::str::CharIndices;

use super::Failure;

/// One piece of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TemplatePiece {
    Text(String),
    /// Source text of a `${ ... }` substitution.
    Expr(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Number(String),
    Str(String),
    Template(Vec<TemplatePiece>),
    Punct(&'static str),
}

/// Operators and punctuation, longest first.
const PUNCTUATION: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", ".", "[", "]", "(", ")", ",", "!", "<",
    ">", "+", "-", "*", "/", "%",
];

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, Failure> {
    let mut lexer = Lexer {
        src: input,
        chars: input.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl Lexer<'_> {
    fn next_token(&mut self) -> Result<Option<Token>, Failure> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let Some(&(start, c)) = self.chars.peek() else {
            return Ok(None);
        };

        if is_ident_start(c) {
            let mut end = start;
            while let Some((i, ch)) = self.chars.next_if(|(_, ch)| is_ident_continue(*ch)) {
                end = i + ch.len_utf8();
            }
            return Ok(Some(Token::Ident(self.src[start..end].to_string())));
        }

        if c.is_ascii_digit() {
            return Ok(Some(Token::Number(self.number(start))));
        }

        match c {
            '\'' | '"' => {
                self.chars.next();
                self.string(c).map(|s| Some(Token::Str(s)))
            }
            '`' => {
                self.chars.next();
                self.template().map(|parts| Some(Token::Template(parts)))
            }
            _ => {
                let rest = &self.src[start..];
                let Some(punct) = PUNCTUATION.iter().find(|p| rest.starts_with(**p)) else {
                    return Err(Failure::Syntax(format!("unexpected character `{c}`")));
                };
                for _ in 0..punct.len() {
                    self.chars.next();
                }
                Ok(Some(Token::Punct(punct)))
            }
        }
    }

    fn number(&mut self, start: usize) -> String {
        let mut end = start;
        let mut seen_dot = false;
        while let Some(&(i, ch)) = self.chars.peek() {
            if ch.is_ascii_digit() {
                end = i + 1;
                self.chars.next();
            } else if ch == '.' && !seen_dot && self.digit_follows(i + 1) {
                seen_dot = true;
                end = i + 1;
                self.chars.next();
            } else {
                break;
            }
        }
        self.src[start..end].to_string()
    }

    fn digit_follows(&self, at: usize) -> bool {
        self.src[at..].starts_with(|c: char| c.is_ascii_digit())
    }

    fn string(&mut self, quote: char) -> Result<String, Failure> {
        let mut value = String::new();
        while let Some((_, ch)) = self.chars.next() {
            match ch {
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, esc)) => value.push(esc),
                    None => break,
                },
                c if c == quote => return Ok(value),
                c => value.push(c),
            }
        }
        Err(Failure::Syntax("unterminated string literal".to_string()))
    }

    fn template(&mut self) -> Result<Vec<TemplatePiece>, Failure> {
        let mut parts = Vec::new();
        let mut text = String::new();
        while let Some((i, ch)) = self.chars.next() {
            match ch {
                '`' => {
                    if !text.is_empty() {
                        parts.push(TemplatePiece::Text(text));
                    }
                    return Ok(parts);
                }
                '\\' => {
                    if let Some((_, esc)) = self.chars.next() {
                        text.push(esc);
                    }
                }
                '$' if self.src[i + 1..].starts_with('{') => {
                    self.chars.next();
                    if !text.is_empty() {
                        parts.push(TemplatePiece::Text(std::mem::take(&mut text)));
                    }
                    parts.push(TemplatePiece::Expr(self.substitution(i + 2)?));
                }
                c => text.push(c),
            }
        }
        Err(Failure::Syntax("unterminated template literal".to_string()))
    }

    /// Consume a `${ ... }` body starting at byte `start`, returning its source.
    fn substitution(&mut self, start: usize) -> Result<String, Failure> {
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        while let Some((i, ch)) = self.chars.next() {
            if let Some(q) = quote {
                if ch == '\\' {
                    self.chars.next();
                } else if ch == q {
                    quote = None;
                }
                continue;
            }
            match ch {
                '\'' | '"' | '`' => quote = Some(ch),
                '{' => depth += 1,
                '}' if depth == 0 => return Ok(self.src[start..i].to_string()),
                '}' => depth -= 1,
                _ => {}
            }
        }
        Err(Failure::Syntax("unterminated template substitution".to_string()))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
