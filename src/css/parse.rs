//! Stylesheet parsing into a minimal rule model.
//!
//! Selectors, values, and at-rule preludes are kept as normalized source
//! text; nothing is interpreted beyond what minification needs.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, ParseErrorKind, Parser, ParserInput,
    ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser,
};

use crate::error::{Error, Result};

/// A parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub nodes: Vec<CssNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssNode {
    Rule(Rule),
    AtRule(AtRule),
}

/// A style rule. Selectors are stored without combinator padding
/// (`.a>.b`, `.a+.b`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    /// Value without `!important`, commas unpadded.
    pub value: String,
    pub important: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// Lowercased name without `@`.
    pub name: String,
    pub prelude: String,
    pub body: AtRuleBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtRuleBody {
    /// Statement at-rule such as `@import url(x);`.
    Statement,
    Rules(Vec<CssNode>),
    Declarations(Vec<Declaration>),
}

impl AtRule {
    /// At-rules whose block holds rules rather than declarations.
    fn holds_rules(name: &str) -> bool {
        matches!(
            name,
            "media" | "supports" | "container" | "layer" | "document" | "-moz-document" | "scope"
        ) || name.ends_with("keyframes")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RuleError {
    EmptySelector,
    EmptyValue,
}

impl Stylesheet {
    /// Parse a stylesheet. Invalid declarations are dropped; invalid rules
    /// (including rules with an empty selector) are errors.
    pub fn parse(css: &str) -> Result<Self> {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rule_parser = CssParser { declarations: false };

        let mut nodes = Vec::new();
        for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
            match result {
                Ok(Item::Node(node)) => nodes.push(node),
                Ok(Item::Declaration(_)) => {}
                Err((error, slice)) => return Err(minification_error(&error, slice)),
            }
        }
        Ok(Self { nodes })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn minification_error(error: &ParseError<'_, RuleError>, slice: &str) -> Error {
    let message = match &error.kind {
        ParseErrorKind::Custom(RuleError::EmptySelector) => "empty selector".to_string(),
        ParseErrorKind::Custom(RuleError::EmptyValue) => "empty declaration".to_string(),
        ParseErrorKind::Basic(kind) => format!("invalid rule ({kind:?})"),
    };
    let location = error.location;
    Error::StyleMinification {
        message: format!("{message} at {}:{}", location.line + 1, location.column),
        snippet: slice.chars().take(80).collect(),
    }
}

enum Item {
    Node(CssNode),
    Declaration(Declaration),
}

/// One parser for every level: `declarations` selects whether a block body
/// holds declarations or nested rules.
struct CssParser {
    declarations: bool,
}

impl<'i> QualifiedRuleParser<'i> for CssParser {
    type Prelude = Vec<String>;
    type QualifiedRule = Item;
    type Error = RuleError;

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        let selectors: Vec<String> = split_top_level(input.slice_from(start), ',')
            .into_iter()
            .map(normalize_selector)
            .collect();
        if selectors.iter().any(String::is_empty) {
            return Err(input.new_custom_error(RuleError::EmptySelector));
        }
        Ok(selectors)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        Ok(Item::Node(CssNode::Rule(Rule {
            selectors: prelude,
            declarations: parse_declarations(input),
        })))
    }
}

impl<'i> AtRuleParser<'i> for CssParser {
    type Prelude = (String, String);
    type AtRule = Item;
    type Error = RuleError;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        Ok((
            name.to_ascii_lowercase(),
            normalize_value(input.slice_from(start)),
        ))
    }

    fn rule_without_block(
        &mut self,
        (name, prelude): Self::Prelude,
        _start: &ParserState,
    ) -> std::result::Result<Self::AtRule, ()> {
        Ok(Item::Node(CssNode::AtRule(AtRule {
            name,
            prelude,
            body: AtRuleBody::Statement,
        })))
    }

    fn parse_block<'t>(
        &mut self,
        (name, prelude): Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::AtRule, ParseError<'i, Self::Error>> {
        let body = if AtRule::holds_rules(&name) {
            AtRuleBody::Rules(parse_rule_list(input)?)
        } else {
            AtRuleBody::Declarations(parse_declarations(input))
        };
        Ok(Item::Node(CssNode::AtRule(AtRule {
            name,
            prelude,
            body,
        })))
    }
}

impl<'i> DeclarationParser<'i> for CssParser {
    type Declaration = Item;
    type Error = RuleError;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> std::result::Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let (value, important) = split_important(input.slice_from(start));
        let value = normalize_value(value);
        if value.is_empty() {
            return Err(input.new_custom_error(RuleError::EmptyValue));
        }
        Ok(Item::Declaration(Declaration {
            property: name.to_string(),
            value,
            important,
        }))
    }
}

impl<'i> RuleBodyItemParser<'i, Item, RuleError> for CssParser {
    fn parse_declarations(&self) -> bool {
        self.declarations
    }

    fn parse_qualified(&self) -> bool {
        !self.declarations
    }
}

fn parse_declarations(input: &mut Parser<'_, '_>) -> Vec<Declaration> {
    let mut parser = CssParser { declarations: true };
    RuleBodyParser::new(input, &mut parser)
        .filter_map(|result| match result {
            // Invalid and empty declarations are dropped.
            Ok(Item::Declaration(declaration)) => Some(declaration),
            _ => None,
        })
        .collect()
}

fn parse_rule_list<'i>(
    input: &mut Parser<'i, '_>,
) -> std::result::Result<Vec<CssNode>, ParseError<'i, RuleError>> {
    let mut parser = CssParser {
        declarations: false,
    };
    let mut nodes = Vec::new();
    for result in RuleBodyParser::new(input, &mut parser) {
        match result {
            Ok(Item::Node(node)) => nodes.push(node),
            Ok(Item::Declaration(_)) => {}
            Err((error, _)) => return Err(error),
        }
    }
    Ok(nodes)
}

/// Split a trailing `!important` off a raw value.
fn split_important(raw: &str) -> (&str, bool) {
    let trimmed = raw.trim_end();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(head) = lower.strip_suffix("important") {
        let head = head.trim_end();
        if let Some(head) = head.strip_suffix('!') {
            return (&trimmed[..head.len()], true);
        }
    }
    (raw, false)
}

/// Split on `separator` outside of strings, parentheses, and brackets.
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        match quote {
            Some(_) if c == '\\' => {
                chars.next();
            }
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                c if c == separator && depth == 0 => {
                    parts.push(&text[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Visit `text` outside comments, tracking string and nesting state. The
/// callback gets each character with `(in_string, depth)`.
fn scan(text: &str, mut visit: impl FnMut(char, bool, usize)) {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            visit(c, true, depth);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut prev = '\0';
            for c in chars.by_ref() {
                if prev == '*' && c == '/' {
                    break;
                }
                prev = c;
            }
            // A comment separates tokens like whitespace does.
            visit(' ', false, depth);
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        visit(c, false, depth);
    }
}

/// Drop comments, collapse whitespace, and remove spaces around commas,
/// outside of strings.
pub(crate) fn normalize_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    scan(raw, |c, in_string, _| {
        if !in_string && c.is_whitespace() {
            pending_space = true;
            return;
        }
        if pending_space && !out.is_empty() && !out.ends_with(',') && !(c == ',' && !in_string) {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    });
    out
}

/// Normalize one selector: comments dropped, whitespace collapsed, and
/// padding around `>`, `+`, `~` removed outside of parentheses and brackets.
pub(crate) fn normalize_selector(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    scan(raw, |c, in_string, depth| {
        let combinator = !in_string && depth == 0 && matches!(c, '>' | '+' | '~');
        if !in_string && c.is_whitespace() {
            pending_space = true;
            return;
        }
        let after_combinator = out.ends_with(['>', '+', '~']) && depth == 0;
        if pending_space && !out.is_empty() && !combinator && !after_combinator {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    });
    out
}
