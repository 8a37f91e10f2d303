//! Stylesheet serialization: minified and pretty-printed.

use std::fmt::Write;

use super::parse::{AtRule, AtRuleBody, CssNode, Declaration, Rule, Stylesheet};
use crate::options::FormatOptions;

/// Serialize without optional whitespace: `.a,.b{color:red;margin:0}`.
pub fn minified(sheet: &Stylesheet) -> String {
    let mut out = String::new();
    write_nodes(&mut out, &sheet.nodes);
    out
}

fn write_nodes(out: &mut String, nodes: &[CssNode]) {
    for node in nodes {
        match node {
            CssNode::Rule(rule) => {
                out.push_str(&rule.selectors.join(","));
                write_block(out, &rule.declarations);
            }
            CssNode::AtRule(at_rule) => {
                out.push('@');
                out.push_str(&at_rule.name);
                if !at_rule.prelude.is_empty() {
                    out.push(' ');
                    out.push_str(&at_rule.prelude);
                }
                match &at_rule.body {
                    AtRuleBody::Statement => out.push(';'),
                    AtRuleBody::Rules(children) => {
                        out.push('{');
                        write_nodes(out, children);
                        out.push('}');
                    }
                    AtRuleBody::Declarations(declarations) => write_block(out, declarations),
                }
            }
        }
    }
}

fn write_block(out: &mut String, declarations: &[Declaration]) {
    out.push('{');
    for (i, declaration) in declarations.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        write!(out, "{}:{}", declaration.property, declaration.value).unwrap();
        if declaration.important {
            out.push_str("!important");
        }
    }
    out.push('}');
}

/// Pretty-print with one declaration per line, selectors one per line, and a
/// blank line between top-level nodes. Ends with a newline unless empty.
pub fn pretty(sheet: &Stylesheet, options: &FormatOptions) -> String {
    let mut printer = PrettyPrinter {
        options,
        out: String::new(),
    };
    for (i, node) in sheet.nodes.iter().enumerate() {
        if i > 0 {
            printer.out.push('\n');
        }
        printer.node(node, 0);
    }
    printer.out
}

struct PrettyPrinter<'a> {
    options: &'a FormatOptions,
    out: String,
}

impl PrettyPrinter<'_> {
    fn line(&mut self, level: usize, text: &str) {
        self.out.push_str(&self.options.indent(level));
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn node(&mut self, node: &CssNode, level: usize) {
        match node {
            CssNode::Rule(rule) => self.rule(rule, level),
            CssNode::AtRule(at_rule) => self.at_rule(at_rule, level),
        }
    }

    fn rule(&mut self, rule: &Rule, level: usize) {
        let last = rule.selectors.len().saturating_sub(1);
        for (i, selector) in rule.selectors.iter().enumerate() {
            let selector = pad_combinators(selector);
            if i == last {
                self.line(level, &format!("{selector} {{"));
            } else {
                self.line(level, &format!("{selector},"));
            }
        }
        self.declarations(&rule.declarations, level + 1);
        self.line(level, "}");
    }

    fn at_rule(&mut self, at_rule: &AtRule, level: usize) {
        let mut head = format!("@{}", at_rule.name);
        if !at_rule.prelude.is_empty() {
            head.push(' ');
            head.push_str(&pretty_value(&at_rule.prelude));
        }
        match &at_rule.body {
            AtRuleBody::Statement => self.line(level, &format!("{head};")),
            AtRuleBody::Rules(children) => {
                self.line(level, &format!("{head} {{"));
                for child in children {
                    self.node(child, level + 1);
                }
                self.line(level, "}");
            }
            AtRuleBody::Declarations(declarations) => {
                self.line(level, &format!("{head} {{"));
                self.declarations(declarations, level + 1);
                self.line(level, "}");
            }
        }
    }

    fn declarations(&mut self, declarations: &[Declaration], level: usize) {
        for declaration in declarations {
            let important = if declaration.important { " !important" } else { "" };
            let text = format!(
                "{}: {}{important};",
                declaration.property,
                pretty_value(&declaration.value)
            );
            self.line(level, &text);
        }
    }
}

/// `a,b` -> `a, b` outside strings and `url()`.
fn pretty_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    let mut quote: Option<char> = None;
    let mut url_depth: Option<usize> = None;
    let mut depth = 0usize;
    let mut escaped = false;

    for c in value.chars() {
        if let Some(q) = quote {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' if url_depth.is_none() => quote = Some(c),
            '(' => {
                depth += 1;
                if url_depth.is_none() && ends_with_ignore_case(&out, "url") {
                    url_depth = Some(depth);
                }
            }
            ')' => {
                if url_depth == Some(depth) {
                    url_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            ',' if url_depth.is_none() => {
                out.push_str(", ");
                continue;
            }
            _ => {}
        }
        out.push(c);
    }
    out
}

fn ends_with_ignore_case(s: &str, suffix: &str) -> bool {
    s.len() >= suffix.len()
        && s.is_char_boundary(s.len() - suffix.len())
        && s[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// `.a>.b` -> `.a > .b` for combinators outside parentheses, brackets, and
/// strings.
fn pad_combinators(selector: &str) -> String {
    let mut out = String::with_capacity(selector.len() + 8);
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    for c in selector.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            out.push(c);
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '>' | '+' | '~' if depth == 0 => {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
                out.push(c);
                out.push(' ');
                continue;
            }
            _ => {}
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_value() {
        assert_eq!(pretty_value("rgba(0,0,0,.5)"), "rgba(0, 0, 0, .5)");
        assert_eq!(pretty_value("\"a,b\",serif"), "\"a,b\", serif");
        assert_eq!(
            pretty_value("url(data:image/png;base64,AAA),none"),
            "url(data:image/png;base64,AAA), none"
        );
    }

    #[test]
    fn test_pad_combinators() {
        assert_eq!(pad_combinators(".a>.b"), ".a > .b");
        assert_eq!(pad_combinators(".a .b+.c~.d"), ".a .b + .c ~ .d");
        assert_eq!(pad_combinators("li:nth-child(2n+1)"), "li:nth-child(2n+1)");
        assert_eq!(pad_combinators(">.a"), "> .a");
    }
}
