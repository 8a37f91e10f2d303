//! Markup pretty-printer.
//!
//! Formats HTML containing mustache statements (`{{ helper 'arg' }}`):
//!
//! - block-level elements go on their own lines, children indented
//! - inline elements and text stay in flow on one line, whitespace collapsed
//! - `{{ liquid-block '...' }}` statements at block level get their own line
//! - `style`/`script` bodies are re-indented, `pre`/`textarea` kept verbatim
//! - opening tags wider than `print_width` break one attribute per line
//!
//! Mustaches are opaque: their contents are never reflowed. Liquid itself
//! is not understood and must be disguised first (see [`crate::template`]).
//!
//! # Example
//!
//! ```
//! use blockliquid::{FormatOptions, format_html};
//!
//! let html = format_html("<div><p>Hi   <b>there</b></p></div>", &FormatOptions::default());
//! assert_eq!(html, "<div>\n  <p>Hi <b>there</b></p>\n</div>\n");
//! ```

mod html;

use memchr::memmem;

use crate::options::FormatOptions;
use html::{Element, Node};
pub(crate) use html::is_void_element;

const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data", "dfn", "em", "i",
    "img", "input", "kbd", "label", "mark", "q", "s", "samp", "select", "small", "span",
    "strong", "sub", "sup", "textarea", "time", "u", "var", "wbr",
];

const BLOCK_HELPER: &str = "liquid-block";

/// Pretty-print `markup`. The result ends with a newline unless empty.
pub fn format_html(markup: &str, options: &FormatOptions) -> String {
    let nodes = html::parse(markup);
    let mut printer = Printer {
        options,
        out: String::with_capacity(markup.len() + markup.len() / 4),
    };
    printer.children(&nodes, 0);
    printer.out
}

struct Printer<'a> {
    options: &'a FormatOptions,
    out: String,
}

impl Printer<'_> {
    fn line(&mut self, level: usize, text: &str) {
        self.out.push_str(&self.options.indent(level));
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn width(&self, level: usize) -> usize {
        level * self.options.tab_width
    }

    fn children(&mut self, nodes: &[Node], level: usize) {
        let mut run = InlineRun::default();
        for node in nodes {
            if is_block(node) {
                for line in run.take_lines() {
                    self.line(level, &line);
                }
                self.block(node, level);
            } else {
                run.push(node);
            }
        }
        for line in run.take_lines() {
            self.line(level, &line);
        }
    }

    fn block(&mut self, node: &Node, level: usize) {
        match node {
            Node::Element(element) => self.element(element, level),
            Node::Comment(text) | Node::Doctype(text) => self.line(level, text.trim()),
            Node::Text(text) => self.line(level, text.trim()),
        }
    }

    fn element(&mut self, element: &Element, level: usize) {
        let open = open_tag(element);
        if element.void {
            self.open_tag(element, level, &open);
            return;
        }

        let close = format!("</{}>", element.name);
        if let Some(raw) = &element.raw {
            self.raw_element(element, level, &open, &close, raw);
            return;
        }

        if element.children.iter().any(is_block) {
            self.open_tag(element, level, &open);
            self.children(&element.children, level + 1);
            self.line(level, &close);
            return;
        }

        let mut run = InlineRun::default();
        for child in &element.children {
            run.push(child);
        }
        let lines = run.take_lines();
        if lines.len() <= 1 {
            let inner = lines.first().map_or("", String::as_str);
            let single = format!("{open}{inner}{close}");
            if lines.is_empty() || self.width(level) + single.len() <= self.options.print_width {
                self.line(level, &single);
                return;
            }
        }
        self.open_tag(element, level, &open);
        for line in &lines {
            self.line(level + 1, line);
        }
        self.line(level, &close);
    }

    fn raw_element(&mut self, element: &Element, level: usize, open: &str, close: &str, raw: &str) {
        if raw.trim().is_empty() {
            self.line(level, &format!("{open}{close}"));
            return;
        }
        if element.is("pre") || element.is("textarea") {
            self.line(level, &format!("{open}{raw}{close}"));
            return;
        }

        self.open_tag(element, level, open);
        let body = raw.trim_end().trim_start_matches(['\n', '\r']);
        let margin = body
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.len() - l.trim_start().len())
            .min()
            .unwrap_or(0);
        for line in body.lines() {
            if line.trim().is_empty() {
                self.out.push('\n');
            } else {
                let line = line.get(margin..).unwrap_or_else(|| line.trim_start());
                self.line(level + 1, line.trim_end());
            }
        }
        self.line(level, close);
    }

    fn open_tag(&mut self, element: &Element, level: usize, open: &str) {
        if element.attrs.is_empty() || self.width(level) + open.len() <= self.options.print_width {
            self.line(level, open);
            return;
        }
        self.line(level, &format!("<{}", element.name));
        for attr in &element.attrs {
            self.line(level + 1, attr);
        }
        self.line(level, if element.void { "/>" } else { ">" });
    }
}

fn open_tag(element: &Element) -> String {
    let mut tag = format!("<{}", element.name);
    for attr in &element.attrs {
        tag.push(' ');
        tag.push_str(attr);
    }
    tag.push_str(if element.void { " />" } else { ">" });
    tag
}

fn is_block(node: &Node) -> bool {
    match node {
        Node::Element(element) => !INLINE_ELEMENTS
            .iter()
            .any(|name| element.name.eq_ignore_ascii_case(name)),
        Node::Comment(_) | Node::Doctype(_) => true,
        Node::Text(_) => false,
    }
}

/// Consecutive inline content laid out as lines.
#[derive(Default)]
struct InlineRun {
    lines: Vec<String>,
    current: String,
}

impl InlineRun {
    fn push(&mut self, node: &Node) {
        match node {
            Node::Text(text) => {
                for segment in segments(text) {
                    match segment {
                        Segment::Mustache(m) if is_block_statement(m) => {
                            self.break_line();
                            self.lines.push(m.to_string());
                        }
                        Segment::Mustache(m) => self.current.push_str(m),
                        Segment::Text(t) => push_collapsed(&mut self.current, t),
                    }
                }
            }
            other => render_inline(other, &mut self.current),
        }
    }

    fn break_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        let line = line.trim();
        if !line.is_empty() {
            self.lines.push(line.to_string());
        }
    }

    fn take_lines(&mut self) -> Vec<String> {
        self.break_line();
        std::mem::take(&mut self.lines)
    }
}

/// Render a node on a single line.
fn render_inline(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => {
            for segment in segments(text) {
                match segment {
                    Segment::Mustache(m) => out.push_str(m),
                    Segment::Text(t) => push_collapsed(out, t),
                }
            }
        }
        Node::Comment(text) | Node::Doctype(text) => out.push_str(text),
        Node::Element(element) => {
            out.push_str(&open_tag(element));
            if element.void {
                return;
            }
            match &element.raw {
                Some(raw) => out.push_str(raw),
                None => {
                    for child in &element.children {
                        render_inline(child, out);
                    }
                }
            }
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }
    }
}

/// Append `text` with each whitespace run collapsed to one space.
fn push_collapsed(out: &mut String, text: &str) {
    for c in text.chars() {
        if c.is_whitespace() {
            if !out.ends_with(' ') {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
}

enum Segment<'a> {
    Text(&'a str),
    Mustache(&'a str),
}

fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = memmem::find(rest.as_bytes(), b"{{") {
        let Some(len) = memmem::find(&rest.as_bytes()[start..], b"}}") else {
            break;
        };
        if start > 0 {
            out.push(Segment::Text(&rest[..start]));
        }
        out.push(Segment::Mustache(&rest[start..start + len + 2]));
        rest = &rest[start + len + 2..];
    }
    if !rest.is_empty() {
        out.push(Segment::Text(rest));
    }
    out
}

fn is_block_statement(mustache: &str) -> bool {
    mustache
        .strip_prefix("{{")
        .map(str::trim_start)
        .and_then(|body| body.strip_prefix(BLOCK_HELPER))
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}
