//! Forgiving HTML tree builder for the formatter.
//!
//! This is not a conforming HTML parser. It keeps exactly what the printer
//! needs: element names, attributes as written, text (with `{{ }}` mustaches
//! treated as opaque), comments, and raw-text element content. Stray closing
//! tags become text and unclosed elements are closed at the end of input.

use memchr::memmem;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
    /// Full comment including `<!--` and `-->`.
    Comment(String),
    /// `<!DOCTYPE ...>` and other `<!...>` declarations.
    Doctype(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    pub name: String,
    /// Attributes as `name` or `name=value`, value quoting preserved.
    pub attrs: Vec<String>,
    pub children: Vec<Node>,
    pub void: bool,
    /// Unparsed content of raw-text elements (`style`, `script`, ...).
    pub raw: Option<String>,
}

impl Element {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
            void: false,
            raw: None,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "pre", "textarea"];

fn is_one_of(name: &str, names: &[&str]) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(name))
}

/// Elements that never have content or a closing tag.
pub(crate) fn is_void_element(name: &str) -> bool {
    is_one_of(name, VOID_ELEMENTS)
}

pub(crate) fn parse(markup: &str) -> Vec<Node> {
    let mut builder = TreeBuilder::default();
    let mut pos = 0;
    let mut text_start = 0;

    while let Some(offset) = memchr::memchr2(b'<', b'{', &markup.as_bytes()[pos..]) {
        let at = pos + offset;
        let rest = &markup[at..];

        if rest.starts_with("{{") {
            // Mustaches are opaque; skip to their end.
            pos = match memmem::find(rest.as_bytes(), b"}}") {
                Some(end) => at + end + 2,
                None => markup.len(),
            };
            continue;
        }
        if !rest.starts_with('<') {
            pos = at + 1;
            continue;
        }

        let Some((item, consumed)) = parse_markup_item(rest) else {
            pos = at + 1;
            continue;
        };
        builder.text(&markup[text_start..at]);
        pos = at + consumed;

        match item {
            Item::Comment(text) => builder.push(Node::Comment(text.to_string())),
            Item::Doctype(text) => builder.push(Node::Doctype(text.to_string())),
            Item::Close(name, raw) => builder.close(name, raw),
            Item::Open(mut element, self_closing) => {
                if is_one_of(&element.name, RAW_TEXT_ELEMENTS) && !self_closing {
                    let body = &markup[pos..];
                    let end = find_close_tag(body, &element.name).unwrap_or(body.len());
                    element.raw = Some(body[..end].to_string());
                    pos += end;
                    if let Some(close_len) = body[end..].find('>') {
                        pos += close_len + 1;
                    }
                    builder.push(Node::Element(element));
                } else if element.void || self_closing {
                    builder.push(Node::Element(element));
                } else {
                    builder.open(element);
                }
            }
        }
        text_start = pos;
    }

    builder.text(&markup[text_start..]);
    builder.finish()
}

enum Item<'a> {
    Comment(&'a str),
    Doctype(&'a str),
    Close(&'a str, &'a str),
    Open(Element, bool),
}

/// Parse the tag, comment, or declaration at the start of `s`.
fn parse_markup_item(s: &str) -> Option<(Item<'_>, usize)> {
    if s.starts_with("<!--") {
        let end = memmem::find(s.as_bytes(), b"-->").map_or(s.len(), |i| i + 3);
        return Some((Item::Comment(&s[..end]), end));
    }
    if s.starts_with("<!") {
        let end = s.find('>').map_or(s.len(), |i| i + 1);
        return Some((Item::Doctype(&s[..end]), end));
    }
    if let Some(rest) = s.strip_prefix("</") {
        let name_len = tag_name_len(rest);
        if name_len == 0 {
            return None;
        }
        let end = s.find('>')? + 1;
        return Some((Item::Close(&rest[..name_len], &s[..end]), end));
    }

    let rest = &s[1..];
    let name_len = tag_name_len(rest);
    if name_len == 0 {
        return None;
    }
    let mut element = Element::new(&rest[..name_len]);
    element.void = is_void_element(&element.name);
    let (attrs, self_closing, consumed) = parse_attributes(&rest[name_len..])?;
    element.attrs = attrs;
    Some((Item::Open(element, self_closing), 1 + name_len + consumed))
}

fn tag_name_len(s: &str) -> usize {
    if !s.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return 0;
    }
    s.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'))
        .unwrap_or(s.len())
}

/// Parse attributes up to and including the closing `>` or `/>`.
fn parse_attributes(s: &str) -> Option<(Vec<String>, bool, usize)> {
    let mut attrs = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let rest = &s[i..];
        if rest.is_empty() {
            return None;
        }
        if rest.starts_with("/>") {
            return Some((attrs, true, i + 2));
        }
        if rest.starts_with('>') {
            return Some((attrs, false, i + 1));
        }
        if rest.starts_with("{{") {
            let end = memmem::find(rest.as_bytes(), b"}}")? + 2;
            attrs.push(rest[..end].to_string());
            i += end;
            continue;
        }

        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        if name_len == 0 {
            // Lone `/` that is not part of `/>`.
            i += 1;
            continue;
        }
        let name = &rest[..name_len];
        i += name_len;

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) != Some(&b'=') {
            attrs.push(name.to_string());
            continue;
        }
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        let value_start = j;
        match bytes.get(j).copied() {
            Some(quote) if quote == b'"' || quote == b'\'' => {
                let close = memchr::memchr(quote, &bytes[j + 1..])?;
                j += close + 2;
            }
            _ => {
                while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                    j += 1;
                }
            }
        }
        attrs.push(format!("{name}={}", &s[value_start..j]));
        i = j;
    }
}

/// Byte offset of `</name` (case-insensitive) in `s`.
fn find_close_tag(s: &str, name: &str) -> Option<usize> {
    let finder = memmem::Finder::new("</");
    let mut from = 0;
    while let Some(offset) = finder.find(&s.as_bytes()[from..]) {
        let at = from + offset;
        let candidate = &s[at + 2..];
        if candidate.len() >= name.len()
            && candidate.is_char_boundary(name.len())
            && candidate[..name.len()].eq_ignore_ascii_case(name)
        {
            return Some(at);
        }
        from = at + 2;
    }
    None
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Element>,
}

impl TreeBuilder {
    fn push(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let siblings = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root,
        };
        match siblings.last_mut() {
            Some(Node::Text(prev)) => prev.push_str(text),
            _ => siblings.push(Node::Text(text.to_string())),
        }
    }

    fn open(&mut self, element: Element) {
        self.stack.push(element);
    }

    fn close(&mut self, name: &str, raw: &str) {
        let Some(depth) = self.stack.iter().rposition(|e| e.is(name)) else {
            self.text(raw);
            return;
        };
        while self.stack.len() > depth {
            if let Some(element) = self.stack.pop() {
                self.push(Node::Element(element));
            }
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while let Some(element) = self.stack.pop() {
            self.push(Node::Element(element));
        }
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &Node) -> &Element {
        match node {
            Node::Element(e) => e,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_nested_elements() {
        let nodes = parse(r#"<div class="a"><p>Hi <b>there</b></p></div>"#);
        assert_eq!(nodes.len(), 1);
        let div = element(&nodes[0]);
        assert_eq!(div.attrs, vec![r#"class="a""#]);
        let p = element(&div.children[0]);
        assert_eq!(p.children[0], Node::Text("Hi ".into()));
        assert_eq!(element(&p.children[1]).name, "b");
    }

    #[test]
    fn test_parse_attributes() {
        let nodes = parse(r#"<input type = "text" disabled value='a b' data-x=1 {{ liquid 'x' }}>"#);
        let input = element(&nodes[0]);
        assert!(input.void);
        assert_eq!(
            input.attrs,
            vec![
                r#"type="text""#,
                "disabled",
                "value='a b'",
                "data-x=1",
                "{{ liquid 'x' }}"
            ]
        );
    }

    #[test]
    fn test_mustache_text_is_opaque() {
        let nodes = parse("<p>{{ liquid 'a &lt; b' }}</p>");
        let p = element(&nodes[0]);
        assert_eq!(p.children, vec![Node::Text("{{ liquid 'a &lt; b' }}".into())]);
    }

    #[test]
    fn test_raw_text_elements() {
        let nodes = parse("<style>.a > .b { color: red; }</style><p>x</p>");
        let style = element(&nodes[0]);
        assert_eq!(style.raw.as_deref(), Some(".a > .b { color: red; }"));
        assert_eq!(element(&nodes[1]).name, "p");
    }

    #[test]
    fn test_comments_and_doctype() {
        let nodes = parse("<!DOCTYPE html><!-- note --><br/>");
        assert_eq!(nodes[0], Node::Doctype("<!DOCTYPE html>".into()));
        assert_eq!(nodes[1], Node::Comment("<!-- note -->".into()));
        assert!(element(&nodes[2]).void);
    }

    #[test]
    fn test_recovers_from_bad_nesting() {
        let nodes = parse("<div><span>x</div></p>");
        let div = element(&nodes[0]);
        assert_eq!(element(&div.children[0]).name, "span");
        assert_eq!(nodes[1], Node::Text("</p>".into()));

        let nodes = parse("a < b");
        assert_eq!(nodes, vec![Node::Text("a < b".into())]);
    }
}
