//! Utility functions with platform-specific implementations.

use std::borrow::Cow;

use chrono::{DateTime, Utc};

/// Get the current UTC time.
///
/// On native platforms, uses the system clock.
/// On WASM, uses `js_sys::Date::now()`.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(target_arch = "wasm32")]
pub fn now_utc() -> DateTime<Utc> {
    // js_sys::Date::now() returns milliseconds as f64
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

/// Format a timestamp the way HTTP dates and `Date.toUTCString()` do,
/// e.g. `Mon, 19 Oct 2026 08:30:00 GMT`.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Escape special HTML characters for text and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Named and numeric entities that leak into styles and expressions during
/// markup templating.
const ENTITIES: &[(&str, char)] = &[
    ("&gt;", '>'),
    ("&lt;", '<'),
    ("&quot;", '"'),
    ("&#34;", '"'),
    ("&apos;", '\''),
    ("&#39;", '\''),
    ("&amp;", '&'),
];

/// Decode the small set of HTML entities produced by [`escape_html`] and by
/// the authoring tool.
///
/// Each entity is decoded once, so `&amp;gt;` becomes `&gt;` rather than `>`.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    if memchr::memchr(b'&', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = memchr::memchr(b'&', rest.as_bytes()) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match ENTITIES.iter().find(|(name, _)| tail.starts_with(name)) {
            Some((name, ch)) => {
                out.push(*ch);
                rest = &tail[name.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Strip one pair of parentheses enclosing the whole of `s`.
///
/// `(a) in (b)` is not enclosed, so it is returned as `None`.
pub fn strip_outer_parens(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return None,
            ')' => depth -= 1,
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_http_date() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        assert_eq!(http_date(at), "Mon, 19 Oct 2026 08:30:00 GMT");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Hello"), "Hello");
        assert_eq!(escape_html("<b>"), "&lt;b&gt;");
        assert_eq!(escape_html(r#"a "b" & 'c'"#), "a &quot;b&quot; &amp; &#39;c&#39;");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &gt; b"), "a > b");
        assert_eq!(decode_entities("&quot;x&quot; &apos;y&#39;"), "\"x\" 'y'");
        assert_eq!(decode_entities("&amp;gt;"), "&gt;");
        assert_eq!(decode_entities("R&D &copy;"), "R&D &copy;");
        assert!(matches!(decode_entities("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_decode_reverses_escape() {
        let raw = r#"<a href="x">'it' & more</a>"#;
        assert_eq!(decode_entities(&escape_html(raw)), raw);
    }

    #[test]
    fn test_strip_outer_parens() {
        assert_eq!(strip_outer_parens("(a in b)"), Some("a in b"));
        assert_eq!(strip_outer_parens("((a))"), Some("(a)"));
        assert_eq!(strip_outer_parens("(a) in (b)"), None);
        assert_eq!(strip_outer_parens("a"), None);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
