//! Responsive style rules for a block's generated class.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::model::Breakpoint;

/// Convert a style property name to CSS: `backgroundColor` ->
/// `background-color`, `WebkitTransform` -> `-webkit-transform`.
///
/// Names that are already kebab-case and custom properties pass through.
pub fn css_property(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// One stylesheet fragment per breakpoint with at least one non-empty
/// declaration, in cascade order.
pub(crate) fn responsive_rules(
    class: &str,
    styles: &BTreeMap<Breakpoint, BTreeMap<String, String>>,
) -> Vec<String> {
    let mut fragments = Vec::new();
    for (breakpoint, declarations) in styles {
        let mut body = String::new();
        for (property, value) in declarations {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            write!(body, " {}: {};", css_property(property), value).unwrap();
        }
        if body.is_empty() {
            continue;
        }

        let rule = format!(".{class} {{{body} }}");
        match breakpoint.media_query() {
            Some(query) => fragments.push(format!("@media {query} {{ {rule} }}")),
            None => fragments.push(rule),
        }
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_property() {
        assert_eq!(css_property("backgroundColor"), "background-color");
        assert_eq!(css_property("WebkitTransform"), "-webkit-transform");
        assert_eq!(css_property("margin-top"), "margin-top");
        assert_eq!(css_property("--brandColor"), "--brandColor");
        assert_eq!(css_property("color"), "color");
    }

    #[test]
    fn test_responsive_rules() {
        let mut styles = BTreeMap::new();
        styles.insert(
            Breakpoint::Small,
            BTreeMap::from([("color".to_string(), "blue".to_string())]),
        );
        styles.insert(
            Breakpoint::Large,
            BTreeMap::from([
                ("marginTop".to_string(), "10px".to_string()),
                ("color".to_string(), "red".to_string()),
                ("display".to_string(), " ".to_string()),
            ]),
        );
        styles.insert(
            Breakpoint::Medium,
            BTreeMap::from([("color".to_string(), String::new())]),
        );

        assert_eq!(
            responsive_rules("builder-a", &styles),
            vec![
                ".builder-a { color: red; margin-top: 10px; }".to_string(),
                "@media (max-width: 640px) { .builder-a { color: blue; } }".to_string(),
            ]
        );
    }
}
