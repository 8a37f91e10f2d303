//! Table-driven idiom substitutions.
//!
//! These are exact-pattern rewrites for constructs the general translation
//! cannot express. Each one is tied to a specific call shape or binding
//! position so unrelated expressions are never touched.

use std::borrow::Cow;

/// Where a transpiled expression is placed in the emitted markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Text content output tag.
    Output,
    /// The `src` attribute of an image element.
    ImageSrc,
    /// Any other attribute value.
    Attribute,
    /// A value inside an inline `style` attribute.
    Style,
}

/// Source functions that map onto a Liquid filter of their first argument.
pub(crate) struct FunctionIdiom {
    pub function: &'static str,
    pub filter: &'static str,
    /// Argument inserted when the source omits one.
    pub default_arg: Option<&'static str>,
}

pub(crate) const FUNCTION_IDIOMS: &[FunctionIdiom] = &[FunctionIdiom {
    function: "img_url",
    filter: "img_url",
    default_arg: Some("'master'"),
}];

/// Zero-argument methods that map onto a Liquid filter of their receiver.
pub(crate) const METHOD_IDIOMS: &[(&str, &str)] = &[
    ("toUpperCase", "upcase"),
    ("toLowerCase", "downcase"),
    ("trim", "strip"),
];

/// Exact transpiled expressions rewritten when bound at a given position.
struct BindingIdiom {
    position: Position,
    expression: &'static str,
    replacement: &'static str,
}

const BINDING_IDIOMS: &[BindingIdiom] = &[BindingIdiom {
    position: Position::ImageSrc,
    expression: "images_item",
    replacement: "images_item | img_url: 'master'",
}];

pub(crate) fn function_idiom(name: &str) -> Option<&'static FunctionIdiom> {
    FUNCTION_IDIOMS.iter().find(|idiom| idiom.function == name)
}

pub(crate) fn method_filter(method: &str) -> Option<&'static str> {
    METHOD_IDIOMS
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, filter)| *filter)
}

/// Apply the position-scoped rewrite for an already transpiled expression.
pub(crate) fn apply_binding_idiom(position: Position, liquid: String) -> String {
    BINDING_IDIOMS
        .iter()
        .find(|idiom| idiom.position == position && idiom.expression == liquid.trim())
        .map(|idiom| idiom.replacement.to_string())
        .unwrap_or(liquid)
}

/// Insert the default argument for known filters written without one,
/// e.g. `image | img_url` -> `image | img_url: 'master'`.
///
/// Works on the filter chain of a single output tag body; quoted strings are
/// never split.
pub fn complete_filter_arguments(liquid: &str) -> Cow<'_, str> {
    let segments = split_filters(liquid);
    if segments.len() < 2 {
        return Cow::Borrowed(liquid);
    }

    let mut changed = false;
    let mut rebuilt: Vec<String> = Vec::with_capacity(segments.len());
    rebuilt.push(segments[0].trim().to_string());
    for segment in &segments[1..] {
        let filter = segment.trim();
        let completed = FUNCTION_IDIOMS.iter().find_map(|idiom| {
            let default = idiom.default_arg?;
            (filter == idiom.filter).then(|| format!("{filter}: {default}"))
        });
        match completed {
            Some(text) => {
                changed = true;
                rebuilt.push(text);
            }
            None => rebuilt.push(filter.to_string()),
        }
    }

    if changed {
        Cow::Owned(rebuilt.join(" | "))
    } else {
        Cow::Borrowed(liquid)
    }
}

/// Split on `|` outside of quotes.
fn split_filters(liquid: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in liquid.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == '|' => {
                segments.push(&liquid[start..i]);
                start = i + 1;
            }
            None => {}
        }
    }
    segments.push(&liquid[start..]);
    segments
}
