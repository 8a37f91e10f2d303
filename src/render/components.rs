//! Markup for the built-in block components.
//!
//! Each renderer gets the block, its bound option overrides (already
//! `{{ ... }}` output tags), and the rendered children. Most return the
//! wrapper's inner markup; unwrapped components (buttons and labels) return
//! their own element carrying the wrapper attributes.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write;

use super::RenderContext;
use super::block::render_block;
use crate::error::{DiagnosticKind, Result};
use crate::model::{BlockNode, Component};
use crate::util::escape_html;

/// An option value, either static or bound to an output tag.
#[derive(Debug, Clone, Copy)]
enum OptionValue<'a> {
    Static(&'a str),
    Bound(&'a str),
}

impl<'a> OptionValue<'a> {
    /// Escaped for text or attribute context. Output tags are left intact.
    fn escaped(self) -> Cow<'a, str> {
        match self {
            OptionValue::Static(s) => Cow::Owned(escape_html(s)),
            OptionValue::Bound(s) => Cow::Borrowed(s),
        }
    }

    /// As written, for options holding raw HTML.
    fn raw(self) -> &'a str {
        match self {
            OptionValue::Static(s) | OptionValue::Bound(s) => s,
        }
    }
}

struct Options<'a> {
    component: &'a Component,
    overrides: &'a BTreeMap<String, String>,
}

impl<'a> Options<'a> {
    fn get(&self, key: &str) -> Option<OptionValue<'a>> {
        if let Some(bound) = self.overrides.get(key) {
            return Some(OptionValue::Bound(bound.as_str()));
        }
        self.component
            .option_str(key)
            .filter(|s| !s.is_empty())
            .map(OptionValue::Static)
    }
}

/// Output of a component renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Rendered {
    /// Markup to place inside the block's wrapper element.
    Inner(String),
    /// A complete element that replaces the wrapper.
    Element(String),
}

/// Render the component of `block` around or before `children`.
///
/// `wrapper_attrs` are the wrapper element's attributes, each with a leading
/// space; unwrapped components put them on their own root element.
pub(crate) fn render(
    block: &BlockNode,
    overrides: &BTreeMap<String, String>,
    children: String,
    wrapper_attrs: &str,
    ctx: &mut RenderContext,
) -> Result<Rendered> {
    let Some(component) = &block.component else {
        return Ok(Rendered::Inner(children));
    };
    let options = Options {
        component,
        overrides,
    };

    let content = match component.name.as_str() {
        "Text" => text(&options),
        "Core:Button" => return Ok(Rendered::Element(button(&options, wrapper_attrs))),
        "Form:Label" => return Ok(Rendered::Element(label(&options, wrapper_attrs, &children))),
        "Image" => image(&options),
        "Custom Code" | "Embed" => options.get("code").map(|v| v.raw()).unwrap_or("").to_string(),
        "Columns" => columns(block, ctx)?,
        name => {
            ctx.report(
                Some(block.id.as_str()),
                DiagnosticKind::UnknownComponent {
                    name: name.to_string(),
                },
                format!("no renderer for component `{name}`"),
            );
            return Ok(Rendered::Inner(children));
        }
    };

    Ok(Rendered::Inner(if children.is_empty() {
        content
    } else if content.is_empty() {
        children
    } else {
        format!("{content}\n{children}")
    }))
}

fn text(options: &Options<'_>) -> String {
    let text = options.get("text").map(|v| v.raw()).unwrap_or("");
    format!("<span class=\"builder-text\">{text}</span>")
}

fn button(options: &Options<'_>, wrapper_attrs: &str) -> String {
    let text = options.get("text").map(|v| v.escaped()).unwrap_or_default();
    match options.get("link") {
        Some(link) => {
            let mut attrs = format!(" href=\"{}\"", link.escaped());
            if options.component.option_bool("openLinkInNewTab") {
                attrs.push_str(" target=\"_blank\"");
            }
            format!("<a{attrs}{wrapper_attrs}>{text}</a>")
        }
        None => format!("<span{wrapper_attrs}>{text}</span>"),
    }
}

fn label(options: &Options<'_>, wrapper_attrs: &str, children: &str) -> String {
    let mut out = String::from("<label");
    if let Some(target) = options.get("for") {
        write!(out, " for=\"{}\"", target.escaped()).unwrap();
    }
    out.push_str(wrapper_attrs);
    out.push('>');
    if let Some(text) = options.get("text") {
        write!(out, "<span class=\"builder-label-text\">{}</span>", text.raw()).unwrap();
    }
    out.push_str(children);
    out.push_str("</label>");
    out
}

fn image(options: &Options<'_>) -> String {
    let mut out = String::from("<img class=\"builder-image\"");
    if let Some(src) = options.get("image").or_else(|| options.get("src")) {
        write!(out, " src=\"{}\"", src.escaped()).unwrap();
    }
    if let Some(alt) = options.get("altText") {
        write!(out, " alt=\"{}\"", alt.escaped()).unwrap();
    }
    out.push('>');
    out
}

/// `options.columns[].blocks`, each column in its own container.
fn columns(block: &BlockNode, ctx: &mut RenderContext) -> Result<String> {
    let mut out = String::from("<div class=\"builder-columns\">");
    for blocks in block.column_blocks()? {
        let mut rendered = Vec::with_capacity(blocks.len());
        for child in &blocks {
            rendered.push(render_block(child, ctx)?);
        }
        write!(
            out,
            "<div class=\"builder-column\">{}</div>",
            rendered.join("\n")
        )
        .unwrap();
    }
    out.push_str("</div>");
    Ok(out)
}
