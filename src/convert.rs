//! Content tree to Liquid conversion.
//!
//! [`content_to_liquid`] runs the whole pipeline:
//!
//! 1. resolve `blocksString` and validate the tree
//! 2. render blocks to raw markup, collecting CSS
//! 3. pull `<style>` elements out of the markup into the collected CSS
//! 4. consolidate the stylesheet
//! 5. assemble the document: inline `<style>` (unless extracting) and
//!    provenance comments
//! 6. disguise, pretty-print, and reveal the Liquid

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info_span};

use crate::css::consolidate;
use crate::error::{Diagnostic, Result};
use crate::model::ContentTree;
use crate::options::{FormatOptions, RenderOptions};
use crate::render::{RenderContext, extract_style_elements, render_content};
use crate::template::round_trip;
use crate::util::{http_date, now_utc};

/// Output of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    /// The formatted Liquid template.
    pub html: String,
    /// The stylesheet, present only when it was extracted from the markup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    /// Soft errors; the output is complete but may keep untranslated text.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Convert `content` to a Liquid template, stamped with the current time.
///
/// # Example
///
/// ```
/// use blockliquid::{RenderOptions, content_to_liquid};
/// use blockliquid::model::{BlockNode, Component, ContentTree};
///
/// let content = ContentTree::new("c1").with_block(
///     BlockNode::new("b1")
///         .with_component(Component::new("Text"))
///         .with_binding("component.options.text", "product.title"),
/// );
/// let options = RenderOptions::default().with_extract_css(true);
/// let result = content_to_liquid(&content, "product", &options).unwrap();
///
/// assert!(result.html.contains("{{ product.title }}"));
/// assert_eq!(result.css.as_deref(), Some(""));
/// ```
pub fn content_to_liquid(
    content: &ContentTree,
    model_name: &str,
    options: &RenderOptions,
) -> Result<ConversionResult> {
    content_to_liquid_at(content, model_name, options, now_utc())
}

/// Convert `content` with an explicit timestamp for the provenance comments.
pub fn content_to_liquid_at(
    content: &ContentTree,
    model_name: &str,
    options: &RenderOptions,
    at: DateTime<Utc>,
) -> Result<ConversionResult> {
    let span = info_span!("content_to_liquid", content = %content.id, model = model_name);
    let _enter = span.enter();

    let mut content = content.clone();
    content.resolve_blocks()?;
    content.validate()?;

    let mut ctx = RenderContext::new();
    let markup = render_content(&content, model_name, &mut ctx)?;
    let markup = extract_style_elements(&markup, &mut ctx.css);
    debug!(
        blocks = content.data.blocks.len(),
        fragments = ctx.css.len(),
        "rendered content"
    );

    let stylesheet = consolidate(&ctx.css, &options.formatter)?;

    let mut body = String::new();
    if !options.extract_css {
        body.push_str(&inline_style(&stylesheet, &options.formatter));
    }
    body.push_str(&markup);

    let stamp = http_date(at);
    let generator = &options.generator;
    let document = format!(
        "\n<!-- ***** Generated by {generator} on {stamp} ***** -->\n\n{body}\n\n\
         <!-- /**** Generated by {generator} on {stamp} *****/ -->\n"
    );

    let html = round_trip(&document, &options.formatter)?;
    debug!(
        bytes = html.len(),
        diagnostics = ctx.diagnostics.len(),
        "converted content"
    );

    Ok(ConversionResult {
        html,
        css: options.extract_css.then_some(stylesheet),
        diagnostics: ctx.diagnostics,
    })
}

/// Parse a content tree from JSON and convert it.
pub fn content_to_liquid_json(
    json: &str,
    model_name: &str,
    options: &RenderOptions,
) -> Result<ConversionResult> {
    let content = ContentTree::from_json(json)?;
    content_to_liquid(&content, model_name, options)
}

/// `<style>` element holding the stylesheet, each line indented one level.
/// Empty stylesheets produce nothing.
fn inline_style(stylesheet: &str, format: &FormatOptions) -> String {
    if stylesheet.trim().is_empty() {
        return String::new();
    }
    let indent = format.indent(1);
    let mut out = String::from(r#"<style type="text/css" class="builder-styles builder-api-styles">"#);
    out.push('\n');
    for line in stylesheet.lines() {
        if !line.is_empty() {
            out.push_str(&indent);
            out.push_str(line);
        }
        out.push('\n');
    }
    out.push_str("</style>");
    out
}
