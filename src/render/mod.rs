//! Block renderer - turns a content tree into raw markup and CSS fragments.
//!
//! Rendering is a depth-first walk. Each block becomes a wrapper element
//! carrying its generated class, with its component's markup and its
//! children inside. Loops and conditions are not evaluated; they become
//! Liquid tags around the wrapper. Everything stylesheet-related goes into
//! the [`CssCollector`] of the [`RenderContext`] threaded through the walk.
//!
//! # Example
//!
//! ```
//! use blockliquid::model::{BlockNode, Breakpoint, ContentTree};
//! use blockliquid::render::{RenderContext, render_content};
//!
//! let content = ContentTree::new("c1")
//!     .with_block(BlockNode::new("b1").with_style(Breakpoint::Large, "color", "red"));
//! let mut ctx = RenderContext::new();
//! let html = render_content(&content, "page", &mut ctx).unwrap();
//!
//! assert!(html.contains(r#"builder-id="b1""#));
//! assert_eq!(ctx.css.fragments().next(), Some(".builder-b1 { color: red; }"));
//! ```

mod block;
mod components;
mod style;

use std::fmt::Write;

use memchr::memmem;
use tracing::warn;

use crate::css::CssCollector;
use crate::error::{Diagnostic, DiagnosticKind, Result};
use crate::model::ContentTree;
use crate::util::escape_html;

pub use style::css_property;

/// Accumulator threaded through one rendering walk.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Stylesheet fragments in first-seen order.
    pub css: CssCollector,
    /// Soft errors found so far.
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a soft error and log it.
    pub(crate) fn report(
        &mut self,
        block_id: Option<&str>,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            block_id: block_id.map(str::to_string),
            kind,
            message: message.into(),
        };
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

/// Class name generated for a block id.
///
/// `builder-` is prefixed unless already present. Characters outside
/// `[A-Za-z0-9-]` are written as `_{hex}_`, so distinct ids keep distinct
/// classes apart from the prefix itself (`x` and `builder-x`), which
/// [`ContentTree::validate`] rejects.
///
/// ```
/// use blockliquid::render::css_class_for;
///
/// assert_eq!(css_class_for("abc123"), "builder-abc123");
/// assert_eq!(css_class_for("builder-x.y"), "builder-x_2e_y");
/// ```
pub fn css_class_for(id: &str) -> String {
    let mut class = String::with_capacity(id.len() + "builder-".len());
    if !id.starts_with("builder-") {
        class.push_str("builder-");
    }
    for c in id.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            class.push(c);
        } else {
            write!(class, "_{:x}_", u32::from(c)).unwrap();
        }
    }
    class
}

/// Render the root container and every top-level block.
///
/// Content-level `cssCode` is collected before any block CSS.
pub fn render_content(
    content: &ContentTree,
    model_name: &str,
    ctx: &mut RenderContext,
) -> Result<String> {
    if let Some(css) = &content.data.css_code {
        ctx.css.insert(css.as_str());
    }

    let mut blocks = Vec::with_capacity(content.data.blocks.len());
    for block in &content.data.blocks {
        blocks.push(block::render_block(block, ctx)?);
    }

    let id = escape_html(&content.id);
    let model = escape_html(model_name);
    let mut html = String::new();
    write!(
        html,
        "<div class=\"builder-content\" builder-content-id=\"{id}\" \
         data-builder-content-id=\"{id}\" data-builder-component=\"{model}\" \
         builder-model=\"{model}\">"
    )
    .unwrap();
    html.push('\n');
    html.push_str(&blocks.join("\n"));
    html.push_str("\n</div>");
    Ok(html)
}

/// Remove `<style ...>...</style>` elements from `markup`, adding their
/// contents to `css`. Unterminated elements are left in place.
pub fn extract_style_elements(markup: &str, css: &mut CssCollector) -> String {
    // ASCII lowercasing keeps byte offsets valid for `markup`.
    let lower = markup.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let open = memmem::Finder::new("<style");
    let close = memmem::Finder::new("</style");

    let mut out = String::with_capacity(markup.len());
    let mut pos = 0;
    while let Some(offset) = open.find(&bytes[pos..]) {
        let start = pos + offset;
        let after = start + "<style".len();
        if !matches!(bytes.get(after), Some(b'>' | b' ' | b'\t' | b'\n' | b'\r')) {
            // `<styles>` and friends.
            out.push_str(&markup[pos..after]);
            pos = after;
            continue;
        }
        let Some(tag_len) = memchr::memchr(b'>', &bytes[after..]) else {
            break;
        };
        let body_start = after + tag_len + 1;
        let Some(body_len) = close.find(&bytes[body_start..]) else {
            break;
        };
        let body_end = body_start + body_len;
        let Some(close_len) = memchr::memchr(b'>', &bytes[body_end..]) else {
            break;
        };

        out.push_str(&markup[pos..start]);
        css.insert(&markup[body_start..body_end]);
        pos = body_end + close_len + 1;
    }
    out.push_str(&markup[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockNode;

    #[test]
    fn test_css_class_for() {
        assert_eq!(css_class_for("abc"), "builder-abc");
        assert_eq!(css_class_for("builder-abc"), "builder-abc");
        assert_eq!(css_class_for("a b/c"), "builder-a_20_b_2f_c");
        assert_eq!(css_class_for("a_b"), "builder-a_5f_b");
        assert_eq!(css_class_for("é"), "builder-_e9_");
    }

    #[test]
    fn test_css_class_for_keeps_ids_apart() {
        let ids = ["a.b", "a-b", "a_b", "a_2e_b", "a b", "a-2e-b"];
        let classes: std::collections::HashSet<_> = ids.iter().map(|id| css_class_for(id)).collect();
        assert_eq!(classes.len(), ids.len());
    }

    #[test]
    fn test_root_container_attributes() {
        let content = ContentTree::new("c1")
            .with_block(BlockNode::new("b1"))
            .with_block(BlockNode::new("b2"));
        let mut ctx = RenderContext::new();
        let html = render_content(&content, "page", &mut ctx).unwrap();
        assert_eq!(
            html,
            concat!(
                r#"<div class="builder-content" builder-content-id="c1" data-builder-content-id="c1" data-builder-component="page" builder-model="page">"#,
                "\n",
                r#"<div class="builder-block builder-b1" builder-id="b1"></div>"#,
                "\n",
                r#"<div class="builder-block builder-b2" builder-id="b2"></div>"#,
                "\n</div>"
            )
        );
    }

    #[test]
    fn test_content_css_comes_first() {
        let mut content = ContentTree::new("c1").with_block(BlockNode::new("b1").with_css(".b{x:y}"));
        content.data.css_code = Some(".a{x:y}".to_string());
        let mut ctx = RenderContext::new();
        render_content(&content, "page", &mut ctx).unwrap();
        assert_eq!(ctx.css.fragments().collect::<Vec<_>>(), vec![".a{x:y}", ".b{x:y}"]);
    }

    #[test]
    fn test_extract_style_elements() {
        let mut css = CssCollector::new();
        let html = extract_style_elements(
            "<div><STYLE type=\"text/css\">.a{color:red}</style><p>x</p><style>.a{color:red}</style></div>",
            &mut css,
        );
        assert_eq!(html, "<div><p>x</p></div>");
        assert_eq!(css.fragments().collect::<Vec<_>>(), vec![".a{color:red}"]);
    }

    #[test]
    fn test_extract_leaves_lookalikes_and_unterminated() {
        let mut css = CssCollector::new();
        let markup = "<styles>a</styles><style>.x{}";
        assert_eq!(extract_style_elements(markup, &mut css), markup);
        assert!(css.is_empty());
    }
}
