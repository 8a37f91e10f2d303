//! # blockliquid
//!
//! Compile block-based page content into Liquid templates.
//!
//! A content tree from a visual page builder is a nested list of blocks with
//! responsive styles, components, and data bindings written as JavaScript
//! expressions. This crate turns it into a formatted Liquid template plus a
//! consolidated stylesheet.
//!
//! ## Features
//!
//! - Binding expressions transpiled to Liquid ([`transpile`])
//! - `repeat`, `show`, and `hide` bindings become `for`/`if`/`unless` tags
//! - Responsive styles, block `cssCode`, and embedded `<style>` elements
//!   merged into one minified, pretty-printed stylesheet
//! - Output formatted by an HTML pretty-printer that never touches Liquid
//!
//! ## Quick Start
//!
//! ```
//! use blockliquid::{RenderOptions, content_to_liquid_json};
//!
//! let json = r#"{
//!     "id": "c1",
//!     "data": { "blocks": [{
//!         "id": "b1",
//!         "repeat": { "collection": "product.images" },
//!         "component": { "name": "Image" },
//!         "bindings": { "component.options.image": "images_item" },
//!         "responsiveStyles": { "large": { "maxWidth": "100%" } }
//!     }] }
//! }"#;
//!
//! let result = content_to_liquid_json(json, "product", &RenderOptions::default()).unwrap();
//! assert!(result.html.contains("{% for images_item in product.images %}"));
//! assert!(result.html.contains("{{ images_item | img_url: 'master' }}"));
//! assert!(result.html.contains("max-width: 100%;"));
//! assert!(result.diagnostics.is_empty());
//! ```

pub mod convert;
pub mod css;
pub mod error;
pub mod expr;
pub mod format;
pub mod model;
pub mod options;
pub mod render;
pub mod template;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use convert::{ConversionResult, content_to_liquid, content_to_liquid_at, content_to_liquid_json};
pub use css::CssCollector;
pub use error::{Diagnostic, DiagnosticKind, Error, Result};
pub use expr::{TranspileError, transpile, transpile_statement};
pub use format::format_html;
pub use model::{BlockNode, Breakpoint, Component, ContentData, ContentTree, Repeat};
pub use options::{FormatOptions, RenderOptions};
