//! Conversion options.
//!
//! Options deserialize from camelCase JSON with every field optional, so a
//! partial config file such as `{ "extractCss": true }` is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default generator name written into the provenance comments.
pub const DEFAULT_GENERATOR: &str = "blockliquid";

/// Configuration for a single conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Return the stylesheet separately instead of inlining a `<style>` element.
    pub extract_css: bool,
    /// Passed through to the markup and stylesheet pretty-printers.
    pub formatter: FormatOptions,
    /// Name written into the generated header and footer comments.
    pub generator: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            extract_css: false,
            formatter: FormatOptions::default(),
            generator: DEFAULT_GENERATOR.to_string(),
        }
    }
}

impl RenderOptions {
    pub fn with_extract_css(mut self, extract_css: bool) -> Self {
        self.extract_css = extract_css;
        self
    }

    pub fn with_formatter(mut self, formatter: FormatOptions) -> Self {
        self.formatter = formatter;
        self
    }

    /// Parse options from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Pretty-printer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatOptions {
    /// Opening tags longer than this are broken one attribute per line.
    pub print_width: usize,
    /// Spaces per indentation level.
    pub tab_width: usize,
    /// Indent with tabs instead of spaces.
    pub use_tabs: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            print_width: 80,
            tab_width: 2,
            use_tabs: false,
        }
    }
}

impl FormatOptions {
    /// The string for one level of indentation.
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.tab_width)
        }
    }

    /// Indentation for `level` nesting levels.
    pub fn indent(&self, level: usize) -> String {
        self.indent_unit().repeat(level)
    }
}
