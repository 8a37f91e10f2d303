//! Stylesheet consolidation.
//!
//! Rendering produces many small stylesheet fragments: generated per-block
//! rules, raw `cssCode`, and `<style>` elements pulled out of custom markup.
//! [`consolidate`] turns them into one minified-then-pretty-printed
//! stylesheet:
//!
//! 1. join fragments in first-seen order, decode HTML entities, collapse
//!    whitespace
//! 2. parse into a small rule model ([`Stylesheet`]), dropping empty
//!    declarations
//! 3. level-1 cleanup ([`level_one`]) and restructuring ([`restructure`])
//! 4. serialize minified, then pretty-print
//!
//! # Example
//!
//! ```
//! use blockliquid::{CssCollector, FormatOptions};
//! use blockliquid::css::consolidate;
//!
//! let mut css = CssCollector::new();
//! css.insert(".a { color: red; }");
//! css.insert(".a { margin: 0 }");
//! let sheet = consolidate(&css, &FormatOptions::default()).unwrap();
//! assert_eq!(sheet, ".a {\n  color: red;\n  margin: 0;\n}\n");
//! ```

mod collector;
mod minify;
mod parse;
mod print;

#[cfg(test)]
mod tests;

use tracing::debug;

use crate::error::Result;
use crate::options::FormatOptions;
use crate::util::{collapse_whitespace, decode_entities};

pub use collector::CssCollector;
pub use minify::{level_one, restructure};
pub use parse::{AtRule, AtRuleBody, CssNode, Declaration, Rule, Stylesheet};
pub use print::{minified, pretty};

/// Minify stylesheet text: `.a { color: red }` -> `.a{color:red}`.
pub fn minify(css: &str) -> Result<String> {
    let mut sheet = Stylesheet::parse(css)?;
    level_one(&mut sheet);
    restructure(&mut sheet);
    Ok(minified(&sheet))
}

/// Build the final stylesheet from everything collected during rendering.
///
/// Returns an empty string when nothing but whitespace was collected.
pub fn consolidate(collector: &CssCollector, options: &FormatOptions) -> Result<String> {
    let joined = collector.fragments().collect::<Vec<_>>().join(" ");
    let source = collapse_whitespace(&decode_entities(&joined));
    if source.is_empty() {
        return Ok(String::new());
    }

    let minified_css = minify(&source)?;
    debug!(
        fragments = collector.len(),
        source_bytes = source.len(),
        minified_bytes = minified_css.len(),
        "consolidated stylesheet"
    );

    let sheet = Stylesheet::parse(&minified_css)?;
    Ok(pretty(&sheet, options))
}
