//! Liquid markup post-processing.
//!
//! The rendered markup goes through a fixed sequence before it is returned:
//!
//! ```text
//! cleanup -> disguise -> format -> reveal -> cleanup
//! ```
//!
//! [`cleanup`] resolves artifacts of expression emission (output tags
//! wrapping block tags, template-literal markers). [`disguise`] and
//! [`reveal`] protect Liquid from the mustache-aware formatter.

mod cleanup;
mod disguise;
mod token;

use tracing::debug;

pub use cleanup::{cleanup, cleanup_markup};
pub use disguise::{disguise, reveal};
pub use token::{Token, render, tokenize};

use crate::error::Result;
use crate::format::format_html;
use crate::options::FormatOptions;

/// Clean up, pretty-print, and clean up again.
pub fn round_trip(markup: &str, options: &FormatOptions) -> Result<String> {
    let tokens = cleanup(tokenize(markup))?;
    debug!(tokens = tokens.len(), "disguising Liquid tags");
    let disguised = disguise(&tokens);
    let formatted = format_html(&disguised, options);
    let revealed = reveal(&formatted);
    cleanup_markup(&revealed)
}
