//! Error types for blockliquid operations.
//!
//! Fatal failures abort a conversion and surface as [`Error`]. Problems that
//! only affect a single binding or block are recorded as [`Diagnostic`]s and
//! returned next to the output instead.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors that abort a conversion.
#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed input ({context}): {message}")]
    MalformedInput { context: String, message: String },

    #[error("template cleanup did not converge after {iterations} passes near `{snippet}`")]
    NonConvergentRewrite { iterations: usize, snippet: String },

    #[error("stylesheet could not be minified: {message} near `{snippet}`")]
    StyleMinification { message: String, snippet: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedInput {
            context: context.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A soft problem found while converting; conversion still produced output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Block the problem was found on, if any.
    pub block_id: Option<String>,
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// A binding expression could not be mapped and was emitted verbatim.
    UnsupportedExpression { expression: String },
    /// A component name with no renderer; only its children were emitted.
    UnknownComponent { name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.block_id {
            Some(id) => write!(f, "[{id}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display_includes_block() {
        let diag = Diagnostic {
            block_id: Some("builder-1".to_string()),
            kind: DiagnosticKind::UnknownComponent {
                name: "Carousel".to_string(),
            },
            message: "no renderer for component `Carousel`".to_string(),
        };
        assert_eq!(
            diag.to_string(),
            "[builder-1] no renderer for component `Carousel`"
        );
    }

    #[test]
    fn test_error_messages() {
        let err = Error::malformed("content.id", "must not be empty");
        assert_eq!(
            err.to_string(),
            "malformed input (content.id): must not be empty"
        );

        let err = Error::NonConvergentRewrite {
            iterations: 12,
            snippet: "{{ x".to_string(),
        };
        assert!(err.to_string().contains("12 passes"));
    }
}
