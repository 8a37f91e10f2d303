//! Binding expression transpiler.
//!
//! Translates the restricted JavaScript expression subset used in block
//! bindings into Liquid:
//!
//! - [`transpile`]: an expression for an output tag (`{{ ... }}`)
//! - [`transpile_condition`]: an `if`/`unless` condition
//! - [`transpile_statement`]: the body of a block tag (`{% ... %}`)
//! - [`transpile_binding`]: [`transpile`] plus the idioms scoped to a
//!   binding position
//!
//! ```
//! use blockliquid::expr::{transpile, transpile_statement};
//!
//! assert_eq!(transpile("state.$index").unwrap(), "forloop.index");
//! assert_eq!(transpile("a === 'b' && c").unwrap(), "a == 'b' and c");
//! assert_eq!(
//!     transpile_statement("for (item in product.images)").unwrap(),
//!     "for item in product.images"
//! );
//! assert!(transpile("formatMoney(price)").is_err());
//! ```
//!
//! Translation is total over the subset; anything else fails with a
//! [`TranspileError`] and the caller keeps the original text.

mod emit;
mod idiom;
mod lexer;
mod parser;

use thiserror::Error;

use crate::util::{decode_entities, strip_outer_parens};

use emit::{Shape, emit, is_identifier};
pub use idiom::{Position, complete_filter_arguments};

/// Marker opening a template literal inside emitted Liquid.
pub const TEMPLATE_START: &str = "`__TPL_START__";
/// Marker opening a `${ ... }` substitution.
pub const PART_START: &str = "__PART_START__${";
/// Marker closing a `${ ... }` substitution.
pub const PART_END: &str = "}__PART_END__";
/// Marker closing a template literal.
pub const TEMPLATE_END: &str = "__TPL_END__`";

/// A binding expression that could not be translated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranspileError {
    #[error("cannot parse `{expression}`: {reason}")]
    Syntax { expression: String, reason: String },

    #[error("unsupported construct in `{expression}`: {construct}")]
    Unsupported {
        expression: String,
        construct: String,
    },
}

impl TranspileError {
    /// The source text that failed.
    pub fn expression(&self) -> &str {
        match self {
            TranspileError::Syntax { expression, .. }
            | TranspileError::Unsupported { expression, .. } => expression,
        }
    }
}

/// Internal failure before the expression text is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Failure {
    Syntax(String),
    Unsupported(String),
}

impl Failure {
    fn with_expression(self, expression: &str) -> TranspileError {
        let expression = expression.to_string();
        match self {
            Failure::Syntax(reason) => TranspileError::Syntax { expression, reason },
            Failure::Unsupported(construct) => TranspileError::Unsupported {
                expression,
                construct,
            },
        }
    }
}

/// A translated `if` condition. `negated` conditions belong in `unless`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub negated: bool,
    pub expression: String,
}

impl Condition {
    /// Opening tag body: `if x` or `unless x`.
    pub fn opening(&self) -> String {
        let keyword = if self.negated { "unless" } else { "if" };
        format!("{keyword} {}", self.expression)
    }

    /// Closing tag body matching [`Condition::opening`].
    pub fn closing(&self) -> &'static str {
        if self.negated { "endunless" } else { "endif" }
    }
}

/// Translate an expression for use in an output tag.
pub fn transpile(expression: &str) -> Result<String, TranspileError> {
    let source = decode_entities(expression);
    parser::parse(source.trim())
        .and_then(|expr| emit(&expr))
        .map(|emitted| emitted.text)
        .map_err(|failure| failure.with_expression(expression))
}

/// Translate an expression bound at `position`, applying position-scoped
/// idioms such as the default image size for `src` attributes.
pub fn transpile_binding(expression: &str, position: Position) -> Result<String, TranspileError> {
    transpile(expression).map(|liquid| idiom::apply_binding_idiom(position, liquid))
}

/// Translate a condition. A leading `!` is lifted into [`Condition::negated`].
pub fn transpile_condition(expression: &str) -> Result<Condition, TranspileError> {
    let source = decode_entities(expression);
    condition(source.trim()).map_err(|failure| failure.with_expression(expression))
}

fn condition(source: &str) -> Result<Condition, Failure> {
    let (negated, expr) = match parser::parse(source)? {
        parser::Expr::Not(inner) => (true, *inner),
        expr => (false, expr),
    };
    let emitted = emit(&expr)?;
    match emitted.shape {
        Shape::Value | Shape::Comparison | Shape::Logical(_) => Ok(Condition {
            negated,
            expression: emitted.text,
        }),
        _ => Err(Failure::Unsupported("filter inside a condition".to_string())),
    }
}

/// Translate a block statement: `for`, `if`/`elsif`/`unless`, and the bare
/// `else`/`end*` keywords.
pub fn transpile_statement(statement: &str) -> Result<String, TranspileError> {
    let source = decode_entities(statement);
    statement_body(source.trim()).map_err(|failure| failure.with_expression(statement))
}

fn statement_body(source: &str) -> Result<String, Failure> {
    let split = source
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(source.len());
    let (keyword, rest) = source.split_at(split);
    let rest = rest.trim();

    match keyword {
        "for" => for_loop(rest),
        "if" | "unless" | "elsif" => {
            let cond = condition(rest)?;
            match (keyword, cond.negated) {
                ("elsif", true) => Err(Failure::Unsupported("negated `elsif`".to_string())),
                ("elsif", false) => Ok(format!("elsif {}", cond.expression)),
                ("unless", negated) => Ok(Condition {
                    negated: !negated,
                    expression: cond.expression,
                }
                .opening()),
                _ => Ok(cond.opening()),
            }
        }
        "else" | "endif" | "endfor" | "endunless" | "break" | "continue" if rest.is_empty() => {
            Ok(keyword.to_string())
        }
        _ => Err(Failure::Unsupported(format!("statement `{keyword}`"))),
    }
}

/// `for (item in collection)`, `for item in collection`, and
/// `for (const item of collection)` all become `for item in collection`.
fn for_loop(rest: &str) -> Result<String, Failure> {
    let mut body = rest.trim();
    while let Some(inner) = strip_outer_parens(body) {
        body = inner.trim();
    }
    for declarator in ["const ", "let ", "var "] {
        if let Some(stripped) = body.strip_prefix(declarator) {
            body = stripped.trim_start();
        }
    }

    let malformed = || Failure::Syntax("expected `for item in collection`".to_string());
    let (item, after) = body.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let after = after.trim_start();
    let collection = after
        .strip_prefix("in")
        .or_else(|| after.strip_prefix("of"))
        .filter(|c| c.starts_with(char::is_whitespace))
        .ok_or_else(malformed)?;

    if !is_identifier(item) {
        return Err(Failure::Syntax(format!("invalid loop variable `{item}`")));
    }
    let collection = emit(&parser::parse(collection.trim())?)?;
    if collection.shape != Shape::Value {
        return Err(Failure::Unsupported("compound loop collection".to_string()));
    }
    Ok(format!("for {item} in {}", collection.text))
}
