//! Liquid emission from the expression AST.

use super::idiom::{function_idiom, method_filter};
use super::parser::{BinOp, Expr, TemplatePart};
use super::{Failure, PART_END, PART_START, TEMPLATE_END, TEMPLATE_START};

/// Liquid for the loop index of the enclosing `for` tag.
pub(crate) const LOOP_INDEX: &str = "forloop.index";

/// Syntactic category of emitted Liquid, used to reject compositions Liquid
/// cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// Variable, member access, or literal.
    Value,
    /// Value followed by one or more filters.
    Filtered,
    Comparison,
    Logical(BinOp),
    /// Template literal wrapped in marker tokens.
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Emitted {
    pub text: String,
    pub shape: Shape,
}

impl Emitted {
    fn new(text: String, shape: Shape) -> Self {
        Self { text, shape }
    }

    fn value(text: impl Into<String>) -> Self {
        Self::new(text.into(), Shape::Value)
    }
}

pub(crate) fn emit(expr: &Expr) -> Result<Emitted, Failure> {
    match expr {
        Expr::Var(name) if name == "$index" => Ok(Emitted::value(LOOP_INDEX)),
        Expr::Var(name) if name == "state" => {
            Err(Failure::Unsupported("bare `state` object".to_string()))
        }
        Expr::Var(name) => Ok(Emitted::value(name.clone())),
        Expr::Member(object, property) => emit_member(object, property),
        Expr::Index(object, key) => emit_index(object, key),
        Expr::Str(s) => quote(s).map(Emitted::value),
        Expr::Num(n) => Ok(Emitted::value(n.clone())),
        Expr::Bool(b) => Ok(Emitted::value(b.to_string())),
        Expr::Nil => Ok(Emitted::value("nil")),
        Expr::Not(_) => Err(Failure::Unsupported(
            "negation outside of a condition".to_string(),
        )),
        Expr::Binary(op, lhs, rhs) => emit_binary(*op, lhs, rhs),
        Expr::Call(callee, args) => emit_call(callee, args),
        Expr::Template(parts) => emit_template(parts),
    }
}

fn emit_member(object: &Expr, property: &str) -> Result<Emitted, Failure> {
    if matches!(object, Expr::Var(name) if name == "state") {
        return Ok(Emitted::value(if property == "$index" {
            LOOP_INDEX.to_string()
        } else {
            property.to_string()
        }));
    }

    let object = value_operand(emit(object)?, "member access")?;
    let property = if property == "length" { "size" } else { property };
    Ok(Emitted::value(format!("{}.{property}", object.text)))
}

fn emit_index(object: &Expr, key: &Expr) -> Result<Emitted, Failure> {
    if matches!(object, Expr::Var(name) if name == "state") {
        return match key {
            Expr::Str(name) if is_identifier(name) => Ok(Emitted::value(name.clone())),
            _ => Err(Failure::Unsupported("computed `state` lookup".to_string())),
        };
    }

    let object = value_operand(emit(object)?, "index access")?;
    let key = value_operand(emit(key)?, "index key")?;
    Ok(Emitted::value(format!("{}[{}]", object.text, key.text)))
}

fn emit_binary(op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<Emitted, Failure> {
    let left = emit(lhs)?;
    let right = emit(rhs)?;

    if op.is_logical() {
        // Liquid has no grouping and evaluates and/or right to left, so only
        // chains of a single operator keep their meaning.
        let keyword = if op == BinOp::And { "and" } else { "or" };
        for side in [&left, &right] {
            match side.shape {
                Shape::Value | Shape::Comparison => {}
                Shape::Logical(inner) if inner == op => {}
                Shape::Logical(_) => {
                    return Err(Failure::Unsupported("mixed `&&` and `||`".to_string()));
                }
                _ => return Err(Failure::Unsupported("filter inside a condition".to_string())),
            }
        }
        return Ok(Emitted::new(
            format!("{} {keyword} {}", left.text, right.text),
            Shape::Logical(op),
        ));
    }

    if op.is_comparison() {
        let symbol = match op {
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            _ => ">=",
        };
        let left = value_operand(left, "comparison")?;
        let right = value_operand(right, "comparison")?;
        return Ok(Emitted::new(
            format!("{} {symbol} {}", left.text, right.text),
            Shape::Comparison,
        ));
    }

    // Arithmetic becomes a left-to-right filter chain, so the right operand
    // must already be a single value.
    let filter = match op {
        BinOp::Add if is_string_like(lhs) || is_string_like(rhs) => "append",
        BinOp::Add => "plus",
        BinOp::Sub => "minus",
        BinOp::Mul => "times",
        BinOp::Div => "divided_by",
        _ => "modulo",
    };
    if !matches!(left.shape, Shape::Value | Shape::Filtered) {
        return Err(Failure::Unsupported(format!("`{filter}` on a condition")));
    }
    let right = value_operand(right, "arithmetic operand")?;
    Ok(Emitted::new(
        format!("{} | {filter}: {}", left.text, right.text),
        Shape::Filtered,
    ))
}

fn emit_call(callee: &Expr, args: &[Expr]) -> Result<Emitted, Failure> {
    match callee {
        Expr::Member(receiver, method) if args.is_empty() => {
            if let Some(filter) = method_filter(method) {
                let receiver = filtered_operand(emit(receiver)?, method)?;
                return Ok(Emitted::new(
                    format!("{} | {filter}", receiver.text),
                    Shape::Filtered,
                ));
            }
            Err(Failure::Unsupported(format!("call to `{method}`")))
        }
        Expr::Member(receiver, method)
            if method == "stringify"
                && matches!(receiver.as_ref(), Expr::Var(name) if name == "JSON")
                && args.len() == 1 =>
        {
            let value = filtered_operand(emit(&args[0])?, "JSON.stringify")?;
            Ok(Emitted::new(format!("{} | json", value.text), Shape::Filtered))
        }
        Expr::Var(name) => {
            let Some(idiom) = function_idiom(name) else {
                return Err(Failure::Unsupported(format!("call to `{name}`")));
            };
            let (first, rest) = match args {
                [first, rest @ ..] if rest.len() <= 1 => (first, rest),
                _ => {
                    return Err(Failure::Unsupported(format!(
                        "`{name}` with {} arguments",
                        args.len()
                    )));
                }
            };
            let value = filtered_operand(emit(first)?, name)?;
            let argument = match rest.first() {
                Some(Expr::Str(s)) => Some(quote(s)?),
                Some(_) => {
                    return Err(Failure::Unsupported(format!(
                        "non-literal `{name}` argument"
                    )));
                }
                None => idiom.default_arg.map(str::to_string),
            };
            let text = match argument {
                Some(arg) => format!("{} | {}: {arg}", value.text, idiom.filter),
                None => format!("{} | {}", value.text, idiom.filter),
            };
            Ok(Emitted::new(text, Shape::Filtered))
        }
        Expr::Member(_, method) => Err(Failure::Unsupported(format!("call to `{method}`"))),
        _ => Err(Failure::Unsupported("call of a computed function".to_string())),
    }
}

/// Template literals are emitted wrapped in marker tokens. The template
/// cleanup pass later strips the markers together with the output tag that
/// encloses them, leaving literal text with nested output tags.
fn emit_template(parts: &[TemplatePart]) -> Result<Emitted, Failure> {
    let mut text = String::from(TEMPLATE_START);
    for part in parts {
        match part {
            TemplatePart::Text(literal) => text.push_str(literal),
            TemplatePart::Expr(expr) => {
                let inner = filtered_operand(emit(expr)?, "template substitution")?;
                text.push_str(PART_START);
                text.push_str("{{ ");
                text.push_str(&inner.text);
                text.push_str(" }}");
                text.push_str(PART_END);
            }
        }
    }
    text.push_str(TEMPLATE_END);
    Ok(Emitted::new(text, Shape::Template))
}

fn value_operand(emitted: Emitted, context: &str) -> Result<Emitted, Failure> {
    if emitted.shape == Shape::Value {
        Ok(emitted)
    } else {
        Err(Failure::Unsupported(format!(
            "compound expression as {context}"
        )))
    }
}

fn filtered_operand(emitted: Emitted, context: &str) -> Result<Emitted, Failure> {
    match emitted.shape {
        Shape::Value | Shape::Filtered => Ok(emitted),
        _ => Err(Failure::Unsupported(format!(
            "compound expression in {context}"
        ))),
    }
}

fn is_string_like(expr: &Expr) -> bool {
    matches!(expr, Expr::Str(_) | Expr::Template(_))
}

fn quote(s: &str) -> Result<String, Failure> {
    if !s.contains('\'') {
        Ok(format!("'{s}'"))
    } else if !s.contains('"') {
        Ok(format!("\"{s}\""))
    } else {
        Err(Failure::Unsupported(
            "string containing both quote characters".to_string(),
        ))
    }
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parser::parse;

    fn liquid(source: &str) -> Result<String, Failure> {
        emit(&parse(source)?).map(|e| e.text)
    }

    #[test]
    fn test_emit_loop_index() {
        assert_eq!(liquid("$index").unwrap(), "forloop.index");
        assert_eq!(liquid("state.$index").unwrap(), "forloop.index");
        assert_eq!(liquid("items[$index]").unwrap(), "items[forloop.index]");
    }

    #[test]
    fn test_emit_state_prefix_dropped() {
        assert_eq!(liquid("state.product.title").unwrap(), "product.title");
        assert_eq!(liquid("state['cart']").unwrap(), "cart");
        assert!(liquid("state").is_err());
    }

    #[test]
    fn test_emit_comparisons_and_logic() {
        assert_eq!(liquid("a === 'x'").unwrap(), "a == 'x'");
        assert_eq!(liquid("a !== null").unwrap(), "a != nil");
        assert_eq!(liquid("a && b && c > 2").unwrap(), "a and b and c > 2");
        assert_eq!(liquid("a || b").unwrap(), "a or b");
        assert!(matches!(liquid("a && b || c"), Err(Failure::Unsupported(_))));
    }

    #[test]
    fn test_emit_arithmetic_filters() {
        assert_eq!(liquid("price * 2").unwrap(), "price | times: 2");
        assert_eq!(liquid("a + b - 1").unwrap(), "a | plus: b | minus: 1");
        assert_eq!(liquid("'Hi ' + name").unwrap(), "'Hi ' | append: name");
        assert_eq!(liquid("total / count").unwrap(), "total | divided_by: count");
        assert!(matches!(liquid("a + b * c"), Err(Failure::Unsupported(_))));
        assert!(matches!(liquid("a + (b == c)"), Err(Failure::Unsupported(_))));
    }

    #[test]
    fn test_emit_method_idioms() {
        assert_eq!(liquid("title.toUpperCase()").unwrap(), "title | upcase");
        assert_eq!(liquid("items.length").unwrap(), "items.size");
        assert_eq!(liquid("JSON.stringify(product)").unwrap(), "product | json");
        assert!(matches!(liquid("price.toFixed(2)"), Err(Failure::Unsupported(_))));
    }

    #[test]
    fn test_emit_img_url_idiom() {
        assert_eq!(
            liquid("img_url(product.featured_image)").unwrap(),
            "product.featured_image | img_url: 'master'"
        );
        assert_eq!(
            liquid("img_url(image, '300x300')").unwrap(),
            "image | img_url: '300x300'"
        );
        assert!(liquid("img_url(image, size)").is_err());
    }

    #[test]
    fn test_emit_unknown_function() {
        let err = liquid("formatMoney(price)").unwrap_err();
        assert_eq!(err, Failure::Unsupported("call to `formatMoney`".to_string()));
    }

    #[test]
    fn test_emit_string_quoting() {
        assert_eq!(liquid(r#""plain""#).unwrap(), "'plain'");
        assert_eq!(liquid(r#""it's""#).unwrap(), r#""it's""#);
    }

    #[test]
    fn test_emit_template_markers() {
        let text = liquid("`/p/${handle}`").unwrap();
        assert_eq!(
            text,
            format!("{TEMPLATE_START}/p/{PART_START}{{{{ handle }}}}{PART_END}{TEMPLATE_END}")
        );
    }

    #[test]
    fn test_emit_negation_needs_condition() {
        assert!(matches!(liquid("!visible"), Err(Failure::Unsupported(_))));
    }
}
