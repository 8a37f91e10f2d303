//! Per-block rendering: wrapper element, bindings, loops, and conditions.

use std::collections::BTreeMap;
use std::fmt::Write;

use super::components::{self, Rendered};
use super::style::{css_property, responsive_rules};
use super::{RenderContext, css_class_for};
use crate::error::{DiagnosticKind, Error, Result};
use crate::expr::{Condition, Position, transpile_binding, transpile_condition, transpile_statement};
use crate::format::is_void_element;
use crate::model::BlockNode;
use crate::util::escape_html;

/// Where a binding's value ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target<'a> {
    Show,
    Hide,
    Option(&'a str),
    Style(&'a str),
    Attribute(&'a str),
    Unsupported,
}

impl<'a> Target<'a> {
    fn parse(path: &'a str) -> Self {
        let path = path.trim();
        let prefixed = |prefixes: &[&str]| {
            prefixes
                .iter()
                .find_map(|prefix| path.strip_prefix(prefix))
                .filter(|rest| !rest.is_empty())
        };
        match path {
            "show" => Target::Show,
            "hide" => Target::Hide,
            _ => {
                if let Some(name) = prefixed(&["component.options.", "options."]) {
                    Target::Option(name)
                } else if let Some(name) = prefixed(&["style."]) {
                    Target::Style(name)
                } else if let Some(name) = prefixed(&["properties.", "attributes."]) {
                    Target::Attribute(name)
                } else {
                    Target::Unsupported
                }
            }
        }
    }
}

/// Bindings of one block, translated and sorted by destination.
#[derive(Debug, Default)]
pub(crate) struct Bound {
    /// Component option name to output tag.
    pub options: BTreeMap<String, String>,
    /// CSS property to output tag, for the inline `style` attribute.
    pub styles: Vec<(String, String)>,
    /// Attribute name to output tag.
    pub attributes: BTreeMap<String, String>,
    pub conditions: Vec<Condition>,
}

/// Render a block and its subtree.
pub(crate) fn render_block(block: &BlockNode, ctx: &mut RenderContext) -> Result<String> {
    let class = css_class_for(&block.id);
    ctx.css.extend(responsive_rules(&class, &block.responsive_styles));
    if let Some(css) = &block.css_code {
        ctx.css.insert(css.as_str());
    }

    let tag = tag_name(block)?;
    let bound = bind(block, tag, ctx);

    let mut children = Vec::with_capacity(block.children.len());
    for child in &block.children {
        children.push(render_block(child, ctx)?);
    }
    let attrs = attributes(block, &class, &bound)?;
    let mut html = match components::render(block, &bound.options, children.join("\n"), &attrs, ctx)? {
        Rendered::Element(element) => element,
        Rendered::Inner(inner) if is_void_element(tag) => {
            if !inner.trim().is_empty() {
                return Err(Error::malformed(
                    format!("block {}", block.id),
                    format!("void element `{tag}` cannot have content"),
                ));
            }
            format!("<{tag}{attrs}>")
        }
        Rendered::Inner(inner) => format!("<{tag}{attrs}>{inner}</{tag}>"),
    };

    for condition in bound.conditions.iter().rev() {
        html = format!(
            "{{% {} %}}{html}{{% {} %}}",
            condition.opening(),
            condition.closing()
        );
    }
    if let Some(repeat) = &block.repeat {
        let statement = format!("for ({} in {})", repeat.item_name(), repeat.collection.trim());
        let opening = transpile_statement(&statement).unwrap_or_else(|err| {
            ctx.report(
                Some(block.id.as_str()),
                DiagnosticKind::UnsupportedExpression {
                    expression: repeat.collection.clone(),
                },
                err.to_string(),
            );
            format!("for {} in {}", repeat.item_name(), repeat.collection.trim())
        });
        html = format!("{{% {opening} %}}{html}{{% endfor %}}");
    }
    Ok(html)
}

fn tag_name(block: &BlockNode) -> Result<&str> {
    let tag = block.tag_name.as_deref().map(str::trim).unwrap_or("div");
    let tag = if tag.is_empty() { "div" } else { tag };
    let valid = tag.starts_with(|c: char| c.is_ascii_alphabetic())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(Error::malformed(
            format!("block {}", block.id),
            format!("invalid tag name `{tag}`"),
        ));
    }
    Ok(tag)
}

fn bind(block: &BlockNode, tag: &str, ctx: &mut RenderContext) -> Bound {
    let mut bound = Bound::default();
    let is_image = block.component_name() == Some("Image");

    for (path, expression) in &block.bindings {
        match Target::parse(path) {
            Target::Show => bound.conditions.push(condition(block, expression, false, ctx)),
            Target::Hide => bound.conditions.push(condition(block, expression, true, ctx)),
            Target::Option(name) => {
                let position = if is_image && matches!(name, "image" | "src") {
                    Position::ImageSrc
                } else {
                    Position::Output
                };
                let liquid = output(block, expression, position, ctx);
                bound.options.insert(name.to_string(), liquid);
            }
            Target::Style(name) => {
                let liquid = output(block, expression, Position::Style, ctx);
                bound.styles.push((css_property(name), liquid));
            }
            Target::Attribute(name) => {
                let position = if tag.eq_ignore_ascii_case("img") && name == "src" {
                    Position::ImageSrc
                } else {
                    Position::Attribute
                };
                let liquid = output(block, expression, position, ctx);
                bound.attributes.insert(name.to_string(), liquid);
            }
            Target::Unsupported => ctx.report(
                Some(block.id.as_str()),
                DiagnosticKind::UnsupportedExpression {
                    expression: expression.clone(),
                },
                format!("unsupported binding target `{path}`"),
            ),
        }
    }
    bound
}

/// `{{ liquid }}` for a binding; untranslatable expressions are kept as written.
fn output(block: &BlockNode, expression: &str, position: Position, ctx: &mut RenderContext) -> String {
    let liquid = transpile_binding(expression, position).unwrap_or_else(|err| {
        ctx.report(
            Some(block.id.as_str()),
            DiagnosticKind::UnsupportedExpression {
                expression: expression.to_string(),
            },
            err.to_string(),
        );
        expression.trim().to_string()
    });
    format!("{{{{ {liquid} }}}}")
}

fn condition(block: &BlockNode, expression: &str, hide: bool, ctx: &mut RenderContext) -> Condition {
    let condition = transpile_condition(expression).unwrap_or_else(|err| {
        ctx.report(
            Some(block.id.as_str()),
            DiagnosticKind::UnsupportedExpression {
                expression: expression.to_string(),
            },
            err.to_string(),
        );
        Condition {
            negated: false,
            expression: expression.trim().to_string(),
        }
    });
    if hide {
        Condition {
            negated: !condition.negated,
            expression: condition.expression,
        }
    } else {
        condition
    }
}

/// Wrapper attributes, each with a leading space.
fn attributes(block: &BlockNode, class: &str, bound: &Bound) -> Result<String> {
    let mut classes = format!("builder-block {class}");
    let mut style = String::new();
    let mut attrs: BTreeMap<&str, String> = BTreeMap::new();

    for (name, value) in &block.properties {
        check_attribute_name(block, name)?;
        match name.as_str() {
            "class" if !value.trim().is_empty() => {
                classes.push(' ');
                classes.push_str(&escape_html(value.trim()));
            }
            "class" => {}
            "style" => style.push_str(&escape_html(value.trim())),
            _ => {
                attrs.insert(name.as_str(), escape_html(value));
            }
        }
    }
    for (name, liquid) in &bound.attributes {
        check_attribute_name(block, name)?;
        attrs.insert(name.as_str(), liquid.clone());
    }
    for (property, liquid) in &bound.styles {
        if !style.is_empty() && !style.ends_with(';') {
            style.push(';');
        }
        if !style.is_empty() {
            style.push(' ');
        }
        write!(style, "{property}: {liquid};").unwrap();
    }

    let mut out = String::new();
    write!(
        out,
        " class=\"{classes}\" builder-id=\"{}\"",
        escape_html(&block.id)
    )
    .unwrap();
    for (name, value) in attrs {
        write!(out, " {name}=\"{value}\"").unwrap();
    }
    if !style.is_empty() {
        write!(out, " style=\"{style}\"").unwrap();
    }
    Ok(out)
}

fn check_attribute_name(block: &BlockNode, name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=' | '{' | '}'));
    if valid {
        Ok(())
    } else {
        Err(Error::malformed(
            format!("block {}", block.id),
            format!("invalid attribute name `{name}`"),
        ))
    }
}
