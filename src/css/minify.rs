//! Structural minification passes over the rule model.

use super::parse::{AtRule, AtRuleBody, CssNode, Declaration, Stylesheet};

/// Level-1 cleanup: lowercase property names, deduplicate selectors within a
/// rule, and drop empty rules and empty at-rule blocks.
pub fn level_one(sheet: &mut Stylesheet) {
    level_one_nodes(&mut sheet.nodes);
}

fn level_one_nodes(nodes: &mut Vec<CssNode>) {
    for node in nodes.iter_mut() {
        match node {
            CssNode::Rule(rule) => {
                lowercase_properties(&mut rule.declarations);
                let mut seen = Vec::with_capacity(rule.selectors.len());
                rule.selectors.retain(|s| {
                    if seen.contains(s) {
                        false
                    } else {
                        seen.push(s.clone());
                        true
                    }
                });
            }
            CssNode::AtRule(at_rule) => match &mut at_rule.body {
                AtRuleBody::Rules(children) => level_one_nodes(children),
                AtRuleBody::Declarations(declarations) => lowercase_properties(declarations),
                AtRuleBody::Statement => {}
            },
        }
    }
    nodes.retain(|node| !is_empty(node));
}

fn lowercase_properties(declarations: &mut [Declaration]) {
    for declaration in declarations {
        // Custom properties are case-sensitive.
        if !declaration.property.starts_with("--") {
            declaration.property.make_ascii_lowercase();
        }
    }
}

fn is_empty(node: &CssNode) -> bool {
    match node {
        CssNode::Rule(rule) => rule.declarations.is_empty() || rule.selectors.is_empty(),
        CssNode::AtRule(at_rule) => match &at_rule.body {
            AtRuleBody::Statement => false,
            AtRuleBody::Rules(children) => children.is_empty(),
            AtRuleBody::Declarations(declarations) => declarations.is_empty(),
        },
    }
}

/// Restructuring passes, repeated until the rule list stops shrinking:
///
/// - keep only the winning declaration for each property
/// - drop a rule when an identical rule follows it in the same block
/// - merge adjacent rules with equal selectors
/// - merge adjacent rules with equal declarations
/// - merge adjacent at-rules with equal name and prelude
pub fn restructure(sheet: &mut Stylesheet) {
    restructure_nodes(&mut sheet.nodes);
}

fn restructure_nodes(nodes: &mut Vec<CssNode>) {
    for node in nodes.iter_mut() {
        match node {
            CssNode::Rule(rule) => dedupe_properties(&mut rule.declarations),
            CssNode::AtRule(at_rule) => match &mut at_rule.body {
                AtRuleBody::Rules(children) => restructure_nodes(children),
                AtRuleBody::Declarations(declarations) => dedupe_properties(declarations),
                AtRuleBody::Statement => {}
            },
        }
    }

    loop {
        let before = nodes.len();
        drop_overridden_duplicates(nodes);
        merge_adjacent(nodes);
        if nodes.len() == before {
            break;
        }
    }
}

/// Later declarations win unless an earlier one is `!important` and the
/// later one is not. The winner keeps the position of its last occurrence.
///
/// An earlier declaration with a vendor-prefixed value is a fallback for
/// browsers that reject the later one (`display:-webkit-flex;display:flex`)
/// and is kept unless the later value is identical.
fn dedupe_properties(declarations: &mut Vec<Declaration>) {
    let mut kept: Vec<Declaration> = Vec::with_capacity(declarations.len());
    for declaration in declarations.drain(..) {
        let overridden = kept.iter().position(|d| {
            d.property == declaration.property
                && (d.value == declaration.value || !has_vendor_prefix(&d.value))
        });
        match overridden {
            Some(i) if kept[i].important && !declaration.important => {}
            Some(i) => {
                kept.remove(i);
                kept.push(declaration);
            }
            None => kept.push(declaration),
        }
    }
    *declarations = kept;
}

const VENDOR_PREFIXES: &[&str] = &["-webkit-", "-moz-", "-ms-", "-o-"];

fn has_vendor_prefix(value: &str) -> bool {
    value
        .split(|c: char| c.is_whitespace() || c == '(' || c == ',')
        .any(|word| VENDOR_PREFIXES.iter().any(|prefix| word.starts_with(prefix)))
}

fn drop_overridden_duplicates(nodes: &mut Vec<CssNode>) {
    let mut keep = vec![true; nodes.len()];
    for i in 0..nodes.len() {
        if matches!(nodes[i], CssNode::Rule(_)) && nodes[i + 1..].contains(&nodes[i]) {
            keep[i] = false;
        }
    }
    let mut flags = keep.into_iter();
    nodes.retain(|_| flags.next().unwrap_or(true));
}

fn merge_adjacent(nodes: &mut Vec<CssNode>) {
    let mut merged: Vec<CssNode> = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        if let Some(previous) = merged.last_mut() {
            if merge_into(previous, &node) {
                continue;
            }
        }
        merged.push(node);
    }
    *nodes = merged;
}

/// Fold `next` into `previous` if the two can be combined.
fn merge_into(previous: &mut CssNode, next: &CssNode) -> bool {
    match (previous, next) {
        (CssNode::Rule(prev), CssNode::Rule(next)) if prev.selectors == next.selectors => {
            prev.declarations.extend(next.declarations.iter().cloned());
            dedupe_properties(&mut prev.declarations);
            true
        }
        (CssNode::Rule(prev), CssNode::Rule(next)) if prev.declarations == next.declarations => {
            for selector in &next.selectors {
                if !prev.selectors.contains(selector) {
                    prev.selectors.push(selector.clone());
                }
            }
            true
        }
        (CssNode::AtRule(prev), CssNode::AtRule(next)) if same_block(prev, next) => {
            if let (AtRuleBody::Rules(into), AtRuleBody::Rules(from)) = (&mut prev.body, &next.body)
            {
                into.extend(from.iter().cloned());
                restructure_nodes(into);
            }
            true
        }
        _ => false,
    }
}

fn same_block(a: &AtRule, b: &AtRule) -> bool {
    a.name == b.name
        && a.prelude == b.prelude
        && matches!(a.body, AtRuleBody::Rules(_))
        && matches!(b.body, AtRuleBody::Rules(_))
}
