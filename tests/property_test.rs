//! Property tests for the template and stylesheet passes.

use proptest::prelude::*;

use blockliquid::css::consolidate;
use blockliquid::expr::{PART_END, PART_START, TEMPLATE_END, TEMPLATE_START};
use blockliquid::template::{cleanup, disguise, reveal, tokenize};
use blockliquid::{CssCollector, FormatOptions, transpile};

/// Markup fragments that exercise every delimiter and marker.
fn markup() -> impl Strategy<Value = String> {
    let pieces = prop::sample::select(vec![
        "{{ ",
        " }}",
        "{% ",
        " %}",
        "{%",
        "}}",
        "for (x in y)",
        "if a",
        "a.b",
        " ",
        "<p>",
        "</p>",
        TEMPLATE_START,
        PART_START,
        PART_END,
        TEMPLATE_END,
    ]);
    prop::collection::vec(pieces, 0..40).prop_map(|pieces| pieces.concat())
}

/// Source expressions inside the supported subset. Identifiers carry an
/// underscore so they never collide with keywords.
fn expression() -> impl Strategy<Value = String> {
    let ident = "[a-z]{1,5}_[a-z0-9]{0,3}";
    let path = prop::collection::vec(ident, 1..4).prop_map(|parts| parts.join("."));
    prop_oneof![
        path.clone(),
        path.clone().prop_map(|p| format!("state.{p}")),
        (path.clone(), path).prop_map(|(a, b)| format!("{a} && {b}")),
    ]
}

fn declaration() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["color", "margin", "padding", "display"]),
        prop::sample::select(vec!["red", "0", "1px 2px", "block", "none"]),
    )
        .prop_map(|(property, value)| format!("{property}:{value}"))
}

fn rule() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec![".a", ".b", ".c>.d", "p"]),
        prop::collection::vec(declaration(), 1..4),
    )
        .prop_map(|(selector, declarations)| format!("{selector}{{{}}}", declarations.join(";")))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn cleanup_is_idempotent(markup in markup()) {
        let once = cleanup(tokenize(&markup)).unwrap();
        let twice = cleanup(once.clone()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn reveal_undoes_disguise(expr in expression()) {
        let liquid = transpile(&expr).unwrap();
        let markup = format!("<p>{{{{ {liquid} }}}}</p>");
        let tokens = tokenize(&markup);
        prop_assert_eq!(reveal(&disguise(&tokens)), markup);
    }

    #[test]
    fn repeated_fragments_do_not_change_stylesheet(
        rules in prop::collection::vec(rule(), 1..6)
    ) {
        let options = FormatOptions::default();

        let mut once = CssCollector::new();
        let mut twice = CssCollector::new();
        for rule in &rules {
            once.insert(rule.clone());
            twice.insert(rule.clone());
            twice.insert(rule.clone());
        }

        let sheet = consolidate(&once, &options).unwrap();
        prop_assert_eq!(&sheet, &consolidate(&twice, &options).unwrap());

        let mut again = CssCollector::new();
        again.insert(sheet.clone());
        prop_assert_eq!(consolidate(&again, &options).unwrap(), sheet);
    }
}
