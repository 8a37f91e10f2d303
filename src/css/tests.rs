//! Stylesheet consolidation tests.

use super::*;
use crate::error::Error;

fn consolidate_str(fragments: &[&str]) -> String {
    let mut collector = CssCollector::new();
    for fragment in fragments {
        collector.insert(*fragment);
    }
    consolidate(&collector, &FormatOptions::default()).unwrap()
}

#[test]
fn test_minify_simple_rule() {
    assert_eq!(minify(".a { color: red; }").unwrap(), ".a{color:red}");
    assert_eq!(
        minify(".a , .b { margin : 0 auto ; }").unwrap(),
        ".a,.b{margin:0 auto}"
    );
}

#[test]
fn test_collector_dedups_identical_fragments() {
    let mut collector = CssCollector::new();
    assert!(collector.insert(".a{color:red}"));
    assert!(!collector.insert(".a{color:red}"));
    assert!(collector.insert(".b{color:red}"));
    assert!(!collector.insert("\n  \n"));
    assert_eq!(collector.len(), 2);
}

#[test]
fn test_duplicate_fragments_yield_one_rule() {
    let css = consolidate_str(&[".a{color:red}", ".a{color:red}"]);
    assert_eq!(css, ".a {\n  color: red;\n}\n");
}

#[test]
fn test_empty_collector_is_empty_stylesheet() {
    assert_eq!(consolidate_str(&[]), "");
    assert_eq!(consolidate_str(&["   "]), "");
}

#[test]
fn test_top_level_rules_separated_by_blank_line() {
    let css = consolidate_str(&[".a{color:red}", ".b{margin:0}"]);
    assert_eq!(css, ".a {\n  color: red;\n}\n\n.b {\n  margin: 0;\n}\n");
}

#[test]
fn test_equal_declarations_merge_selectors() {
    let css = consolidate_str(&[".a{color:red}", ".b{color:red}"]);
    assert_eq!(css, ".a,\n.b {\n  color: red;\n}\n");
}

#[test]
fn test_entities_decoded_before_parsing() {
    let css = consolidate_str(&[".a &gt; .b { content: &quot;x&quot; }"]);
    assert_eq!(css, ".a > .b {\n  content: \"x\";\n}\n");
}

#[test]
fn test_empty_declarations_dropped() {
    let css = consolidate_str(&[".a{color:;margin:0}"]);
    assert_eq!(css, ".a {\n  margin: 0;\n}\n");
}

#[test]
fn test_important_wins_over_later_declaration() {
    let css = consolidate_str(&[".a{color:red!important;color:blue}"]);
    assert_eq!(css, ".a {\n  color: red !important;\n}\n");
}

#[test]
fn test_vendor_prefixed_fallback_kept() {
    let css = consolidate_str(&[".a{display:-webkit-flex;display:flex}"]);
    assert_eq!(css, ".a {\n  display: -webkit-flex;\n  display: flex;\n}\n");

    let css = consolidate_str(&[".a{background:-moz-linear-gradient(red,blue);background:red}"]);
    assert!(css.contains("-moz-linear-gradient"));

    // A repeated prefixed value is still a duplicate.
    let css = consolidate_str(&[".a{display:-webkit-box;display:-webkit-box}"]);
    assert_eq!(css, ".a {\n  display: -webkit-box;\n}\n");

    // Only earlier prefixed values are fallbacks.
    let css = consolidate_str(&[".a{display:flex;display:-webkit-flex}"]);
    assert_eq!(css, ".a {\n  display: -webkit-flex;\n}\n");
}

#[test]
fn test_value_commas_padded() {
    let css = consolidate_str(&[r#".a{font-family:"Helvetica Neue",Arial,sans-serif}"#]);
    assert_eq!(
        css,
        ".a {\n  font-family: \"Helvetica Neue\", Arial, sans-serif;\n}\n"
    );
}

#[test]
fn test_media_rules_nested_and_indented() {
    let css = consolidate_str(&[
        ".a{color:red}",
        "@media (max-width: 640px) { .a { color: blue } }",
    ]);
    assert_eq!(
        css,
        concat!(
            ".a {\n",
            "  color: red;\n",
            "}\n",
            "\n",
            "@media (max-width: 640px) {\n",
            "  .a {\n",
            "    color: blue;\n",
            "  }\n",
            "}\n"
        )
    );
}

#[test]
fn test_adjacent_media_blocks_merge() {
    let css = consolidate_str(&[
        "@media (max-width: 640px) { .a { color: blue } }",
        "@media (max-width: 640px) { .b { margin: 0 } }",
    ]);
    assert_eq!(
        css,
        concat!(
            "@media (max-width: 640px) {\n",
            "  .a {\n",
            "    color: blue;\n",
            "  }\n",
            "  .b {\n",
            "    margin: 0;\n",
            "  }\n",
            "}\n"
        )
    );
}

#[test]
fn test_keyframes_and_font_face() {
    let css = consolidate_str(&[
        "@keyframes spin{from{transform:rotate(0deg)}to{transform:rotate(360deg)}}",
        "@font-face{font-family:X;src:url(a.woff)}",
    ]);
    assert_eq!(
        css,
        concat!(
            "@keyframes spin {\n",
            "  from {\n",
            "    transform: rotate(0deg);\n",
            "  }\n",
            "  to {\n",
            "    transform: rotate(360deg);\n",
            "  }\n",
            "}\n",
            "\n",
            "@font-face {\n",
            "  font-family: X;\n",
            "  src: url(a.woff);\n",
            "}\n"
        )
    );
}

#[test]
fn test_statement_at_rule() {
    let css = consolidate_str(&["@import url(x.css);"]);
    assert_eq!(css, "@import url(x.css);\n");
}

#[test]
fn test_pretty_honors_tabs() {
    let mut collector = CssCollector::new();
    collector.insert("@media print{.a{color:red}}");
    let options = FormatOptions {
        use_tabs: true,
        ..FormatOptions::default()
    };
    let css = consolidate(&collector, &options).unwrap();
    assert_eq!(css, "@media print {\n\t.a {\n\t\tcolor: red;\n\t}\n}\n");
}

#[test]
fn test_empty_selector_is_error() {
    let mut collector = CssCollector::new();
    collector.insert("{color:red}");
    let err = consolidate(&collector, &FormatOptions::default()).unwrap_err();
    assert!(matches!(err, Error::StyleMinification { .. }));
}

#[test]
fn test_consolidation_is_stable() {
    let once = consolidate_str(&[".b>.c{margin:0 auto;color:red}", ".d{color:red}"]);
    let twice = consolidate_str(&[&once]);
    assert_eq!(once, twice);
}
