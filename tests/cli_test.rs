//! Tests for the `blockliquid` command-line tool.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/product.json");

fn blockliquid(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_blockliquid"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run blockliquid")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

#[test]
fn test_prints_template_with_inline_styles() {
    let output = blockliquid(&[FIXTURE]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(r#"builder-model="product-page""#));
    assert!(stdout.contains("<style type=\"text/css\""));
    assert!(stdout.contains("{{ product.title }}"));
}

#[test]
fn test_model_flag_overrides_content() {
    let output = blockliquid(&[FIXTURE, "--model", "collection"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(r#"builder-model="collection""#));
    assert!(!stdout.contains("product-page"));
}

#[test]
fn test_writes_template_and_stylesheet() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("product.liquid");

    let output = blockliquid(&[FIXTURE, "--extract-css", "-o", path_arg(&out), "--quiet"]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(!html.contains("<style"));

    let css = std::fs::read_to_string(dir.path().join("product.css")).unwrap();
    assert!(css.contains(".builder-hero {"));
}

#[test]
fn test_css_out_implies_extraction() {
    let dir = TempDir::new().unwrap();
    let css_out = dir.path().join("styles.css");

    let output = blockliquid(&[FIXTURE, "--css-out", path_arg(&css_out)]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("<style"));
    assert!(std::fs::read_to_string(&css_out).unwrap().contains(".badge {"));
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("options.json");
    let css_out = dir.path().join("out.css");
    std::fs::write(
        &config,
        r#"{ "extractCss": true, "formatter": { "tabWidth": 4 }, "generator": "acme" }"#,
    )
    .unwrap();

    let output = blockliquid(&[
        FIXTURE,
        "--config",
        path_arg(&config),
        "--css-out",
        path_arg(&css_out),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Generated by acme on"));
    let css = std::fs::read_to_string(&css_out).unwrap();
    assert!(css.contains("\n    font-weight: 600;\n"));
}

#[test]
fn test_malformed_input_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.json");
    std::fs::write(&input, r#"{ "id": "c1", "data": { "blocksString": "[" } }"#).unwrap();

    let output = blockliquid(&[path_arg(&input)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("error: "));
}

#[test]
fn test_missing_input_fails() {
    let output = blockliquid(&["/nonexistent/content.json"]);
    assert!(!output.status.success());
}
