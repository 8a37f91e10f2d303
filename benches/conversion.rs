//! Benchmarks for the content-to-Liquid pipeline.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use blockliquid::css::consolidate;
use blockliquid::template::round_trip;
use blockliquid::{
    BlockNode, ContentTree, CssCollector, FormatOptions, RenderOptions, content_to_liquid, format_html,
    transpile,
};

const PRODUCT_JSON: &str = include_str!("../tests/fixtures/product.json");

/// A larger tree: the fixture's blocks repeated under fresh ids.
fn load_large_content(copies: usize) -> ContentTree {
    let base = ContentTree::from_json(PRODUCT_JSON).unwrap();
    let mut content = ContentTree::new("large");
    for i in 0..copies {
        for block in &base.data.blocks {
            let mut block = block.clone();
            suffix_ids(&mut block, i);
            content = content.with_block(block);
        }
    }
    content
}

fn suffix_ids(block: &mut BlockNode, copy: usize) {
    block.id = format!("{}-{copy}", block.id);
    for child in &mut block.children {
        suffix_ids(child, copy);
    }
}

// ============================================================================
// Whole pipeline
// ============================================================================

fn bench_content_to_liquid(c: &mut Criterion) {
    let content = ContentTree::from_json(PRODUCT_JSON).unwrap();
    let options = RenderOptions::default();

    c.bench_function("content_to_liquid", |b| {
        b.iter(|| content_to_liquid(&content, "product", &options).unwrap());
    });
}

fn bench_content_to_liquid_large(c: &mut Criterion) {
    let content = load_large_content(50);
    let options = RenderOptions::default().with_extract_css(true);

    c.bench_function("content_to_liquid_large", |b| {
        b.iter(|| content_to_liquid(&content, "product", &options).unwrap());
    });
}

// ============================================================================
// Individual passes
// ============================================================================

fn bench_consolidate(c: &mut Criterion) {
    let mut collector = CssCollector::new();
    for i in 0..200 {
        collector.insert(format!(".builder-{i} {{ display: flex; padding-top: {i}px; }}"));
        collector.insert(format!(
            "@media (max-width: 640px) {{ .builder-{i} {{ flex-direction: column; }} }}"
        ));
    }
    let options = FormatOptions::default();

    c.bench_function("consolidate", |b| {
        b.iter(|| consolidate(&collector, &options).unwrap());
    });
}

fn bench_transpile(c: &mut Criterion) {
    let expressions = [
        "product.title",
        "state.$index",
        "product.available === true && !product.hidden",
        "`${product.price} ${shop.currency}`",
        "variant.title.toUpperCase()",
    ];

    c.bench_function("transpile", |b| {
        b.iter(|| {
            for expression in &expressions {
                let _ = transpile(expression);
            }
        });
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let markup = "<div class=\"builder-block\">{% if product.available %}<span>{{ product.title }}</span>{% endif %}</div>"
        .repeat(100);
    let options = FormatOptions::default();

    c.bench_function("round_trip", |b| {
        b.iter(|| round_trip(&markup, &options).unwrap());
    });

    c.bench_function("format_html", |b| {
        b.iter(|| format_html(&markup, &options));
    });
}

criterion_group!(
    benches,
    // Whole pipeline
    bench_content_to_liquid,
    bench_content_to_liquid_large,
    // Passes
    bench_consolidate,
    bench_transpile,
    bench_round_trip,
);
criterion_main!(benches);
