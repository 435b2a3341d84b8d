//! Compiled template throughput benchmarks
//!
//! Measures applying one compiled template to data of growing size:
//! - Member counts (1, 10, 100, 1000)
//! - Code templates versus expression templates
//!
//! Run benchmarks: `cargo bench --bench apply_throughput`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ldtemplate::{Indent, JsonParser, TemplateNode, compile};
use serde_json::{Value, json};
use std::hint::black_box;

fn expression_template() -> &'static str {
    r#"{
        "_template": {
            "@id": "urn:org:{{ name }}",
            "members": {
                "@id": "urn:org:{{ $parent.name }}/{{ $index }}",
                "@type": "Person",
                "address": { "@id": "{{ $parent.@id }}/address" }
            }
        },
        "_schema": { "@context": { "@vocab": "http://schema.org/" } }
    }"#
}

fn code_template() -> TemplateNode {
    TemplateNode::mapping()
        .with("@id", TemplateNode::function(|this| json!(format!("urn:org:{}", this.get("name").map(|n| n.to_string()).unwrap_or_default()))))
        .with(
            "members",
            TemplateNode::mapping()
                .with(
                    "@id",
                    TemplateNode::function(|this| {
                        let org = this.path("$parent.name").map(|n| n.to_string()).unwrap_or_default();
                        json!(format!("urn:org:{org}/{}", this.index().unwrap_or_default()))
                    }),
                )
                .with("@type", "Person"),
        )
}

/// Generate an organisation with `count` members
fn generate_data(count: usize) -> Value {
    let members: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "name": format!("Member {}", i),
                "address": { "city": "Oslo", "zip": i }
            })
        })
        .collect();
    json!({ "name": "acme", "members": members })
}

fn bench_code_template(c: &mut Criterion) {
    let compiled = compile(code_template());
    let mut group = c.benchmark_group("code_template");

    for count in [1, 10, 100, 1000] {
        let data = generate_data(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &data, |b, data| {
            b.iter(|| compiled.apply(black_box(data)));
        });
    }
    group.finish();
}

fn bench_expression_template(c: &mut Criterion) {
    let compiled = match JsonParser::new().parse(expression_template()) {
        Ok(compiled) => compiled,
        Err(e) => panic!("benchmark template failed to compile: {e}"),
    };
    let mut group = c.benchmark_group("expression_template");

    for count in [1, 10, 100, 1000] {
        let data = generate_data(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &data, |b, data| {
            b.iter(|| compiled.render(black_box(data), &Indent::Compact));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_code_template, bench_expression_template);
criterion_main!(benches);
