/*!
# Query Benchmarks

Benchmarks for the extract, compile, validate and transform pipeline.

## Usage

```bash
# Run all benchmarks
cargo bench --bench query_benchmarks

# Run specific benchmark group
cargo bench --bench query_benchmarks -- "Compile"

# Quick benchmark with fewer samples
cargo bench --bench query_benchmarks -- --quick
```

HTML reports are generated in `target/criterion/report/index.html`.
*/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use filterkit::transform::{Cardinality, FieldType, FieldTypeHandler, RelationHandler};
use filterkit::{
    FilterRequest, OrderRule, QueryBuilder, QueryParams, Specification, TransformConfig, compile,
    extract_params, transform_where,
};
use serde_json::json;
use std::hint::black_box;
use std::time::Duration;

fn wide_request(size: usize) -> FilterRequest {
    let mut request = FilterRequest::new()
        .search("title", "benchmark")
        .search("content", "benchmark")
        .range("createdAt", "2024-01-01T00:00:00Z", "2024-12-31T00:00:00Z")
        .order("viewCount", Some(OrderRule::Desc))
        .page(3)
        .rows(25);
    for i in 0..size {
        request = request
            .filter(format!("field{i}"), format!("value{i}"))
            .filter(format!("author.tag{i}"), json!([i, i + 1, i + 2]));
    }
    request
}

fn blog_config() -> TransformConfig {
    TransformConfig::new()
        .map_relation("authorName", "author")
        .rename("authorName", "name")
        .map_relation("tag", "tags")
        .rename("tag", "label")
        .relation_handler("tag", RelationHandler::new(Cardinality::Many))
        .type_handler("viewCount", FieldTypeHandler::new(FieldType::Number))
        .type_handler("published", FieldTypeHandler::new(FieldType::Boolean))
        .type_handler("createdAt", FieldTypeHandler::new(FieldType::Date))
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("Extract");

    let params = QueryParams {
        filters: Some(r#"{"published":"true","authorName":"Ada","tag":["rust","db"]}"#.into()),
        search_filters: Some(r#"{"title":"performance"}"#.into()),
        ranged_filters: Some(
            r#"[{"key":"createdAt","start":"2024-01-01","end":"2024-06-30"}]"#.into(),
        ),
        order_key: Some("viewCount".into()),
        order_rule: Some("desc".into()),
        page: Some("2".into()),
        rows: Some("50".into()),
    };
    group.bench_function("query_params", |b| {
        b.iter(|| extract_params(black_box(&params)));
    });

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("Compile");

    for size in [1, 10, 100] {
        let request = wide_request(size);
        group.bench_with_input(BenchmarkId::new("compile", size), &request, |b, request| {
            b.iter(|| compile(black_box(request)));
        });
    }

    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("Transform");
    group.measurement_time(Duration::from_secs(5));

    let config = blog_config();
    for size in [1, 10, 100] {
        let where_clause = compile(&wide_request(size)).where_clause;
        group.bench_with_input(
            BenchmarkId::new("transform_where", size),
            &where_clause,
            |b, where_clause| {
                b.iter(|| transform_where(black_box(where_clause), &config));
            },
        );
    }

    let builder = QueryBuilder::new()
        .with_specification(
            Specification::new()
                .allow_fields(["published", "authorName", "tag", "title", "createdAt"])
                .max_page_size(100),
        )
        .with_transform_config(config);
    let request = FilterRequest::new()
        .filter("published", "true")
        .filter("authorName", "Ada")
        .filter("tag", json!(["rust", "db"]))
        .search("title", "performance")
        .range("createdAt", "2024-01-01", "2024-06-30")
        .order("viewCount", Some(OrderRule::Desc))
        .page(2)
        .rows(50);
    group.bench_function("full_build", |b| {
        b.iter(|| builder.build(black_box(&request)));
    });

    group.finish();
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(3))
        .warm_up_time(Duration::from_secs(1))
        .with_plots()
        .with_output_color(true)
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_extract, bench_compile, bench_transform
}
criterion_main!(benches);
