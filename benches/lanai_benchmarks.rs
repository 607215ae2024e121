//! Lanai REST Gateway Benchmarks
//!
//! This module contains benchmarks for the request pipeline of the Lanai REST
//! gateway. The benchmarks are implemented using the Criterion framework, which
//! provides statistical analysis and performance regression detection.
//!
//! To run the benchmarks:
//! ```bash
//! cargo bench --features benchmarking
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use http::Method;
use lanai_rest_lib::config::rest::RestConfig;
use lanai_rest_lib::config::LanaiConfig;
use lanai_rest_lib::protocol::dispatcher::resolve;
use lanai_rest_lib::protocol::formatter::{wrap, Reply};
use lanai_rest_lib::protocol::{
    handler_fn, Classifier, Dispatcher, MethodHandlerFn, RawRequest, WireFormat,
};
use lanai_rest_lib::registry::{Component, ComponentKind, ComponentTree, MethodTable, RegistryIndex};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

struct Echo;

impl Component for Echo {
    fn exports(self: Arc<Self>) -> Vec<(&'static str, MethodHandlerFn)> {
        vec![(
            "echo",
            handler_fn(|_ctx, params| async move { Ok(Reply::Value(params.into())) }),
        )]
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Index with `namespaces` namespaces of ten leaves each.
fn index(namespaces: usize) -> RegistryIndex {
    let mut tree = ComponentTree::default();
    tree.insert(ComponentKind::Controller, "C_Echo", Arc::new(Echo));

    let mut builder = MethodTable::builder();
    for ns in 0..namespaces {
        for leaf in 0..10 {
            let namespace = format!("domain{ns}.resource");
            builder = builder.bind(
                namespace.clone(),
                "1.0",
                format!("{namespace}.action{leaf}"),
                "C_Echo.echo",
            );
        }
    }
    RegistryIndex::bind(tree, &builder.build())
}

/// Benchmark envelope classification
fn bench_classifier(c: &mut Criterion) {
    let classifier = Classifier::new(&RestConfig::default());
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

    let mut group = c.benchmark_group("classifier");
    group.measurement_time(Duration::from_secs(2));

    let get = RawRequest::new(
        Method::GET,
        "/router/rest?method=reports.sales.summary&v=2.0&format=json&year=2023&region=emea",
    );
    group.bench_function("get_query", |b| {
        b.iter(|| runtime.block_on(classifier.classify(black_box(&get))))
    });

    let post = RawRequest::new(Method::POST, "/router/rest").with_body(
        "application/json",
        r#"{"method":"reports.sales.summary","v":"2.0","format":"json","year":2023}"#,
    );
    group.bench_function("post_json", |b| {
        b.iter(|| runtime.block_on(classifier.classify(black_box(&post))))
    });

    group.finish();
}

/// Benchmark method resolution against registries of growing size
fn bench_resolve(c: &mut Criterion) {
    let classifier = Classifier::new(&RestConfig::default());
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

    let mut group = c.benchmark_group("resolve");
    for namespaces in [10usize, 100, 1000] {
        let index = index(namespaces);
        let raw = RawRequest::new(
            Method::GET,
            &format!(
                "/router/rest?method=domain{}.resource.action7&v=1.0&format=json",
                namespaces / 2
            ),
        );
        let envelope = runtime.block_on(classifier.classify(&raw)).unwrap();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(namespaces), &envelope, |b, envelope| {
            b.iter(|| resolve(black_box(&index), black_box(envelope)).is_ok())
        });
    }
    group.finish();
}

/// Benchmark the full pipeline
fn bench_dispatch(c: &mut Criterion) {
    let dispatcher = Dispatcher::from_config(&LanaiConfig::default(), Arc::new(index(100)));
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let raw = RawRequest::new(
        Method::GET,
        "/router/rest?method=domain42.resource.action3&v=1.0&format=json&page=1",
    );

    c.bench_function("dispatch/get_json", |b| {
        b.to_async(&runtime)
            .iter(|| async { dispatcher.handle(black_box(raw.clone())).await })
    });
}

/// Benchmark response wrapping
fn bench_formatter(c: &mut Criterion) {
    let value = json!({
        "total": 3,
        "items": [
            {"id": 1, "name": "alpha", "active": true},
            {"id": 2, "name": "beta", "active": false},
            {"id": 3, "name": "gamma <&>", "active": null}
        ],
        "note": "contains ]]> terminator"
    });

    let mut group = c.benchmark_group("formatter");
    for (name, format) in [("json", WireFormat::Json), ("xml", WireFormat::Xml)] {
        group.bench_with_input(BenchmarkId::new("wrap", name), &format, |b, format| {
            b.iter(|| wrap(Reply::Value(black_box(value.clone())), *format))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_classifier,
    bench_resolve,
    bench_dispatch,
    bench_formatter
);
criterion_main!(benches);
