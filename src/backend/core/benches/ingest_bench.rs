//! Benchmarks for tag lookup and in-memory ingestion.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use mi8_core::events::NewsDraft;
use mi8_core::scoring::{impact_of, ImpactTable};
use mi8_core::service::NewsService;
use mi8_core::storage::InMemoryBackend;

fn bench_impact_of(c: &mut Criterion) {
    let mut group = c.benchmark_group("impact_of");
    let table = ImpactTable::global();
    group.bench_function("single_known", |b| { b.iter(|| black_box(impact_of(&["innovation"]))); });
    group.bench_function("single_unknown", |b| { b.iter(|| black_box(impact_of(&["weather"]))); });
    group.bench_function("mixed_case_five", |b| { b.iter(|| black_box(impact_of(&["Crime", "CULTURE", "tech", "Healthcare", "disaster"]))); });
    group.bench_function("all_known_tags", |b| { let tags = table.known_tags(); b.iter(|| black_box(table.impact_of(&tags))); });
    group.finish();
}

fn bench_ingest_single_city(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_single_city");
    let rt = tokio::runtime::Runtime::new().unwrap();
    group.throughput(Throughput::Elements(1));
    group.bench_function("scored", |b| {
        let service = NewsService::new(Arc::new(InMemoryBackend::new()));
        b.iter(|| { rt.block_on(async { black_box(service.ingest(NewsDraft::new("bench").located("Berlin", "Germany").tags(["innovation", "crime"])).await.unwrap()); }); });
    });
    group.bench_function("cityless", |b| {
        let service = NewsService::new(Arc::new(InMemoryBackend::new()));
        b.iter(|| { rt.block_on(async { black_box(service.ingest(NewsDraft::new("bench").tag("crisis")).await.unwrap()); }); });
    });
    group.finish();
}

fn bench_ingest_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_concurrent");
    let rt = tokio::runtime::Runtime::new().unwrap();
    for cities in [1usize, 8, 64] {
        group.throughput(Throughput::Elements(64));
        group.bench_with_input(BenchmarkId::from_parameter(cities), &cities, |b, &cities| {
            let service = NewsService::new(Arc::new(InMemoryBackend::new()));
            b.iter(|| {
                rt.block_on(async {
                    let tasks: Vec<_> = (0..64).map(|i| {
                        let service = service.clone();
                        tokio::spawn(async move { service.ingest(NewsDraft::new("bench").located(format!("city-{}", i % cities), "").tag("culture")).await })
                    }).collect();
                    for task in futures::future::join_all(tasks).await { task.unwrap().unwrap(); }
                });
            });
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = NewsService::new(Arc::new(InMemoryBackend::new()));
    rt.block_on(async {
        for i in 0..1_000 { service.ingest(NewsDraft::new("seed").located(format!("city-{}", i % 100), "").tag("entertainment")).await.unwrap(); }
    });
    group.bench_function("latest_global_50", |b| { b.iter(|| rt.block_on(async { black_box(service.latest_global(50).await.unwrap()) })); });
    group.bench_function("latest_for_city_10", |b| { b.iter(|| rt.block_on(async { black_box(service.latest_for_city("CITY-7", 10).await.unwrap()) })); });
    group.bench_function("top_cities_10", |b| { b.iter(|| rt.block_on(async { black_box(service.top_cities(10).await.unwrap()) })); });
    group.bench_function("score_of", |b| { b.iter(|| rt.block_on(async { black_box(service.score_of("city-42").await.unwrap()) })); });
    group.finish();
}

criterion_group!(benches, bench_impact_of, bench_ingest_single_city, bench_ingest_concurrent, bench_queries);
criterion_main!(benches);
