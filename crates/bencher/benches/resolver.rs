use bencher::{BenchCase, BenchSize};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use micro_stub::resolve::{InMemoryStore, RenderContext, Resolver};
use micro_stub::ResponseDefinition;
use std::hint::black_box;

static CASES: [BenchCase; 4] = [
    BenchCase::new("text_body", BenchSize::Small, include_str!("../resources/definition/text_body.json")),
    BenchCase::new("enriched_store", BenchSize::Small, include_str!("../resources/definition/enriched_store.json")),
    BenchCase::new("json_body", BenchSize::Large, include_str!("../resources/definition/json_body.json")),
    BenchCase::new("enriched_gzip", BenchSize::Large, include_str!("../resources/definition/enriched_gzip.json")),
];

fn cases_of(size: BenchSize) -> impl Iterator<Item = &'static BenchCase> {
    CASES.iter().filter(move |case| case.size() == size)
}

fn create_resolver() -> Resolver {
    // any json document serves as the stored payload
    let users = include_str!("../resources/definition/json_body.json");
    let store = InMemoryStore::new().with("db", "users", users);
    Resolver::builder().stores(store).build()
}

fn benchmark_parse(criterion: &mut Criterion) {
    for size in BenchSize::ALL {
        let mut group = criterion.benchmark_group(format!("parse_definition/{}", size.as_str()));

        for case in cases_of(size) {
            group.throughput(Throughput::Bytes(case.json().len() as u64));
            group.bench_with_input(BenchmarkId::from_parameter(case.name()), case, |b, case| {
                b.iter(|| {
                    let definition = ResponseDefinition::from_json(case.json()).expect("bench documents should be valid");
                    black_box(definition);
                });
            });
        }

        group.finish();
    }
}

fn benchmark_resolve(criterion: &mut Criterion) {
    let resolver = create_resolver();
    let context = RenderContext::empty();

    for size in BenchSize::ALL {
        let mut group = criterion.benchmark_group(format!("resolve_body/{}", size.as_str()));

        for case in cases_of(size) {
            let definition = ResponseDefinition::from_json(case.json()).expect("bench documents should be valid");
            let served = resolver.resolve(&definition, &context);
            assert!(served.is_present(), "{} should resolve", case.name());

            group.throughput(Throughput::Bytes(served.as_bytes().len() as u64));
            group.bench_with_input(BenchmarkId::from_parameter(case.name()), &definition, |b, definition| {
                b.iter(|| black_box(resolver.resolve(definition, &context)));
            });
        }

        group.finish();
    }
}

criterion_group!(resolver, benchmark_parse, benchmark_resolve);
criterion_main!(resolver);
