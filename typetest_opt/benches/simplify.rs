use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use typetest_opt::{find_synonym, Graph, PassPipeline, TypeTestNode};
use typetest_opt_lattice::testing::zoo;
use typetest_opt_lattice::{ObjectStamp, TypeHierarchy};

fn stamps(hierarchy: &TypeHierarchy) -> Vec<ObjectStamp> {
    hierarchy
        .types()
        .into_iter()
        .flat_map(|ty| {
            [
                ObjectStamp::object(ty),
                ObjectStamp::object_non_null(ty),
                ObjectStamp::exact(ty),
                ObjectStamp::exact_non_null(ty),
            ]
        })
        .collect()
}

/// A guard chain testing one value against every type, twice.
fn guard_chain(hierarchy: &TypeHierarchy) -> Graph {
    let mut graph = Graph::new();
    let value = graph.parameter(0, ObjectStamp::any().into());
    for _ in 0..2 {
        for ty in hierarchy.types() {
            let Ok(test) = TypeTestNode::create(&mut graph, ty, value) else {
                continue;
            };
            graph.add_guard(test, false);
        }
    }
    graph
}

fn bench_find_synonym(c: &mut Criterion) {
    let hierarchy = zoo();
    let stamps = stamps(&hierarchy);
    c.bench_function("find_synonym/all_pairs", |b| {
        b.iter(|| {
            for checked in &stamps {
                for input in &stamps {
                    let _ = black_box(find_synonym(checked, input));
                }
            }
        })
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let hierarchy = zoo();
    let graph = guard_chain(&hierarchy);
    let pipeline = PassPipeline::default_pipeline();
    c.bench_function("pipeline/guard_chain", |b| {
        b.iter_batched(
            || graph.clone(),
            |mut graph| black_box(pipeline.run(&mut graph)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_find_synonym, bench_pipeline);
criterion_main!(benches);
