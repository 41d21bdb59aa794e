use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scopewire::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let mut container = Container::new();
    container.register_instance(42u64);

    // Prime the singleton
    let _ = container.resolve::<u64>().unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = container.resolve::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let mut container = Container::new();
                container
                    .register_factory(|_| ExpensiveToCreate {
                        data: (0..1000).collect(),
                    })
                    .as_singleton();
                container
            },
            |container| {
                let v = container.resolve::<ExpensiveToCreate>().unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_per_scope_vs_transient(c: &mut Criterion) {
    struct Service {
        data: [u8; 64],
    }

    let mut group = c.benchmark_group("per_scope_vs_transient");

    let mut scoped = Container::new();
    scoped.register_factory(|_| Service { data: [0; 64] }).per_scope();
    let scope = scoped.create_scope();
    let _ = scope.resolve::<Service>().unwrap();

    group.bench_function("per_scope_hit", |b| {
        b.iter(|| black_box(scope.resolve::<Service>().unwrap().data[0]))
    });

    let mut transient = Container::new();
    transient.register_factory(|_| Service { data: [0; 64] });

    group.bench_function("transient", |b| {
        b.iter(|| black_box(transient.resolve::<Service>().unwrap().data[0]))
    });

    group.finish();
}

fn bench_create_scope(c: &mut Criterion) {
    struct Request(u32);

    let mut container = Container::new();
    container.register_factory(|_| Request(7)).per_scope();

    c.bench_function("create_scope_resolve_dispose", |b| {
        b.iter(|| {
            let scope = container.create_scope();
            black_box(scope.resolve::<Request>().unwrap().0);
            scope.dispose();
        })
    });
}

fn bench_type_descriptor_depth(c: &mut Criterion) {
    struct Leaf;
    struct Node(#[allow(dead_code)] Arc<Leaf>);
    struct Root(#[allow(dead_code)] Arc<Node>, #[allow(dead_code)] Arc<Leaf>);

    let mut group = c.benchmark_group("type_descriptor");
    for lifetime in [Lifetime::Transient, Lifetime::PerScope] {
        let mut container = Container::new();
        container.register_factory(|_| Leaf).as_singleton();
        let node = container
            .register_type(
                TypeDescriptor::<Node>::new()
                    .public_constructor()
                    .param::<Leaf>()
                    .build(|args| Ok(Node(args.next()?))),
            )
            .unwrap();
        if lifetime == Lifetime::PerScope {
            node.per_scope();
        }
        container
            .register_type(
                TypeDescriptor::<Root>::new()
                    .public_constructor()
                    .param::<Node>()
                    .param::<Leaf>()
                    .build(|args| Ok(Root(args.next()?, args.next()?))),
            )
            .unwrap();

        let scope = container.create_scope();
        group.bench_with_input(
            BenchmarkId::new("resolve_root", lifetime),
            &scope,
            |b, scope| b.iter(|| black_box(scope.resolve::<Root>().unwrap())),
        );
    }
    group.finish();
}

fn bench_contended_singleton(c: &mut Criterion) {
    struct Shared(u64);

    let mut container = Container::new();
    container.register_factory(|_| Shared(1)).as_singleton();
    let container = Arc::new(container);

    c.bench_function("singleton_hit_4_threads", |b| {
        b.iter(|| {
            std::thread::scope(|s| {
                for _ in 0..4 {
                    let container = &container;
                    s.spawn(move || {
                        for _ in 0..256 {
                            black_box(container.resolve::<Shared>().unwrap().0);
                        }
                    });
                }
            });
        })
    });
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_per_scope_vs_transient,
    bench_create_scope,
    bench_type_descriptor_depth,
    bench_contended_singleton
);
criterion_main!(benches);
