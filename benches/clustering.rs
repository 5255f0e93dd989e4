use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fraudsift::{
    name_matrix, Agglomerative, Entity, HybridEngine, Normalizer, NormalizerConfig, SimpleEngine,
    TailHandling,
};
use rand::prelude::*;

fn synthetic_items(n: usize) -> Vec<Entity> {
    let mut rng = StdRng::seed_from_u64(42);
    let brands = ["dell", "hp", "lenovo", "asus", "acer"];
    let kinds = ["laptop", "monitor", "printer", "phone"];
    (0..n)
        .map(|_| {
            let kind = kinds[rng.random_range(0..kinds.len())];
            let brand = brands[rng.random_range(0..brands.len())];
            let model: u32 = rng.random_range(100..999);
            Entity::new(
                format!("{kind} {brand} model {model}"),
                1.0,
                rng.random_range(50.0..5000.0),
                0,
            )
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("clustering");

    let items = synthetic_items(60);
    let normalizer = Normalizer::new(&NormalizerConfig::default()).unwrap();

    group.bench_function("name_matrix_n60", |b| {
        b.iter(|| name_matrix(black_box(&items), &normalizer, TailHandling::Truncate))
    });

    group.bench_function("hybrid_n60", |b| {
        b.iter(|| {
            let simple =
                SimpleEngine::new(Normalizer::new(&NormalizerConfig::default()).unwrap());
            let hybrid = HybridEngine::new(simple).with_seed(42);
            hybrid
                .cluster(black_box(&items), &Agglomerative::new())
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
