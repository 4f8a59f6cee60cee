use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nodeclust::cluster::{
    Agglomerative, AgglomerativeParams, AffinityParams, AffinityPropagation, FuzzyCMeans,
    FuzzyParams, Kmeans, KmeansParams, Kmedoids, KmedoidsParams, Linkage, Similarities,
};
use nodeclust::Points;
use rand::prelude::*;

fn random_points(n: usize, d: usize) -> Points {
    let mut rng = StdRng::seed_from_u64(42);
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|_| (0..d).map(|_| rng.random::<f64>()).collect())
        .collect();
    Points::from_rows(&rows).unwrap()
}

fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");
    let points = random_points(1000, 16);

    group.bench_function("fit_n1000_d16_k10", |b| {
        let engine = Kmeans::new(KmeansParams {
            seed: Some(42),
            ..KmeansParams::new(10)
        })
        .unwrap();
        b.iter(|| engine.fit(black_box(&points)).unwrap())
    });

    group.bench_function("kmedoids_fit_n300_d8_k5", |b| {
        let points = random_points(300, 8);
        let engine = Kmedoids::new(KmedoidsParams {
            seed: Some(42),
            ..KmedoidsParams::new(5)
        })
        .unwrap();
        b.iter(|| engine.fit(black_box(&points)).unwrap())
    });

    group.bench_function("fuzzy_fit_n1000_d16_k10", |b| {
        let engine = FuzzyCMeans::new(FuzzyParams {
            seed: Some(42),
            ..FuzzyParams::new(10)
        })
        .unwrap();
        b.iter(|| engine.fit(black_box(&points)).unwrap())
    });

    group.finish();
}

fn bench_affinity(c: &mut Criterion) {
    let mut group = c.benchmark_group("affinity");
    let similarities = Similarities::negative_squared_euclidean(&random_points(200, 4));
    let engine = AffinityPropagation::new(AffinityParams {
        max_iterations: 200,
        conv_iterations: 15,
        ..AffinityParams::default()
    })
    .unwrap();

    group.bench_function("fit_n200_d4", |b| {
        b.iter(|| engine.fit(black_box(&similarities)).unwrap())
    });
    group.finish();
}

fn bench_agglomerative(c: &mut Criterion) {
    let mut group = c.benchmark_group("agglomerative");
    let points = random_points(500, 4);

    for linkage in [Linkage::Single, Linkage::Complete, Linkage::Average] {
        let engine = Agglomerative::new(AgglomerativeParams {
            linkage,
            threshold: 0.5,
            ..AgglomerativeParams::default()
        })
        .unwrap();
        group.bench_function(format!("fit_n500_d4_{linkage}"), |b| {
            b.iter(|| engine.fit(black_box(&points)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_kmeans, bench_affinity, bench_agglomerative);
criterion_main!(benches);
