use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use profile_retrieval::{
    hnsw::{HnswConfig, HnswIndex},
    search::exact_search,
    similarity::DistanceMetric,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DIM: usize = 29;

fn random_vectors(n: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..DIM).map(|_| rng.gen::<f32>()).collect())
        .collect()
}

fn build_index(vectors: &[Vec<f32>], config: HnswConfig) -> HnswIndex {
    let mut index = HnswIndex::new(DIM, config).expect("valid config");
    for v in vectors {
        index.insert(v).expect("matching dimension");
    }
    index
}

fn bench_hnsw_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_build");
    group.sample_size(10);

    for n in [1_000usize, 5_000] {
        let vectors = random_vectors(n, 1);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("insert", n), &n, |b, _| {
            b.iter(|| black_box(build_index(black_box(&vectors), HnswConfig::default())))
        });
    }

    group.finish();
}

fn bench_hnsw_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_search");

    for n in [1_000usize, 10_000] {
        let vectors = random_vectors(n, 2);
        let index = build_index(&vectors, HnswConfig::default());
        let query = random_vectors(1, 3).remove(0);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("top_10", n), &n, |b, _| {
            b.iter(|| black_box(index.search(black_box(&query), 10)))
        });
        group.bench_with_input(BenchmarkId::new("exact_top_10", n), &n, |b, _| {
            b.iter(|| {
                black_box(exact_search(
                    black_box(&query),
                    &vectors,
                    DistanceMetric::SquaredEuclidean,
                    10,
                ))
            })
        });
    }

    group.finish();
}

fn bench_ef_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("ef_search");
    let vectors = random_vectors(5_000, 4);
    let mut index = build_index(&vectors, HnswConfig::default());
    let query = random_vectors(1, 5).remove(0);

    for ef in [16usize, 64, 256] {
        index.set_ef_search(ef);
        group.bench_with_input(BenchmarkId::new("ef", ef), &ef, |b, _| {
            b.iter(|| black_box(index.search(black_box(&query), 10)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hnsw_build, bench_hnsw_search, bench_ef_search);
criterion_main!(benches);
