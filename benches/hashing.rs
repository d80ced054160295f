use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use porstore::crypto::sha256::{sha256, StreamHasher};
use porstore::crypto::tagged::TaggedHasher;
use porstore::proofs::merkle::merkle_root;

const LEAF_TAG: &[u8] = b"ProofOfReserve_Leaf";
const BRANCH_TAG: &[u8] = b"ProofOfReserve_Branch";

fn sha256_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sha256");

    // Test different data sizes
    let sizes = vec![64, 1024, 8192, 65536, 1048576]; // 64B to 1MB

    for size in sizes {
        group.throughput(Throughput::Bytes(size as u64));

        let data = generate_test_data(size);

        group.bench_with_input(BenchmarkId::new("one_shot", size), &data, |b, data| {
            b.iter(|| sha256(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("streaming", size), &data, |b, data| {
            b.iter(|| {
                let mut hasher = StreamHasher::new();
                for chunk in data.chunks(997) {
                    hasher.append(black_box(chunk));
                }
                hasher.hash()
            })
        });
    }

    group.finish();
}

fn tagged_hash_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tagged_hash");

    let sizes = vec![8, 64, 1024];

    for size in sizes {
        group.throughput(Throughput::Bytes(size as u64));

        let data = generate_test_data(size);
        let mut hasher = TaggedHasher::new(LEAF_TAG);

        // reset() reuses the cached primed state, so this measures the
        // per-message cost without tag derivation
        group.bench_with_input(BenchmarkId::new("primed", size), &data, |b, data| {
            b.iter(|| {
                hasher.reset();
                hasher.append(black_box(data));
                hasher.hash()
            })
        });
    }

    group.finish();
}

fn merkle_root_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("merkle_root");

    // Test different leaf counts
    let leaf_counts = vec![1, 10, 100, 1000, 10000];

    for count in leaf_counts {
        group.throughput(Throughput::Elements(count as u64));

        let leaves: Vec<String> = (0..count).map(|i| format!("({i},{})", i * 100)).collect();

        group.bench_with_input(BenchmarkId::new("build", count), &leaves, |b, leaves| {
            b.iter(|| merkle_root(LEAF_TAG, BRANCH_TAG, black_box(leaves)))
        });
    }

    group.finish();
}

fn generate_test_data(size: usize) -> Vec<u8> {
    // Generate pseudo-random but deterministic data
    let mut data = Vec::with_capacity(size);
    let mut state = 12345u64;

    for _ in 0..size {
        // Simple LCG for deterministic "random" data
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 8) as u8);
    }

    data
}

criterion_group!(
    benches,
    sha256_benchmark,
    tagged_hash_benchmark,
    merkle_root_benchmark
);
criterion_main!(benches);
