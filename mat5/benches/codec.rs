use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mat5::{read_all, write_all, Array, ReadOptions, SparseArray, WriteOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn dense(n: usize) -> Array {
    let mut rng = StdRng::seed_from_u64(42);
    let values = (0..n * n).map(|_| rng.gen::<f64>()).collect();
    Array::double("dense", &[n, n], values).unwrap()
}

fn sparse(n: usize, nnz: usize) -> Array {
    let mut rng = StdRng::seed_from_u64(7);
    let mut s = SparseArray::new("sparse", n, n);
    for _ in 0..nnz {
        s.set(rng.gen_range(0..n), rng.gen_range(0..n), rng.gen())
            .unwrap();
    }
    Array::from(s)
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for n in [64, 256] {
        let array = dense(n);
        group.throughput(Throughput::Bytes((n * n * 8) as u64));
        for compress in [false, true] {
            let options = WriteOptions::default().with_compression(compress);
            let label = if compress { "compressed" } else { "raw" };
            group.bench_with_input(BenchmarkId::new(label, n), &array, |b, array| {
                b.iter(|| write_all([array], &options).unwrap())
            });
        }
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let arrays = [dense(256), sparse(10_000, 50_000)];
    for compress in [false, true] {
        let options = WriteOptions::default().with_compression(compress);
        let bytes = write_all(&arrays, &options).unwrap();
        let label = if compress { "compressed" } else { "raw" };
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_function(label, |b| {
            b.iter(|| read_all(black_box(&bytes), &ReadOptions::default()).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
