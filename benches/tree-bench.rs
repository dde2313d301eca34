use burl::Tree;
use criterion::{criterion_group, criterion_main, Criterion};

fn set_and_get(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut tree = Tree::open(dir.path().join("bench")).unwrap();

    let mut counter = 0_u64;
    c.bench_function("set", |b| {
        b.iter(|| {
            counter += 1;
            tree.set(&counter.to_be_bytes(), b"a benchmark value payload")
                .unwrap();
        });
    });

    c.bench_function("get", |b| {
        b.iter(|| {
            tree.get(&1_u64.to_be_bytes()).unwrap();
        });
    });
}

criterion_group!(benches, set_and_get);
criterion_main!(benches);
