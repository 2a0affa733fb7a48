use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ooze::intarray::{BitCompactIntArray, IntArray, WordedIntArray};

fn fill_compact(bits: u64) -> BitCompactIntArray {
    let mut a = BitCompactIntArray::new(4096, bits);
    for i in 0..4096 {
        a.set(i, i as u64 % (bits + 1)).unwrap();
    }
    a
}

fn fill_worded(bits: u64) -> WordedIntArray {
    let mut a = WordedIntArray::new(4096, bits);
    for i in 0..4096 {
        a.set(i, i as u64 % (bits + 1)).unwrap();
    }
    a
}

fn bench_compact_get(c: &mut Criterion) {
    let array = fill_compact(255);
    c.bench_function("compact_get_4096_cells", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for i in 0..array.size() {
                sum = sum.wrapping_add(array.get(i).unwrap());
            }
            black_box(sum)
        })
    });
}

fn bench_worded_get(c: &mut Criterion) {
    let array = fill_worded(255);
    c.bench_function("worded_get_4096_cells", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for i in 0..array.size() {
                sum = sum.wrapping_add(array.get(i).unwrap());
            }
            black_box(sum)
        })
    });
}

fn bench_compact_resize(c: &mut Criterion) {
    c.bench_function("compact_resize_up_4096_cells", |b| {
        b.iter_batched(
            || fill_compact(15),
            |mut array| array.set_max_value(black_box(1023)).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_compact_get, bench_worded_get, bench_compact_resize);
criterion_main!(benches);
