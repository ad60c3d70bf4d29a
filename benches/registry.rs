//! Benchmarks for segcheck.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use segcheck::{GuardedBuffer, Origin, RegistryConfig, SegmentRegistry};

fn populated(count: usize) -> SegmentRegistry {
    segcheck::suppress_diagnostics(true);
    let reg = SegmentRegistry::new(
        RegistryConfig::default()
            .with_canaries(false)
            .with_initial_capacity(count),
    );
    for i in 0..count {
        unsafe { reg.register_range(0x10_0000 + i * 0x100, 0x80, Origin::unknown()) }
            .expect("disjoint ranges");
    }
    reg
}

fn bench_check_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_access");

    for count in [16usize, 1024, 65536] {
        let reg = populated(count);
        let mid = 0x10_0000 + (count / 2) * 0x100;

        group.bench_with_input(BenchmarkId::new("hit", count), &mid, |b, &addr| {
            b.iter(|| black_box(reg.check_access(black_box(addr + 8), 8).is_ok()))
        });

        group.bench_with_input(BenchmarkId::new("miss", count), &mid, |b, &addr| {
            b.iter(|| black_box(reg.check_access(black_box(addr + 0x90), 8).is_err()))
        });
    }

    group.finish();
}

fn bench_register_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("register_release");

    group.bench_function("bookkeeping_1024_live", |b| {
        let reg = populated(1024);
        let addr = 0x10_0000 + 512 * 0x100 + 0x80;
        b.iter(|| unsafe {
            reg.register_range(addr, 0x40, Origin::unknown()).unwrap();
            reg.release(addr, Origin::unknown()).unwrap();
            reg.clear_tombstones();
        })
    });

    group.bench_function("guarded_buffer_256b", |b| {
        let reg = SegmentRegistry::with_defaults();
        b.iter(|| {
            let buf = GuardedBuffer::new(&reg, 256, Origin::unknown()).unwrap();
            black_box(buf.as_ptr());
            buf.free().unwrap();
            reg.clear_tombstones();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_check_access, bench_register_release);
criterion_main!(benches);
