use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gemt::{Pass, Prefetch, SquareMatrix, Strategy};

/// Size exponents: 64×64 fits in L1, 512×512 in L2/L3, 2048×2048 spills to RAM.
const SIZE_EXPONENTS: &[u32] = &[6, 9, 11];

fn bench_transpose(c: &mut Criterion) {
    let mut group = c.benchmark_group("transpose");

    for &exponent in SIZE_EXPONENTS {
        let side = 1usize << exponent;
        let mut source = SquareMatrix::filled(side).unwrap();
        let mut destination = SquareMatrix::allocate(side).unwrap();

        for strategy in Strategy::ALL {
            for prefetch in [Prefetch::Enabled, Prefetch::Disabled] {
                let id = BenchmarkId::new(format!("{}/prefetch-{}", strategy, prefetch), side);
                group.bench_with_input(id, &side, |b, _| {
                    b.iter(|| {
                        // In-place passes alternate between M and M^T, which
                        // costs the same either way.
                        let pass = match strategy {
                            Strategy::InPlace => Pass::InPlace(&mut source),
                            Strategy::OutOfPlace => Pass::OutOfPlace {
                                source: &source,
                                destination: &mut destination,
                            },
                        };
                        gemt::run(pass, prefetch).unwrap();
                        black_box(source.as_slice()[1])
                    });
                });
            }
        }
    }

    group.finish();
}

criterion_group!(benches, bench_transpose);

criterion_main!(benches);
