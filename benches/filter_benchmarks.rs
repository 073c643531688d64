//! Benchmarks for angle filter performance

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pose_rep_counter::filters::{
    exponential::ExponentialFilter, median::MedianFilter, moving_average::MovingAverageFilter, AngleFilter,
    NoFilter, SmoothingBank,
};
use pose_rep_counter::geometry::AngleKind;

fn benchmark_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");

    // Noisy elbow angle swinging between 90° and 170°
    let test_data: Vec<f64> = (0..100)
        .map(|i| {
            let t = i as f64 * 0.1;
            130.0 + 40.0 * t.sin() + 3.0 * (rand::random::<f64>() - 0.5)
        })
        .collect();

    let filter_configs = vec![
        ("no_filter", Box::new(NoFilter::default()) as Box<dyn AngleFilter>),
        ("moving_average_5", Box::new(MovingAverageFilter::new(5))),
        ("moving_average_10", Box::new(MovingAverageFilter::new(10))),
        ("median_5", Box::new(MedianFilter::new(5))),
        ("median_9", Box::new(MedianFilter::new(9))),
        ("exponential_0.5", Box::new(ExponentialFilter::new(0.5))),
    ];

    for (name, mut filter) in filter_configs {
        group.bench_with_input(BenchmarkId::new("single_update", name), &test_data[0], |b, &angle| {
            b.iter(|| black_box(filter.apply(black_box(angle))));
        });

        group.bench_with_input(BenchmarkId::new("sequence_100", name), &test_data, |b, data| {
            b.iter(|| {
                filter.reset();
                for &angle in data {
                    black_box(filter.apply(black_box(angle)));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_smoothing_bank(c: &mut Criterion) {
    c.bench_function("smoothing_bank_frame", |b| {
        let mut bank = SmoothingBank::default();
        let mut angle = 90.0;
        b.iter(|| {
            angle = if angle > 170.0 { 90.0 } else { angle + 1.0 };
            for kind in AngleKind::ALL {
                black_box(bank.push(kind, black_box(angle)));
            }
        });
    });
}

criterion_group!(benches, benchmark_filters, benchmark_smoothing_bank);
criterion_main!(benches);
