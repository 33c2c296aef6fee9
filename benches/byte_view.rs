//! Benchmarks for byte view slicing and event dispatch

use cartridge_common::{ByteView, Code, ErrorEvent, Level, Notifier};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

fn random_page(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

fn benchmark_subdata_vs_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("slice_page");

    for size in [4096usize, 65536, 1 << 20].iter() {
        let page = ByteView::owned_copy(&random_page(*size)).unwrap();

        group.bench_with_input(BenchmarkId::new("subdata", size), size, |b, &size| {
            b.iter(|| black_box(page.subdata_at(black_box(size / 4), size / 2)));
        });

        group.bench_with_input(BenchmarkId::new("copy", size), size, |b, &size| {
            b.iter(|| {
                black_box(
                    ByteView::owned_copy(&page.as_slice()[size / 4..size / 4 + size / 2]).unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn benchmark_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize");

    group.bench_function("shrink_in_place", |b| {
        let page = ByteView::owned_copy(&random_page(4096)).unwrap();
        b.iter(|| {
            let mut view = page.clone();
            view.resize(black_box(1024)).unwrap();
            black_box(view)
        });
    });

    group.bench_function("grow_detached", |b| {
        let page = ByteView::owned_copy(&random_page(4096)).unwrap();
        b.iter(|| {
            let mut view = page.clone();
            view.resize(black_box(8192)).unwrap();
            black_box(view)
        });
    });

    group.finish();
}

fn benchmark_notify(c: &mut Criterion) {
    let mut group = c.benchmark_group("notify");

    for observers in [1, 8, 64].iter() {
        let notifier = Notifier::new();
        for i in 0..*observers {
            notifier.set_notification(i, format!("bench.{}", i), |event: &ErrorEvent| {
                black_box(event.code());
            });
        }
        let event = ErrorEvent::new(Level::Warning, Code::Busy, "contended")
            .with_attribute("Retries", 3);

        group.bench_with_input(
            BenchmarkId::from_parameter(observers),
            observers,
            |b, _| b.iter(|| notifier.notify(black_box(&event))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_subdata_vs_copy,
    benchmark_resize,
    benchmark_notify
);
criterion_main!(benches);
