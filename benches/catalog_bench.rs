use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use circulation_desk::{Catalog, ItemId, LibraryItem, User, UserId, parse_duration_days, parse_id};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

fn custom_criterion() -> Criterion {
    Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(1))
        .warm_up_time(Duration::from_secs(1))
}

fn stocked_catalog(items: u32) -> Catalog {
    let catalog = Catalog::new();
    for id in 0..items {
        catalog
            .add_item(LibraryItem::book(ItemId(id), "Bench Copy", "Anon", 100))
            .expect("Insert should succeed");
    }
    catalog
}

fn catalog_bench(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
    let late = NaiveDate::from_ymd_opt(2025, 1, 20).expect("valid date");
    let user = User::new(UserId(1), "Bench");

    let mut group = c.benchmark_group("Catalog Operations");

    group.bench_function("parse_id", |b| b.iter(|| parse_id(" 4242 ")));
    group.bench_function("parse_duration", |b| b.iter(|| parse_duration_days("2 weeks")));

    // Borrow then late return on a single item
    group.bench_function("borrow_return", |b| {
        b.iter_batched(
            || stocked_catalog(1),
            |catalog| {
                catalog.borrow_item(ItemId(0), &user, "14 days", today).expect("Borrow should succeed");
                catalog.return_item(ItemId(0), late).expect("Return should succeed");
            },
            BatchSize::SmallInput,
        );
    });

    // Two threads on disjoint items
    group.bench_function("concurrent_borrows_2_threads", |b| {
        b.iter_batched(
            || Arc::new(stocked_catalog(2)),
            |catalog| {
                let catalog2 = Arc::clone(&catalog);

                let handle1 = thread::spawn(move || {
                    let user = User::new(UserId(1), "Left");
                    catalog.borrow_item(ItemId(0), &user, "7", today).expect("Borrow should succeed");
                });

                let handle2 = thread::spawn(move || {
                    let user = User::new(UserId(2), "Right");
                    catalog2.borrow_item(ItemId(1), &user, "7", today).expect("Borrow should succeed");
                });

                handle1.join().expect("Thread 1 panicked");
                handle2.join().expect("Thread 2 panicked");
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = custom_criterion();
    targets = catalog_bench
}
criterion_main!(benches);
