use catalog::{CatalogItem, CatalogStore, InMemoryCatalogStore};
use common::Money;
use criterion::{Criterion, criterion_group, criterion_main};
use inventory::{InventoryService, ReservationLedger, ReservationLine};

fn seeded_totals(n: usize) -> std::collections::HashMap<common::ItemId, u32> {
    (0..n)
        .map(|i| (common::ItemId::new(format!("SKU-{i:04}")), u32::MAX))
        .collect()
}

fn bench_ledger_hold_release(c: &mut Criterion) {
    let ledger = ReservationLedger::new();
    let totals = seeded_totals(1);
    let lines = vec![ReservationLine::new("SKU-0000", 1)];

    c.bench_function("inventory/ledger_hold_release", |b| {
        b.iter(|| {
            ledger.try_hold(&lines, &totals).unwrap();
            ledger.release(&lines);
        });
    });
}

fn bench_ledger_hold_release_20_lines(c: &mut Criterion) {
    let ledger = ReservationLedger::new();
    let totals = seeded_totals(20);
    let lines: Vec<ReservationLine> = (0..20)
        .map(|i| ReservationLine::new(format!("SKU-{i:04}"), 2))
        .collect();

    c.bench_function("inventory/ledger_hold_release_20_lines", |b| {
        b.iter(|| {
            ledger.try_hold(&lines, &totals).unwrap();
            ledger.release(&lines);
        });
    });
}

fn bench_reserve_release_through_service(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryCatalogStore::new();

    rt.block_on(async {
        for i in 0..5 {
            store
                .insert(CatalogItem::new(
                    format!("SKU-{i:04}"),
                    format!("Item {i}"),
                    Money::from_cents(1000),
                    u32::MAX,
                ))
                .await
                .unwrap();
        }
    });
    let service = InventoryService::new(store);
    let lines: Vec<ReservationLine> = (0..5)
        .map(|i| ReservationLine::new(format!("SKU-{i:04}"), 1))
        .collect();

    c.bench_function("inventory/service_reserve_release_5_lines", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.reserve(&lines).await.unwrap();
                service.release(&lines);
            });
        });
    });
}

criterion_group!(
    benches,
    bench_ledger_hold_release,
    bench_ledger_hold_release_20_lines,
    bench_reserve_release_through_service
);
criterion_main!(benches);
