use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use depot_core::{Decimal, OrderNumber};
use depot_infra::EngineSettings;
use depot_infra::engine::{LinePatch, OrderFeed, OrderFeedLine, StockEntry, WarehouseEngine};
use depot_infra::event_store::{EventStore, InMemoryEventStore};
use depot_stock::WarehouseCode;
use std::sync::Arc;

const PRODUCTS: u32 = 20;

fn settings() -> EngineSettings {
    EngineSettings {
        default_warehouse: WarehouseCode::new("MAIN").unwrap(),
    }
}

fn order_feed(lines: u32) -> OrderFeed {
    OrderFeed {
        customer_code: "C-1".into(),
        customer_name: "Acme".into(),
        order_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        note: None,
        lines: (1..=lines)
            .map(|row| OrderFeedLine {
                row,
                product_code: format!("P{}", row % PRODUCTS),
                product_name: format!("Product {row}"),
                unit: "PCS".into(),
                secondary_unit: None,
                requested_qty: Decimal::from(5),
                unit_price: Decimal::ONE,
                line_total: Decimal::from(5),
                warehouse_code: None,
                shelf_code: None,
            })
            .collect(),
    }
}

/// `orders` orders, all picking, every line contending on a shared pool of products.
fn contended_engine(orders: u64, store: Arc<dyn EventStore>) -> (WarehouseEngine, Vec<OrderNumber>) {
    let engine = WarehouseEngine::with_event_store(settings(), store).unwrap();
    engine
        .update_stock(
            (0..PRODUCTS)
                .map(|p| StockEntry {
                    product_code: format!("P{p}"),
                    warehouse_code: "MAIN".into(),
                    quantity: Decimal::from(50),
                })
                .collect(),
        )
        .unwrap();

    let numbers: Vec<OrderNumber> = (1..=orders).map(|n| OrderNumber::new("A", n).unwrap()).collect();
    for number in &numbers {
        engine.sync_order(number, order_feed(10)).unwrap();
        engine.start_picking(number, "bench").unwrap();
    }
    (engine, numbers)
}

fn bench_order_detail(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_detail");
    for orders in [10u64, 100, 500] {
        let (engine, numbers) = contended_engine(orders, Arc::new(InMemoryEventStore::new()));
        let last = numbers.last().unwrap().clone();
        group.bench_with_input(BenchmarkId::from_parameter(orders), &last, |b, number| {
            b.iter(|| black_box(engine.order_detail(number).unwrap()));
        });
    }
    group.finish();
}

fn bench_update_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_line");
    let (engine, numbers) = contended_engine(50, Arc::new(InMemoryEventStore::new()));
    let number = numbers[0].clone();
    let mut picked = 0i64;
    group.bench_function("picked_qty", |b| {
        b.iter(|| {
            picked = (picked + 1) % 5;
            let patch = LinePatch {
                picked_qty: Some(Decimal::from(picked)),
                ..LinePatch::default()
            };
            black_box(engine.update_line(&number, 1, patch).unwrap())
        });
    });
    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_rebuild");
    group.sample_size(20);
    for orders in [100u64, 1000] {
        let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
        contended_engine(orders, store.clone());
        group.bench_with_input(BenchmarkId::from_parameter(orders), &store, |b, store| {
            b.iter(|| black_box(WarehouseEngine::with_event_store(settings(), store.clone()).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_order_detail, bench_update_line, bench_rebuild);
criterion_main!(benches);
