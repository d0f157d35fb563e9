use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use stayledger_booking::ReservationKind;
use stayledger_catalog::ResourceSpec;
use stayledger_core::{OwnerId, ResourceId};
use stayledger_infra::{InMemoryStore, InventoryLedger};

fn hotel_spec(name: &str, capacity: u32) -> ResourceSpec {
    ResourceSpec {
        name: name.to_string(),
        address: "Mall Road, Shimla".to_string(),
        price: 4000,
        rating: 4,
        amenities: "Mountain view, Fireplace".to_string(),
        dist_from_airport_km: 18,
        total_capacity: capacity,
    }
}

fn seeded_ledger(capacity: u32) -> (InventoryLedger<Arc<InMemoryStore>>, ResourceId) {
    let ledger = InventoryLedger::new(Arc::new(InMemoryStore::new()));
    ledger.seed_location("HIMACHAL PRADESH").unwrap();
    ledger
        .seed_resource("HIMACHAL PRADESH", &hotel_spec("Shimla Pine Resort", capacity))
        .unwrap();
    let id = ledger.find_resources("himachal").unwrap()[0].id;
    (ledger, id)
}

fn bench_reserve(c: &mut Criterion) {
    let mut group = c.benchmark_group("reserve");

    for capacity in [1_000u32, 100_000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let (ledger, hotel) = seeded_ledger(capacity);
                let owner = OwnerId::new();
                let mut day = 0u32;
                b.iter(|| {
                    // Walk dates so slots keep filling without hitting the cap.
                    day += 1;
                    let date =
                        NaiveDate::from_num_days_from_ce_opt(738_000 + (day % 10_000) as i32)
                            .unwrap();
                    black_box(ledger.reserve(hotel, date, 1, owner, ReservationKind::Plain))
                });
            },
        );
    }
    group.finish();
}

fn bench_availability_reads(c: &mut Criterion) {
    let (ledger, hotel) = seeded_ledger(100_000);
    let owner = OwnerId::new();
    let date = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();
    for _ in 0..500 {
        ledger
            .reserve(hotel, date, 1, owner, ReservationKind::Plain)
            .unwrap();
    }

    c.bench_function("remaining_capacity_500_reservations", |b| {
        b.iter(|| black_box(ledger.remaining_capacity(hotel, date).unwrap()))
    });

    c.bench_function("find_resources_substring", |b| {
        b.iter(|| black_box(ledger.find_resources("himachal").unwrap()))
    });
}

criterion_group!(benches, bench_reserve, bench_availability_reads);
criterion_main!(benches);
