use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use subtrack_core::core::aggregator::{aggregate_monthly_totals, subscriptions_due_in_window};
use subtrack_core::core::due_date::compute_next_due_date;
use subtrack_core::domain::{AccountId, DueType, DueWindow, SubscriptionRecord};
use uuid::Uuid;

fn build_records(count: usize) -> Vec<SubscriptionRecord> {
    let origin = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..count)
        .map(|idx| {
            let start = origin + Duration::days((idx % 900) as i64);
            let due_type = match idx % 4 {
                0 => DueType::Daily,
                1 => DueType::Weekly,
                2 => DueType::Monthly,
                _ => DueType::Yearly,
            };
            let due_day = due_type
                .requires_day_of_month()
                .then_some((idx % 31) as u32 + 1);
            SubscriptionRecord::new(
                AccountId((idx % 50) as u64),
                Uuid::new_v4(),
                start,
                due_type,
                due_day,
                start + Duration::days(30),
                5.0 + (idx % 40) as f64,
            )
        })
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let records = build_records(10_000);
    c.bench_function("aggregate_monthly_totals_10k", |b| {
        b.iter(|| aggregate_monthly_totals(black_box(&records), 2024))
    });

    let window = DueWindow::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
    )
    .unwrap();
    c.bench_function("subscriptions_due_in_window_10k", |b| {
        b.iter(|| subscriptions_due_in_window(black_box(&records), window))
    });
}

fn bench_next_due(c: &mut Criterion) {
    let now = NaiveDate::from_ymd_opt(2025, 2, 15).unwrap();
    let anchor = NaiveDate::from_ymd_opt(2020, 1, 3).unwrap();
    c.bench_function("compute_next_due_date_mixed", |b| {
        b.iter(|| {
            for day in 1..=31 {
                black_box(compute_next_due_date(DueType::Monthly, Some(day), None, now).ok());
                black_box(compute_next_due_date(DueType::Yearly, Some(day), Some(anchor), now).ok());
            }
            black_box(compute_next_due_date(DueType::Weekly, None, Some(anchor), now).ok());
        })
    });
}

criterion_group!(benches, bench_aggregation, bench_next_due);
criterion_main!(benches);
