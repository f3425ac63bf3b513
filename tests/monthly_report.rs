mod common;

use common::{date, monthly_record};
use subtrack_core::core::aggregator::{aggregate_monthly_totals, subscriptions_due_in_window};
use subtrack_core::domain::{DueWindow, SubscriptionRecord};

#[test]
fn empty_input_yields_twelve_zero_months() {
    let totals = aggregate_monthly_totals(&[], 2025);
    assert_eq!(totals.months.len(), 12);
    assert!(totals.months.iter().all(|datum| datum.cost == 0.0));
    assert_eq!(totals.months[0].month, "January");
    assert_eq!(totals.months[11].month, "December");
    assert_eq!(totals.total, 0.0);
}

#[test]
fn single_record_active_all_year() {
    let records = vec![monthly_record(date(2024, 6, 1), 1, 100.0)];
    let totals = aggregate_monthly_totals(&records, 2025);
    assert!(totals.months.iter().all(|datum| datum.cost == 100.0));
    assert_eq!(totals.total, 1200.0);
}

#[test]
fn two_records_sum_per_month() {
    let records = vec![
        monthly_record(date(2024, 1, 1), 1, 50.0),
        monthly_record(date(2024, 1, 1), 15, 75.0),
    ];
    let totals = aggregate_monthly_totals(&records, 2025);
    assert!(totals.months.iter().all(|datum| datum.cost == 125.0));
    assert_eq!(totals.total, 1500.0);
}

#[test]
fn end_date_stops_billing() {
    let record = monthly_record(date(2025, 1, 1), 1, 10.0).with_end_date(date(2025, 6, 30));
    let totals = aggregate_monthly_totals(&[record], 2025);
    assert_eq!(totals.months[5].cost, 10.0);
    assert_eq!(totals.months[6].cost, 0.0);
    assert_eq!(totals.total, 60.0);
}

#[test]
fn malformed_records_are_skipped_and_reported() {
    let mut broken = monthly_record(date(2025, 1, 1), 1, 30.0);
    broken.due_day_of_month = None;
    let mut negative = monthly_record(date(2025, 1, 1), 1, 30.0);
    negative.monthly_bill = -5.0;
    let good = monthly_record(date(2025, 1, 1), 1, 20.0);

    let totals = aggregate_monthly_totals(&[broken.clone(), negative, good], 2025);
    assert_eq!(totals.total, 240.0);
    assert_eq!(totals.skipped.len(), 2);
    assert_eq!(totals.skipped[0].subscription_id, broken.id);
}

#[test]
fn due_window_lists_items_inside_bounds() {
    let mut inside = monthly_record(date(2024, 1, 1), 5, 12.0);
    inside.next_due_date = date(2025, 3, 31);
    let mut outside = monthly_record(date(2024, 1, 1), 5, 99.0);
    outside.next_due_date = date(2025, 4, 1);

    let window = DueWindow::month_containing(date(2025, 3, 10));
    let records: Vec<SubscriptionRecord> = vec![inside.clone(), outside];
    let report = subscriptions_due_in_window(&records, window);
    assert_eq!(report.subscriptions.len(), 1);
    assert_eq!(report.subscriptions[0].subscription_id, inside.id);
    assert_eq!(report.subscriptions[0].month, "March");
    assert_eq!(report.total_cost, 12.0);
}
