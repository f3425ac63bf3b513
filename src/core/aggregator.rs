//! Monthly spend reports built from subscription records.
//!
//! Both reports take an already status-filtered slice; which statuses are
//! projected is the caller's decision (see [`ReportPolicy`]).
//!
//! [`ReportPolicy`]: crate::domain::ReportPolicy

use chrono::{Datelike, Month};

use crate::core::due_date::{active_months, validate_day_of_month};
use crate::core::errors::ScheduleError;
use crate::domain::common::Billable;
use crate::domain::report::{
    month_from_number, DueLineItem, DueWindow, DueWindowReport, MonthOfYear, MonthlyDatum,
    MonthlyTotals, SkippedRecord,
};
use crate::domain::subscription::SubscriptionRecord;

const MONTHS_PER_YEAR: usize = 12;

/// Validates the schedule fields of a record and returns the day used for the
/// start-month rule.
///
/// Daily and weekly subscriptions bill on their start date, so their start
/// month always counts.
pub fn effective_due_day(record: &SubscriptionRecord) -> Result<u32, ScheduleError> {
    if !record.monthly_bill.is_finite() || record.monthly_bill < 0.0 {
        return Err(ScheduleError::malformed(format!(
            "monthly_bill {} must be a non-negative amount",
            record.monthly_bill
        ))
        .for_record(record.id));
    }
    let day = validate_day_of_month(record.due_type, record.due_day_of_month)
        .map_err(|err| err.for_record(record.id))?;
    Ok(day.unwrap_or_else(|| record.start_date.day()))
}

/// Sums each record's bill into every month of `target_year` it is active in.
///
/// Always yields twelve entries, January first.
pub fn aggregate_monthly_totals(records: &[SubscriptionRecord], target_year: i32) -> MonthlyTotals {
    let mut costs = [0.0_f64; MONTHS_PER_YEAR];
    let mut skipped = Vec::new();

    for record in records {
        let due_day = match effective_due_day(record) {
            Ok(day) => day,
            Err(err) => {
                skipped.push(skip(record, &err));
                continue;
            }
        };
        for active in active_months(record.start_date, due_day, target_year).until(record.end_date)
        {
            costs[active.number() as usize - 1] += record.cost();
        }
    }

    let months: Vec<MonthlyDatum> = costs
        .iter()
        .enumerate()
        .map(|(index, cost)| MonthlyDatum {
            cost: *cost,
            ..MonthlyDatum::zero(MonthOfYear::new(
                month_from_number(index as u32 + 1),
                target_year,
            ))
        })
        .collect();
    let total = costs.iter().sum();

    tracing::debug!(
        year = target_year,
        records = records.len(),
        skipped = skipped.len(),
        total,
        "aggregated monthly totals"
    );

    MonthlyTotals {
        year: target_year,
        months,
        total,
        skipped,
    }
}

/// Projects every record whose next due date falls inside `window`.
///
/// One line item per record; nothing is summed across months.
pub fn subscriptions_due_in_window(
    records: &[SubscriptionRecord],
    window: DueWindow,
) -> DueWindowReport {
    let mut subscriptions = Vec::new();
    let mut skipped = Vec::new();

    for record in records {
        if let Err(err) = effective_due_day(record) {
            skipped.push(skip(record, &err));
            continue;
        }
        if !window.contains(record.next_due_date) {
            continue;
        }
        let label = MonthOfYear::of(record.next_due_date);
        subscriptions.push(DueLineItem {
            subscription_id: record.id,
            channel_id: record.channel_id,
            month: label.name().to_string(),
            year: label.year,
            cost: record.cost(),
            status: record.status,
            next_due_date: record.next_due_date,
        });
    }

    let total_cost = subscriptions.iter().map(|item| item.cost).sum();
    DueWindowReport {
        window,
        subscriptions,
        total_cost,
        skipped,
    }
}

/// Calendar order used by the twelve-month breakdown.
pub fn calendar_months() -> impl Iterator<Item = Month> {
    (1..=MONTHS_PER_YEAR as u32).map(month_from_number)
}

fn skip(record: &SubscriptionRecord, err: &ScheduleError) -> SkippedRecord {
    tracing::warn!(subscription = %record.id, error = %err, "skipping malformed subscription record");
    SkippedRecord {
        subscription_id: record.id,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{account::AccountId, subscription::DueType};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(start: NaiveDate, day: Option<u32>, bill: f64) -> SubscriptionRecord {
        SubscriptionRecord::new(
            AccountId(1),
            Uuid::new_v4(),
            start,
            DueType::Monthly,
            day,
            start,
            bill,
        )
    }

    #[test]
    fn breakdown_names_months_in_order() {
        let totals = aggregate_monthly_totals(&[], 2025);
        let names: Vec<&str> = totals.months.iter().map(|m| m.month.as_str()).collect();
        let expected: Vec<&str> = calendar_months().map(|m| m.name()).collect();
        assert_eq!(names, expected);
        assert!(totals.months.iter().all(|m| m.year == 2025));
    }

    #[test]
    fn malformed_record_is_skipped_not_fatal() {
        let good = monthly(date(2025, 1, 1), Some(1), 10.0);
        let bad = monthly(date(2025, 1, 1), None, 99.0);
        let bad_id = bad.id;
        let totals = aggregate_monthly_totals(&[good, bad], 2025);
        assert_eq!(totals.months.len(), 12);
        assert_eq!(totals.total, 120.0);
        assert_eq!(totals.skipped.len(), 1);
        assert_eq!(totals.skipped[0].subscription_id, bad_id);
    }

    #[test]
    fn negative_bill_is_malformed() {
        let record = monthly(date(2025, 1, 1), Some(1), -5.0);
        assert!(matches!(
            effective_due_day(&record),
            Err(ScheduleError::RecordMalformed { .. })
        ));
    }

    #[test]
    fn weekly_records_count_their_start_month() {
        let mut record = monthly(date(2025, 11, 20), None, 4.0);
        record.due_type = DueType::Weekly;
        let totals = aggregate_monthly_totals(&[record], 2025);
        assert_eq!(totals.months[10].cost, 4.0);
        assert_eq!(totals.months[11].cost, 4.0);
        assert_eq!(totals.total, 8.0);
    }

    #[test]
    fn window_line_items_carry_due_month_label() {
        let mut record = monthly(date(2024, 1, 3), Some(3), 12.5);
        record.next_due_date = date(2025, 7, 3);
        let window = DueWindow::new(date(2025, 7, 1), date(2025, 7, 31)).unwrap();
        let report = subscriptions_due_in_window(&[record.clone()], window);
        assert_eq!(report.subscriptions.len(), 1);
        let item = &report.subscriptions[0];
        assert_eq!(item.month, "July");
        assert_eq!(item.year, 2025);
        assert_eq!(item.channel_id, record.channel_id);
        assert_eq!(report.total_cost, 12.5);
    }
}
