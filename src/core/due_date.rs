//! Recurring-billing date arithmetic.
//!
//! Everything here is pure calendar math over UTC dates: no clock reads, no
//! I/O. Callers pass the evaluation date explicitly.

use chrono::{Datelike, Duration, NaiveDate};

use crate::core::errors::ScheduleError;
use crate::domain::report::{month_from_number, MonthOfYear};
use crate::domain::subscription::{DueType, SubscriptionRecord};

pub const MIN_DAY_OF_MONTH: u32 = 1;
pub const MAX_DAY_OF_MONTH: u32 = 31;
const DAYS_PER_WEEK: i64 = 7;

/// Number of days in the given month, accounting for leap years.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    last_day_of_month(year, month)
        .map(|date| date.day())
        .unwrap_or(28)
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).map(|first| first - Duration::days(1))
}

/// Builds `day` of the given month, falling back to the month's last day when
/// the month is shorter than `day`.
pub fn clamp_to_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let day = day.clamp(MIN_DAY_OF_MONTH, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Checks the due day required by monthly and yearly cadences.
///
/// Daily and weekly cadences ignore the day entirely and yield `None`.
pub fn validate_day_of_month(
    due_type: DueType,
    due_day_of_month: Option<u32>,
) -> Result<Option<u32>, ScheduleError> {
    if !due_type.requires_day_of_month() {
        return Ok(None);
    }
    match due_day_of_month {
        None => Err(ScheduleError::malformed(format!(
            "due_day_of_month is required for {due_type} subscriptions"
        ))),
        Some(day) if !(MIN_DAY_OF_MONTH..=MAX_DAY_OF_MONTH).contains(&day) => {
            Err(ScheduleError::InvalidDayOfMonth(i64::from(day)))
        }
        Some(day) => Ok(Some(day)),
    }
}

/// Computes the first due date strictly after `now`.
///
/// `reference` is the most recent known due date. Weekly schedules step from
/// it in seven-day increments; yearly schedules take their month from it.
/// Without a reference both fall back to `now`.
pub fn compute_next_due_date(
    due_type: DueType,
    due_day_of_month: Option<u32>,
    reference: Option<NaiveDate>,
    now: NaiveDate,
) -> Result<NaiveDate, ScheduleError> {
    let due_day = validate_day_of_month(due_type, due_day_of_month)?;
    let next = match (due_type, due_day) {
        (DueType::Daily, _) => now.succ_opt(),
        (DueType::Weekly, _) => Some(next_weekly(reference.unwrap_or(now), now)),
        (DueType::Monthly, Some(day)) => next_monthly(day, now),
        (DueType::Yearly, Some(day)) => {
            let month = reference.map(|date| date.month()).unwrap_or(now.month());
            next_yearly(month, day, now)
        }
        (_, None) => None,
    };
    let next = next.ok_or_else(|| ScheduleError::malformed("due date is out of calendar range"))?;
    tracing::debug!(%due_type, ?due_day, %now, %next, "computed next due date");
    Ok(next)
}

/// Recomputes a record's next due date, anchored on its current one.
pub fn advance_after(record: &SubscriptionRecord, now: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    compute_next_due_date(
        record.due_type,
        record.due_day_of_month,
        Some(record.next_due_date),
        now,
    )
    .map_err(|err| err.for_record(record.id))
}

fn next_weekly(anchor: NaiveDate, now: NaiveDate) -> NaiveDate {
    if anchor > now {
        return anchor;
    }
    let elapsed = (now - anchor).num_days();
    let steps = elapsed / DAYS_PER_WEEK + 1;
    anchor + Duration::days(steps * DAYS_PER_WEEK)
}

fn next_monthly(day: u32, now: NaiveDate) -> Option<NaiveDate> {
    let candidate = clamp_to_month(now.year(), now.month(), day)?;
    if candidate > now {
        return Some(candidate);
    }
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    clamp_to_month(year, month, day)
}

fn next_yearly(month: u32, day: u32, now: NaiveDate) -> Option<NaiveDate> {
    let candidate = clamp_to_month(now.year(), month, day)?;
    if candidate > now {
        return Some(candidate);
    }
    clamp_to_month(now.year() + 1, month, day)
}

/// Months of `target_year` in which a subscription started on `start_date`
/// is billed.
pub fn active_months(start_date: NaiveDate, due_day_of_month: u32, target_year: i32) -> ActiveMonths {
    ActiveMonths {
        start_date,
        due_day_of_month,
        target_year,
        end_date: None,
        cursor: 1,
    }
}

/// Lazy January-to-December walk over the active months of one year.
///
/// Cloning the iterator (or calling [`ActiveMonths::restart`]) replays the
/// same sequence; no state is shared between copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveMonths {
    start_date: NaiveDate,
    due_day_of_month: u32,
    target_year: i32,
    end_date: Option<NaiveDate>,
    cursor: u32,
}

impl ActiveMonths {
    /// Stops the sequence after the month containing `end_date`.
    pub fn until(mut self, end_date: Option<NaiveDate>) -> Self {
        self.end_date = end_date;
        self
    }

    pub fn restart(&self) -> Self {
        Self {
            cursor: 1,
            ..self.clone()
        }
    }

    pub fn target_year(&self) -> i32 {
        self.target_year
    }

    fn is_active(&self, month: u32) -> bool {
        let current = (self.target_year, month);
        let started = (self.start_date.year(), self.start_date.month());
        if current < started {
            return false;
        }
        if let Some(end) = self.end_date {
            if current > (end.year(), end.month()) {
                return false;
            }
        }
        if current == started {
            return self.start_date.day() <= self.due_day_of_month;
        }
        true
    }
}

impl Iterator for ActiveMonths {
    type Item = MonthOfYear;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start_date.year() > self.target_year {
            self.cursor = 13;
            return None;
        }
        while self.cursor <= 12 {
            let month = self.cursor;
            self.cursor += 1;
            if self.is_active(month) {
                return Some(MonthOfYear::new(month_from_number(month), self.target_year));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(13usize.saturating_sub(self.cursor as usize)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Month;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_lengths_follow_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn clamping_stays_in_requested_month() {
        assert_eq!(clamp_to_month(2025, 4, 31), Some(date(2025, 4, 30)));
        assert_eq!(clamp_to_month(2025, 2, 30), Some(date(2025, 2, 28)));
        assert_eq!(clamp_to_month(2025, 5, 31), Some(date(2025, 5, 31)));
    }

    #[test]
    fn monthly_due_later_this_month() {
        let next = compute_next_due_date(DueType::Monthly, Some(20), None, date(2025, 3, 10));
        assert_eq!(next, Ok(date(2025, 3, 20)));
    }

    #[test]
    fn monthly_due_today_rolls_forward() {
        let next = compute_next_due_date(DueType::Monthly, Some(10), None, date(2025, 3, 10));
        assert_eq!(next, Ok(date(2025, 4, 10)));
    }

    #[test]
    fn monthly_rollover_reclamps_nominal_day() {
        // Feb 28 is the clamped due date and has elapsed; March has a 31st.
        let next = compute_next_due_date(DueType::Monthly, Some(31), None, date(2025, 2, 28));
        assert_eq!(next, Ok(date(2025, 3, 31)));
        let next = compute_next_due_date(DueType::Monthly, Some(31), None, date(2025, 3, 31));
        assert_eq!(next, Ok(date(2025, 4, 30)));
    }

    #[test]
    fn monthly_december_rolls_into_next_year() {
        let next = compute_next_due_date(DueType::Monthly, Some(5), None, date(2025, 12, 20));
        assert_eq!(next, Ok(date(2026, 1, 5)));
    }

    #[test]
    fn yearly_leap_day_falls_back() {
        let next = compute_next_due_date(
            DueType::Yearly,
            Some(29),
            Some(date(2024, 2, 29)),
            date(2024, 2, 29),
        );
        assert_eq!(next, Ok(date(2025, 2, 28)));
    }

    #[test]
    fn yearly_without_reference_uses_current_month() {
        let next = compute_next_due_date(DueType::Yearly, Some(1), None, date(2025, 6, 15));
        assert_eq!(next, Ok(date(2026, 6, 1)));
    }

    #[test]
    fn daily_is_tomorrow() {
        let next = compute_next_due_date(DueType::Daily, None, Some(date(2020, 1, 1)), date(2025, 3, 1));
        assert_eq!(next, Ok(date(2025, 3, 2)));
    }

    #[test]
    fn weekly_with_future_reference_keeps_it() {
        let next = compute_next_due_date(
            DueType::Weekly,
            None,
            Some(date(2025, 3, 4)),
            date(2025, 3, 1),
        );
        assert_eq!(next, Ok(date(2025, 3, 4)));
    }

    #[test]
    fn weekly_exact_multiple_moves_past_now() {
        let next = compute_next_due_date(
            DueType::Weekly,
            None,
            Some(date(2025, 2, 22)),
            date(2025, 3, 1),
        );
        assert_eq!(next, Ok(date(2025, 3, 8)));
    }

    #[test]
    fn missing_and_invalid_days_are_reported() {
        assert!(matches!(
            compute_next_due_date(DueType::Monthly, None, None, date(2025, 1, 1)),
            Err(ScheduleError::RecordMalformed { .. })
        ));
        assert_eq!(
            compute_next_due_date(DueType::Yearly, Some(0), None, date(2025, 1, 1)),
            Err(ScheduleError::InvalidDayOfMonth(0))
        );
        assert_eq!(
            compute_next_due_date(DueType::Monthly, Some(32), None, date(2025, 1, 1)),
            Err(ScheduleError::InvalidDayOfMonth(32))
        );
        // Day is irrelevant for weekly schedules.
        assert!(compute_next_due_date(DueType::Weekly, Some(45), None, date(2025, 1, 1)).is_ok());
    }

    #[test]
    fn active_months_respects_end_date() {
        let months: Vec<Month> = active_months(date(2024, 6, 1), 1, 2025)
            .until(Some(date(2025, 3, 15)))
            .map(|entry| entry.month)
            .collect();
        assert_eq!(months, vec![Month::January, Month::February, Month::March]);
    }

    #[test]
    fn active_months_starts_mid_year() {
        let months: Vec<u32> = active_months(date(2025, 10, 5), 5, 2025)
            .map(|entry| entry.number())
            .collect();
        assert_eq!(months, vec![10, 11, 12]);
    }

    #[test]
    fn restart_replays_sequence() {
        let mut iter = active_months(date(2025, 1, 1), 1, 2025);
        let first: Vec<_> = iter.by_ref().take(3).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(iter.restart().count(), 12);
        assert_eq!(iter.count(), 9);
    }
}
