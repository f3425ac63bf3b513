//! Report shapes produced by the monthly aggregator.

use std::fmt;

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::due_date::last_day_of_month;
use crate::core::errors::SubtrackError;
use crate::domain::subscription::SubscriptionStatus;

/// A calendar month within a specific year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthOfYear {
    pub month: Month,
    pub year: i32,
}

impl MonthOfYear {
    pub fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: month_from_number(date.month()),
            year: date.year(),
        }
    }

    /// 1-based month number.
    pub fn number(&self) -> u32 {
        self.month.number_from_month()
    }

    pub fn name(&self) -> &'static str {
        self.month.name()
    }
}

impl fmt::Display for MonthOfYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month.name(), self.year)
    }
}

/// Maps 1..=12 onto [`Month`]; out-of-range input wraps into the calendar.
pub(crate) fn month_from_number(number: u32) -> Month {
    let zero_based = (number.max(1) - 1) % 12;
    Month::try_from((zero_based + 1) as u8).unwrap_or(Month::January)
}

/// Total spend attributed to one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyDatum {
    pub month: String,
    pub year: i32,
    pub cost: f64,
}

impl MonthlyDatum {
    pub fn zero(month: MonthOfYear) -> Self {
        Self {
            month: month.name().to_string(),
            year: month.year,
            cost: 0.0,
        }
    }
}

/// A record left out of a report, with the reason it was rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedRecord {
    pub subscription_id: Uuid,
    pub reason: String,
}

/// Twelve-month spend breakdown for one year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTotals {
    pub year: i32,
    pub months: Vec<MonthlyDatum>,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
}

/// Inclusive date range used to select subscriptions by due date.
///
/// `start <= end` always holds, including for deserialized windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "WindowBounds")]
pub struct DueWindow {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct WindowBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<WindowBounds> for DueWindow {
    type Error = SubtrackError;

    fn try_from(bounds: WindowBounds) -> Result<Self, Self::Error> {
        DueWindow::new(bounds.start, bounds.end)
    }
}

impl DueWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SubtrackError> {
        if end < start {
            return Err(SubtrackError::InvalidInput(format!(
                "due window end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// First through last day of the month containing `date`.
    pub fn month_containing(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = last_day_of_month(date.year(), date.month()).unwrap_or(date);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DueWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// One subscription projected into a due-window report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DueLineItem {
    pub subscription_id: Uuid,
    pub channel_id: Uuid,
    pub month: String,
    pub year: i32,
    pub cost: f64,
    pub status: SubscriptionStatus,
    pub next_due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DueWindowReport {
    pub window: DueWindow,
    pub subscriptions: Vec<DueLineItem>,
    pub total_cost: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
}

/// Caller-supplied rules deciding which statuses are projected into reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ReportPolicy {
    pub include_paused: bool,
}

impl ReportPolicy {
    pub fn includes(&self, status: SubscriptionStatus) -> bool {
        match status {
            SubscriptionStatus::Active => true,
            SubscriptionStatus::Paused => self.include_paused,
            SubscriptionStatus::Inactive | SubscriptionStatus::Cancelled => false,
        }
    }
}
