//! Query options applied when listing an account's subscriptions.

use std::{cmp::Ordering, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::errors::SubtrackError;
use crate::domain::subscription::{SubscriptionRecord, SubscriptionStatus};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    MonthlyBill,
    NextDueDate,
    StartDate,
    Status,
}

impl FromStr for SortField {
    type Err = SubtrackError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "monthly_bill" => Ok(SortField::MonthlyBill),
            "next_due_date" => Ok(SortField::NextDueDate),
            "start_date" => Ok(SortField::StartDate),
            "status" => Ok(SortField::Status),
            other => Err(SubtrackError::InvalidInput(format!(
                "invalid sort field: {other}. Must be one of: monthly_bill, next_due_date, start_date, status"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = SubtrackError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(SubtrackError::InvalidInput(
                "sort_order must be 'asc' or 'desc'".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_to: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due_date_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due_date_to: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl SubscriptionFilter {
    pub fn with_status(status: SubscriptionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SubtrackError> {
        if let (Some(min), Some(max)) = (self.min_cost, self.max_cost) {
            if min > max {
                return Err(SubtrackError::InvalidInput(
                    "min_cost cannot be greater than max_cost".into(),
                ));
            }
        }
        if self.sort_by.is_none() && self.sort_order.is_some() {
            return Err(SubtrackError::InvalidInput(
                "sort_order requires sort_by to be specified".into(),
            ));
        }
        check_range(self.start_date_from, self.start_date_to, "start_date")?;
        check_range(self.next_due_date_from, self.next_due_date_to, "next_due_date")?;
        Ok(())
    }

    pub fn matches(&self, record: &SubscriptionRecord) -> bool {
        if self.status.is_some_and(|status| status != record.status) {
            return false;
        }
        if self.min_cost.is_some_and(|min| record.monthly_bill < min) {
            return false;
        }
        if self.max_cost.is_some_and(|max| record.monthly_bill > max) {
            return false;
        }
        within(record.start_date, self.start_date_from, self.start_date_to)
            && within(
                record.next_due_date,
                self.next_due_date_from,
                self.next_due_date_to,
            )
    }

    /// Filters and orders `records` in place.
    pub fn apply(&self, records: &mut Vec<SubscriptionRecord>) {
        records.retain(|record| self.matches(record));
        if let Some(field) = self.sort_by {
            records.sort_by(|a, b| compare(field, a, b));
            if self.sort_order.unwrap_or_default() == SortOrder::Desc {
                records.reverse();
            }
        }
    }
}

fn check_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    field: &str,
) -> Result<(), SubtrackError> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(SubtrackError::InvalidInput(format!(
            "{field}_from cannot be after {field}_to"
        ))),
        _ => Ok(()),
    }
}

fn within(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.map_or(true, |from| date >= from) && to.map_or(true, |to| date <= to)
}

fn compare(field: SortField, a: &SubscriptionRecord, b: &SubscriptionRecord) -> Ordering {
    match field {
        SortField::MonthlyBill => a
            .monthly_bill
            .partial_cmp(&b.monthly_bill)
            .unwrap_or(Ordering::Equal),
        SortField::NextDueDate => a.next_due_date.cmp(&b.next_due_date),
        SortField::StartDate => a.start_date.cmp(&b.start_date),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{account::AccountId, subscription::DueType};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(bill: f64, next_due: NaiveDate) -> SubscriptionRecord {
        SubscriptionRecord::new(
            AccountId(1),
            Uuid::new_v4(),
            date(2025, 1, 1),
            DueType::Monthly,
            Some(1),
            next_due,
            bill,
        )
    }

    #[test]
    fn validation_rejects_inverted_ranges() {
        let filter = SubscriptionFilter {
            min_cost: Some(20.0),
            max_cost: Some(10.0),
            ..Default::default()
        };
        assert!(filter.validate().is_err());

        let filter = SubscriptionFilter {
            next_due_date_from: Some(date(2025, 3, 1)),
            next_due_date_to: Some(date(2025, 2, 1)),
            ..Default::default()
        };
        assert!(filter.validate().is_err());

        let filter = SubscriptionFilter {
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };
        assert!(filter.validate().is_err());
    }

    #[test]
    fn apply_filters_and_sorts_descending() {
        let mut records = vec![
            record(5.0, date(2025, 2, 1)),
            record(30.0, date(2025, 3, 1)),
            record(15.0, date(2025, 4, 1)),
        ];
        let filter = SubscriptionFilter {
            min_cost: Some(10.0),
            sort_by: Some(SortField::MonthlyBill),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };
        filter.apply(&mut records);
        let bills: Vec<f64> = records.iter().map(|r| r.monthly_bill).collect();
        assert_eq!(bills, vec![30.0, 15.0]);
    }
}
