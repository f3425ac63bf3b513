use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::errors::{ScheduleError, SubtrackError};
use crate::domain::account::AccountId;
use crate::domain::common::*;

/// Recurrence cadence of a subscription's billing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DueType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl DueType {
    pub const ALL: [DueType; 4] = [
        DueType::Daily,
        DueType::Weekly,
        DueType::Monthly,
        DueType::Yearly,
    ];

    /// Monthly and yearly cadences bill on a nominal day of the month.
    pub fn requires_day_of_month(self) -> bool {
        matches!(self, DueType::Monthly | DueType::Yearly)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DueType::Daily => "daily",
            DueType::Weekly => "weekly",
            DueType::Monthly => "monthly",
            DueType::Yearly => "yearly",
        }
    }
}

impl fmt::Display for DueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DueType {
    type Err = ScheduleError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_ascii_lowercase();
        DueType::ALL
            .into_iter()
            .find(|cadence| cadence.as_str() == normalized)
            .ok_or_else(|| ScheduleError::InvalidCadence(input.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Inactive,
    Paused,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = SubtrackError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(SubscriptionStatus::Active),
            "inactive" => Ok(SubscriptionStatus::Inactive),
            "paused" => Ok(SubscriptionStatus::Paused),
            "cancelled" | "canceled" => Ok(SubscriptionStatus::Cancelled),
            other => Err(SubtrackError::InvalidInput(format!(
                "invalid status `{other}`. Must be one of: active, inactive, paused, cancelled"
            ))),
        }
    }
}

/// A tracked subscription as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionRecord {
    pub id: Uuid,
    pub account_id: AccountId,
    pub channel_id: Uuid,
    pub start_date: NaiveDate,
    pub due_type: DueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_day_of_month: Option<u32>,
    pub next_due_date: NaiveDate,
    pub monthly_bill: f64,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// Builds an active record; callers fill the optional fields afterwards.
    pub fn new(
        account_id: AccountId,
        channel_id: Uuid,
        start_date: NaiveDate,
        due_type: DueType,
        due_day_of_month: Option<u32>,
        next_due_date: NaiveDate,
        monthly_bill: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            channel_id,
            start_date,
            due_type,
            due_day_of_month,
            next_due_date,
            monthly_bill,
            status: SubscriptionStatus::Active,
            end_date: None,
            reminder_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identifiable for SubscriptionRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Billable for SubscriptionRecord {
    fn cost(&self) -> f64 {
        self.monthly_bill
    }
}

impl Displayable for SubscriptionRecord {
    fn display_label(&self) -> String {
        format!(
            "{} {} due {} ({})",
            self.due_type, self.monthly_bill, self.next_due_date, self.status
        )
    }
}

/// Input for creating a subscription, validated by the subscription service.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionDraft {
    pub channel_id: Uuid,
    pub monthly_bill: f64,
    pub due_type: DueType,
    pub due_day_of_month: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub next_due_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reminder_date: Option<NaiveDate>,
    pub status: SubscriptionStatus,
}

impl SubscriptionDraft {
    /// Active, monthly, billed on the first unless changed.
    pub fn new(channel_id: Uuid, monthly_bill: f64) -> Self {
        Self {
            channel_id,
            monthly_bill,
            due_type: DueType::Monthly,
            due_day_of_month: Some(1),
            start_date: None,
            next_due_date: None,
            end_date: None,
            reminder_date: None,
            status: SubscriptionStatus::Active,
        }
    }

    pub fn cadence(mut self, due_type: DueType, due_day_of_month: Option<u32>) -> Self {
        self.due_type = due_type;
        self.due_day_of_month = due_day_of_month;
        self
    }

    pub fn starting(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn ending(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn next_due(mut self, next_due_date: NaiveDate) -> Self {
        self.next_due_date = Some(next_due_date);
        self
    }

    pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_parsing_is_case_insensitive() {
        assert_eq!("Monthly".parse::<DueType>().unwrap(), DueType::Monthly);
        assert_eq!(" weekly ".parse::<DueType>().unwrap(), DueType::Weekly);
    }

    #[test]
    fn unknown_cadence_is_rejected() {
        let err = "fortnightly".parse::<DueType>().unwrap_err();
        assert_eq!(err, ScheduleError::InvalidCadence("fortnightly".into()));
    }

    #[test]
    fn record_serializes_lowercase_enums() {
        let record = SubscriptionRecord::new(
            AccountId(7),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            DueType::Yearly,
            Some(5),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            99.0,
        )
        .with_status(SubscriptionStatus::Paused);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["due_type"], "yearly");
        assert_eq!(json["status"], "paused");
        assert_eq!(json["account_id"], 7);
        assert!(json.get("end_date").is_none());
    }
}
