use std::result::Result as StdResult;

use thiserror::Error;
use uuid::Uuid;

/// Validation failures raised before any due-date arithmetic runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid cadence `{0}`. Must be one of: daily, weekly, monthly, yearly")]
    InvalidCadence(String),
    #[error("invalid due day of month {0}. Must be between 1 and 31")]
    InvalidDayOfMonth(i64),
    #[error("record {} is malformed: {reason}", record_label(.subscription_id))]
    RecordMalformed {
        subscription_id: Option<Uuid>,
        reason: String,
    },
}

impl ScheduleError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ScheduleError::RecordMalformed {
            subscription_id: None,
            reason: reason.into(),
        }
    }

    /// Attaches the offending record id to a malformed-record error.
    pub(crate) fn for_record(self, id: Uuid) -> Self {
        match self {
            ScheduleError::RecordMalformed { reason, .. } => ScheduleError::RecordMalformed {
                subscription_id: Some(id),
                reason,
            },
            other => other,
        }
    }
}

fn record_label(id: &Option<Uuid>) -> String {
    id.map(|id| id.to_string())
        .unwrap_or_else(|| "<new>".to_string())
}

/// Unified error type for the service, storage, and configuration layers.
#[derive(Error, Debug)]
pub enum SubtrackError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(Uuid),
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = StdResult<T, SubtrackError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] SubtrackError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<std::io::Error> for SubtrackError {
    fn from(err: std::io::Error) -> Self {
        SubtrackError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for SubtrackError {
    fn from(err: serde_json::Error) -> Self {
        SubtrackError::StorageError(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Core(err.into())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}
