use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{account::AccountId, subscription::SubscriptionStatus};

/// Append-only audit entry describing a change to a subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionEvent {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub account_id: AccountId,
    pub kind: EventKind,
    pub created_at: DateTime<Utc>,
}

impl SubscriptionEvent {
    pub fn new(subscription_id: Uuid, account_id: AccountId, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            subscription_id,
            account_id,
            kind,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Created,
    DueDateAdvanced {
        from: NaiveDate,
        to: NaiveDate,
    },
    StatusChanged {
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },
}
