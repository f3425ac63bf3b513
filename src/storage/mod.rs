pub mod json_backend;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::errors::SubtrackError;
use crate::domain::{
    AccountId, SkippedRecord, SubscriptionChannel, SubscriptionEvent, SubscriptionFilter,
    SubscriptionRecord, SubscriptionStatus,
};

pub type Result<T> = std::result::Result<T, SubtrackError>;

/// A targeted write against the subscription table.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordChange {
    /// Adds a record; an account holds at most one record per channel.
    Insert(SubscriptionRecord),
    NextDueDate(Uuid, NaiveDate),
    Status(Uuid, SubscriptionStatus),
}

/// Everything an account owns in the subscription table.
///
/// `unreadable` lists stored entries that could not be read as records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountSubscriptions {
    pub records: Vec<SubscriptionRecord>,
    pub unreadable: Vec<SkippedRecord>,
}

/// Persistence collaborator for subscriptions, channels, and their audit trail.
///
/// Implementations own the data; services only read records and hand back
/// targeted updates.
pub trait SubscriptionStore: Send + Sync {
    fn fetch_subscriptions_for_account(
        &self,
        account: AccountId,
        filter: Option<&SubscriptionFilter>,
    ) -> Result<Vec<SubscriptionRecord>>;
    fn subscription(&self, id: Uuid) -> Result<Option<SubscriptionRecord>>;
    fn insert_subscription(&self, record: &SubscriptionRecord) -> Result<()>;
    fn update_next_due_date(&self, id: Uuid, next_due_date: NaiveDate) -> Result<()>;
    fn update_status(&self, id: Uuid, status: SubscriptionStatus) -> Result<()>;

    /// Applies `change` and appends `event` as one write; neither lands alone.
    fn apply_with_event(&self, change: RecordChange, event: &SubscriptionEvent) -> Result<()>;

    /// Readable records of `account` plus the entries that failed to parse.
    /// Default reads through `fetch_subscriptions_for_account`.
    fn load_account_subscriptions(&self, account: AccountId) -> Result<AccountSubscriptions> {
        Ok(AccountSubscriptions {
            records: self.fetch_subscriptions_for_account(account, None)?,
            unreadable: Vec::new(),
        })
    }

    fn insert_channel(&self, channel: &SubscriptionChannel) -> Result<()>;
    fn channel(&self, id: Uuid) -> Result<Option<SubscriptionChannel>>;
    fn list_channels(&self) -> Result<Vec<SubscriptionChannel>>;

    fn record_event(&self, event: &SubscriptionEvent) -> Result<()>;
    fn events_for_account(&self, account: AccountId) -> Result<Vec<SubscriptionEvent>>;

    /// Case-insensitive lookup by channel name. Default scans `list_channels`.
    fn channel_by_name(&self, name: &str) -> Result<Option<SubscriptionChannel>> {
        let needle = name.trim().to_ascii_lowercase();
        Ok(self
            .list_channels()?
            .into_iter()
            .find(|channel| channel.name.trim().to_ascii_lowercase() == needle))
    }
}

pub use json_backend::{JsonStorage, StoreData, StoredSubscription, STORE_SCHEMA_VERSION};
