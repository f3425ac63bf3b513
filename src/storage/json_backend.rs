use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    core::errors::{ScheduleError, SubtrackError},
    domain::{
        AccountId, DueType, SkippedRecord, SubscriptionChannel, SubscriptionEvent,
        SubscriptionFilter, SubscriptionRecord, SubscriptionStatus,
    },
    utils::paths::{ensure_dir, write_atomic, PathResolver},
};

use super::{AccountSubscriptions, RecordChange, Result, SubscriptionStore};

pub const STORE_SCHEMA_VERSION: u32 = 1;

/// One entry of the subscription table.
///
/// Entries that do not parse as a record are kept verbatim so a rewrite of the
/// store never drops them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StoredSubscription {
    Valid(SubscriptionRecord),
    Unreadable(Value),
}

impl StoredSubscription {
    pub fn as_record(&self) -> Option<&SubscriptionRecord> {
        match self {
            StoredSubscription::Valid(record) => Some(record),
            StoredSubscription::Unreadable(_) => None,
        }
    }

    fn as_record_mut(&mut self) -> Option<&mut SubscriptionRecord> {
        match self {
            StoredSubscription::Valid(record) => Some(record),
            StoredSubscription::Unreadable(_) => None,
        }
    }
}

/// Everything the JSON backend persists, as one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreData {
    pub schema_version: u32,
    #[serde(default)]
    pub channels: Vec<SubscriptionChannel>,
    #[serde(default)]
    pub subscriptions: Vec<StoredSubscription>,
    #[serde(default)]
    pub events: Vec<SubscriptionEvent>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            channels: Vec::new(),
            subscriptions: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl StoreData {
    /// Readable records, skipping unreadable entries.
    pub fn records(&self) -> impl Iterator<Item = &SubscriptionRecord> {
        self.subscriptions.iter().filter_map(StoredSubscription::as_record)
    }

    fn record_mut(&mut self, id: Uuid) -> Result<&mut SubscriptionRecord> {
        self.subscriptions
            .iter_mut()
            .filter_map(StoredSubscription::as_record_mut)
            .find(|record| record.id == id)
            .ok_or(SubtrackError::SubscriptionNotFound(id))
    }

    fn apply(&mut self, change: RecordChange) -> Result<()> {
        match change {
            RecordChange::Insert(record) => {
                if self.records().any(|existing| existing.id == record.id) {
                    return Err(SubtrackError::Conflict(format!(
                        "subscription {} already exists",
                        record.id
                    )));
                }
                if self.records().any(|existing| {
                    existing.account_id == record.account_id
                        && existing.channel_id == record.channel_id
                }) {
                    return Err(SubtrackError::Conflict(
                        "You already have a subscription to this channel".into(),
                    ));
                }
                self.subscriptions.push(StoredSubscription::Valid(record));
            }
            RecordChange::NextDueDate(id, next_due_date) => {
                let record = self.record_mut(id)?;
                record.next_due_date = next_due_date;
                record.touch();
            }
            RecordChange::Status(id, status) => {
                let record = self.record_mut(id)?;
                record.status = status;
                record.touch();
            }
        }
        Ok(())
    }
}

/// Owner and failure reason of an entry that is not a readable record.
///
/// Entries without a usable `account_id` belong to nobody and are `None`.
fn diagnose(raw: &Value) -> Option<(AccountId, SkippedRecord)> {
    let owner = raw
        .get("account_id")
        .and_then(|claim| AccountId::from_claim(claim).ok())?;
    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .and_then(|text| Uuid::parse_str(text).ok());

    let error = match raw.get("due_type") {
        None | Some(Value::Null) => ScheduleError::malformed("due_type is missing"),
        Some(Value::String(cadence)) if cadence.parse::<DueType>().is_err() => {
            ScheduleError::InvalidCadence(cadence.clone())
        }
        Some(_) => match serde_json::from_value::<SubscriptionRecord>(raw.clone()) {
            Err(err) => ScheduleError::malformed(err.to_string()),
            Ok(_) => ScheduleError::malformed("entry is not a subscription record"),
        },
    };
    let error = match id {
        Some(id) => error.for_record(id),
        None => error,
    };
    Some((
        owner,
        SkippedRecord {
            subscription_id: id.unwrap_or_else(Uuid::nil),
            reason: error.to_string(),
        },
    ))
}

/// File-backed store writing a pretty-printed `store.json` atomically.
///
/// Every mutation is a full read-modify-write cycle under an internal lock,
/// so a single `JsonStorage` can be shared between threads.
pub struct JsonStorage {
    root: PathBuf,
    store_file: PathBuf,
    lock: Mutex<()>,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = PathResolver::resolve_base(root);
        ensure_dir(&root)?;
        let store_file = PathResolver::store_file_in(&root);
        Ok(Self {
            root,
            store_file,
            lock: Mutex::new(()),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn store_path(&self) -> &Path {
        &self.store_file
    }

    /// Reads the whole document; a missing file is an empty store.
    pub fn load(&self) -> Result<StoreData> {
        let _guard = self.guard()?;
        self.read_data()
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| SubtrackError::StorageError("store lock poisoned".into()))
    }

    fn read_data(&self) -> Result<StoreData> {
        if !self.store_file.exists() {
            return Ok(StoreData::default());
        }
        let data = fs::read_to_string(&self.store_file)?;
        let parsed: StoreData = serde_json::from_str(&data)?;
        if parsed.schema_version > STORE_SCHEMA_VERSION {
            return Err(SubtrackError::StorageError(format!(
                "store `{}` is from a newer schema version ({})",
                self.store_file.display(),
                parsed.schema_version
            )));
        }
        Ok(parsed)
    }

    fn write_data(&self, data: &StoreData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        write_atomic(&self.store_file, &json)
    }

    fn mutate<T>(&self, change: impl FnOnce(&mut StoreData) -> Result<T>) -> Result<T> {
        let _guard = self.guard()?;
        let mut data = self.read_data()?;
        let outcome = change(&mut data)?;
        self.write_data(&data)?;
        Ok(outcome)
    }
}

impl SubscriptionStore for JsonStorage {
    fn fetch_subscriptions_for_account(
        &self,
        account: AccountId,
        filter: Option<&SubscriptionFilter>,
    ) -> Result<Vec<SubscriptionRecord>> {
        let data = self.load()?;
        let mut records: Vec<SubscriptionRecord> = data
            .records()
            .filter(|record| record.account_id == account)
            .cloned()
            .collect();
        if let Some(filter) = filter {
            filter.apply(&mut records);
        }
        Ok(records)
    }

    fn load_account_subscriptions(&self, account: AccountId) -> Result<AccountSubscriptions> {
        let data = self.load()?;
        let mut loaded = AccountSubscriptions::default();
        for entry in data.subscriptions {
            match entry {
                StoredSubscription::Valid(record) if record.account_id == account => {
                    loaded.records.push(record);
                }
                StoredSubscription::Valid(_) => {}
                StoredSubscription::Unreadable(raw) => match diagnose(&raw) {
                    Some((owner, skipped)) if owner == account => {
                        tracing::warn!(
                            subscription = %skipped.subscription_id,
                            error = %skipped.reason,
                            "skipping unreadable subscription record"
                        );
                        loaded.unreadable.push(skipped);
                    }
                    Some(_) => {}
                    None => {
                        tracing::warn!("subscription entry without a readable account_id ignored")
                    }
                },
            }
        }
        Ok(loaded)
    }

    fn subscription(&self, id: Uuid) -> Result<Option<SubscriptionRecord>> {
        let data = self.load()?;
        let found = data.records().find(|record| record.id == id).cloned();
        Ok(found)
    }

    fn insert_subscription(&self, record: &SubscriptionRecord) -> Result<()> {
        self.mutate(|data| data.apply(RecordChange::Insert(record.clone())))
    }

    fn update_next_due_date(&self, id: Uuid, next_due_date: NaiveDate) -> Result<()> {
        self.mutate(|data| data.apply(RecordChange::NextDueDate(id, next_due_date)))
    }

    fn update_status(&self, id: Uuid, status: SubscriptionStatus) -> Result<()> {
        self.mutate(|data| data.apply(RecordChange::Status(id, status)))
    }

    fn apply_with_event(&self, change: RecordChange, event: &SubscriptionEvent) -> Result<()> {
        self.mutate(|data| {
            data.apply(change)?;
            data.events.push(event.clone());
            Ok(())
        })
    }

    fn insert_channel(&self, channel: &SubscriptionChannel) -> Result<()> {
        self.mutate(|data| {
            if data.channels.iter().any(|existing| existing.id == channel.id) {
                return Err(SubtrackError::Conflict(format!(
                    "channel {} already exists",
                    channel.id
                )));
            }
            data.channels.push(channel.clone());
            Ok(())
        })
    }

    fn channel(&self, id: Uuid) -> Result<Option<SubscriptionChannel>> {
        let data = self.load()?;
        Ok(data.channels.into_iter().find(|channel| channel.id == id))
    }

    fn list_channels(&self) -> Result<Vec<SubscriptionChannel>> {
        let mut channels = self.load()?.channels;
        channels.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(channels)
    }

    fn record_event(&self, event: &SubscriptionEvent) -> Result<()> {
        self.mutate(|data| {
            data.events.push(event.clone());
            Ok(())
        })
    }

    fn events_for_account(&self, account: AccountId) -> Result<Vec<SubscriptionEvent>> {
        let data = self.load()?;
        Ok(data
            .events
            .into_iter()
            .filter(|event| event.account_id == account)
            .collect())
    }
}
