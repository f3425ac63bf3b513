#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use subtrack_core::{
    config::ConfigManager,
    core::services::ChannelService,
    domain::{AccountId, DueType, SubscriptionChannel, SubscriptionRecord},
    storage::JsonStorage,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates an isolated store and config manager sharing one base directory.
pub fn setup_test_env() -> (JsonStorage, ConfigManager) {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base.clone())).expect("create json storage backend");
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");
    (storage, config_manager)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn add_channel(storage: &JsonStorage, name: &str) -> SubscriptionChannel {
    ChannelService::add(
        storage,
        SubscriptionChannel::new(
            name,
            format!("https://{}.example", name.to_lowercase()),
            format!("{name} streaming"),
            format!("https://{}.example/logo.png", name.to_lowercase()),
        ),
    )
    .expect("add channel")
}

pub fn monthly_record(start: NaiveDate, due_day: u32, bill: f64) -> SubscriptionRecord {
    SubscriptionRecord::new(
        AccountId(1),
        uuid::Uuid::new_v4(),
        start,
        DueType::Monthly,
        Some(due_day),
        start,
        bill,
    )
}
