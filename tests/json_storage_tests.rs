mod common;

use common::{add_channel, date, monthly_record, setup_test_env};
use subtrack_core::domain::{
    AccountId, EventKind, SortField, SortOrder, SubscriptionEvent, SubscriptionFilter,
    SubscriptionStatus,
};
use subtrack_core::storage::{JsonStorage, SubscriptionStore, STORE_SCHEMA_VERSION};

#[test]
fn records_survive_reopening_the_store() {
    let (storage, _) = setup_test_env();
    let channel = add_channel(&storage, "Netflix");
    let mut record = monthly_record(date(2025, 1, 10), 10, 15.99);
    record.channel_id = channel.id;
    storage.insert_subscription(&record).unwrap();

    let reopened = JsonStorage::new(Some(storage.base_dir().to_path_buf())).unwrap();
    let loaded = reopened.load().unwrap();
    assert_eq!(loaded.schema_version, STORE_SCHEMA_VERSION);
    assert_eq!(loaded.records().cloned().collect::<Vec<_>>(), vec![record.clone()]);
    assert_eq!(reopened.channel(channel.id).unwrap(), Some(channel));
    assert_eq!(reopened.subscription(record.id).unwrap(), Some(record));
}

#[test]
fn store_file_is_pretty_json_without_temp_leftovers() {
    let (storage, _) = setup_test_env();
    add_channel(&storage, "Spotify");
    let text = std::fs::read_to_string(storage.store_path()).unwrap();
    assert!(text.contains("\n  \"schema_version\": 1"), "{text}");

    let leftovers: Vec<_> = std::fs::read_dir(storage.base_dir())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn fetch_is_scoped_to_the_account_and_filtered() {
    let (storage, _) = setup_test_env();
    let cheap = monthly_record(date(2025, 1, 1), 1, 5.0);
    let pricey = monthly_record(date(2025, 2, 1), 1, 50.0);
    let mut other_account = monthly_record(date(2025, 1, 1), 1, 20.0);
    other_account.account_id = AccountId(2);
    for record in [&cheap, &pricey, &other_account] {
        storage.insert_subscription(record).unwrap();
    }

    let all = storage
        .fetch_subscriptions_for_account(AccountId(1), None)
        .unwrap();
    assert_eq!(all.len(), 2);

    let filter = SubscriptionFilter {
        min_cost: Some(1.0),
        sort_by: Some(SortField::MonthlyBill),
        sort_order: Some(SortOrder::Desc),
        ..SubscriptionFilter::default()
    };
    let sorted = storage
        .fetch_subscriptions_for_account(AccountId(1), Some(&filter))
        .unwrap();
    let bills: Vec<f64> = sorted.iter().map(|record| record.monthly_bill).collect();
    assert_eq!(bills, vec![50.0, 5.0]);
}

#[test]
fn targeted_updates_touch_only_their_field() {
    let (storage, _) = setup_test_env();
    let record = monthly_record(date(2025, 1, 1), 1, 9.0);
    storage.insert_subscription(&record).unwrap();

    storage
        .update_next_due_date(record.id, date(2025, 2, 1))
        .unwrap();
    storage
        .update_status(record.id, SubscriptionStatus::Paused)
        .unwrap();

    let stored = storage.subscription(record.id).unwrap().unwrap();
    assert_eq!(stored.next_due_date, date(2025, 2, 1));
    assert_eq!(stored.status, SubscriptionStatus::Paused);
    assert_eq!(stored.monthly_bill, 9.0);
    assert!(stored.updated_at >= record.updated_at);
}

#[test]
fn channels_are_listed_by_name_and_found_case_insensitively() {
    let (storage, _) = setup_test_env();
    add_channel(&storage, "zattoo");
    add_channel(&storage, "Apple TV");
    let names: Vec<String> = storage
        .list_channels()
        .unwrap()
        .into_iter()
        .map(|channel| channel.name)
        .collect();
    assert_eq!(names, vec!["Apple TV", "zattoo"]);
    assert!(storage.channel_by_name("  APPLE tv ").unwrap().is_some());
    assert!(storage.channel_by_name("Hulu").unwrap().is_none());
}

#[test]
fn events_are_kept_per_account() {
    let (storage, _) = setup_test_env();
    let record = monthly_record(date(2025, 1, 1), 1, 9.0);
    storage
        .record_event(&SubscriptionEvent::new(
            record.id,
            AccountId(1),
            EventKind::Created,
        ))
        .unwrap();
    storage
        .record_event(&SubscriptionEvent::new(
            record.id,
            AccountId(7),
            EventKind::Created,
        ))
        .unwrap();
    assert_eq!(storage.events_for_account(AccountId(1)).unwrap().len(), 1);
}
