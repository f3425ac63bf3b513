mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::{path::exists, str::contains};

fn script(home: &std::path::Path, input: &str) -> assert_cmd::assert::Assert {
    Command::cargo_bin("subtrack_cli")
        .unwrap()
        .env("SUBTRACK_CLI_SCRIPT", "1")
        .env("SUBTRACK_HOME", home)
        .env("SUBTRACK_TODAY", "2025-02-15")
        .env("NO_COLOR", "1")
        .env_remove("SUBTRACK_ACCOUNT")
        .write_stdin(input.to_string())
        .assert()
}

#[test]
fn script_mode_runs_subscription_flow() {
    let home = common::temp_base();
    let input = "\
channel-add Netflix https://netflix.example \"Streaming films\" https://netflix.example/logo.png
subscribe Netflix 15.99 --day 31
report 2025
due
exit
";
    script(&home, input)
        .success()
        .stdout(contains("Channel `Netflix` added"))
        .stdout(contains("next due 2025-02-28"))
        .stdout(contains("Total: 175.89 USD"))
        .stdout(contains("Total due: 15.99 USD"));

    let store = std::fs::read_to_string(home.join("store.json")).unwrap();
    assert!(store.contains("\"Netflix\""));
}

#[test]
fn errors_are_reported_without_aborting() {
    let home = common::temp_base();
    let input = "\
subscrbe Netflix 10
subscribe Missing 10
next-due monthly --day 31 --now 2024-02-15
";
    script(&home, input)
        .success()
        .stdout(contains("Suggestion: `subscribe`?"))
        .stdout(contains("no channel matches `Missing`"))
        .stdout(contains("2024-02-29"));
}

#[test]
fn config_changes_persist_between_runs() {
    let home = assert_fs::TempDir::new().unwrap();
    script(home.path(), "config-set currency eur\nconfig-set include_paused true\nconfig backup before report\n")
        .success()
        .stdout(contains("Configuration backed up as `config_"));
    home.child("config/config.json").assert(exists());
    script(home.path(), "config\nconfig backups\n")
        .success()
        .stdout(contains("currency         : EUR"))
        .stdout(contains("include_paused   : true"))
        .stdout(contains("_before-report.json"));
}

#[test]
fn accounts_are_isolated() {
    let home = common::temp_base();
    let input = "\
channel-add Hulu https://hulu.example Series https://hulu.example/logo.png
subscribe Hulu 7.5
account 2
list
";
    script(&home, input)
        .success()
        .stdout(contains("Switched to account 2."))
        .stdout(contains("No subscriptions for account 2."));
}
