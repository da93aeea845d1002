//! Config files driving the scheduler.

use std::sync::Arc;

use checkin::BotConfig;
use checkin::cycle::Evaluator;
use checkin::notify::{Dispatcher, MemoryMessenger};
use checkin::scheduler::Scheduler;
use checkin::store::MemoryUserStore;

use crate::helpers::{jan, user_in};

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[scheduler]\ndefault_morning_time = \"07:15\"\n\n[enrichment]\nenabled = false\n",
    )
    .unwrap();

    let config = BotConfig::load_or_default(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.scheduler.default_morning_time, "07:15");
    assert_eq!(config.scheduler.default_night_time, "21:00");
    assert_eq!(config.scheduler.sweep_interval_secs, 1800);
    assert!(!config.enrichment.is_active());
}

#[test]
fn saved_config_loads_back_equal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut config = BotConfig::default();
    config.scheduler.due_window_minutes = 15;
    config.scheduler.default_reminder_delay_hours = 2;
    config.storage.data_dir = Some(dir.path().join("data"));

    config.save_to_file(&path).unwrap();
    assert_eq!(BotConfig::from_file(&path).unwrap(), config);
}

#[test]
fn invalid_default_time_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[scheduler]\ndefault_night_time = \"25:00\"\n").unwrap();

    let config = BotConfig::load_or_default(&path).unwrap();
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn configured_defaults_reach_the_sweep() {
    let mut config = BotConfig::default();
    config.scheduler.default_morning_time = "07:15".to_owned();
    config.scheduler.due_window_minutes = 10;
    config.validate().unwrap();

    let store = MemoryUserStore::with_records([user_in("ny", "America/New_York")]);
    let messenger = MemoryMessenger::new();
    let evaluator = Evaluator::new(
        config.scheduler.schedule_defaults().unwrap(),
        config.scheduler.due_window_minutes,
    );
    let dispatcher = Dispatcher::new(Arc::new(store), Arc::new(messenger.clone()), evaluator);
    let mut scheduler = Scheduler::new(dispatcher, config.scheduler.clone());

    // 07:30 EST is past the 10 minute window.
    assert_eq!(scheduler.sweep_at(jan(15, 12, 30)).await.sent, 0);
    // 07:20 EST.
    assert_eq!(scheduler.sweep_at(jan(15, 12, 20)).await.sent, 1);
    assert!(messenger.sent()[0].message.text.ends_with("(7:20 AM EST)"));
}
