//! Sweeps against the JSON file store.

use std::sync::Arc;

use checkin::CheckinError;
use checkin::profile;
use checkin::store::{JsonFileUserStore, UserStore};
use checkin::user::CycleKind;

use crate::helpers::{jan, scheduler_over};

#[tokio::test]
async fn sweep_results_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileUserStore::open_in(&dir.path().join("data")).await.unwrap();
    let path = store.path().to_path_buf();
    profile::setup_user(&store, "ny", "c-ny", true).await.unwrap();
    profile::set_timezone(&store, "ny", "America/New_York").await.unwrap();

    let (mut scheduler, messenger) = scheduler_over(Arc::new(store));
    assert_eq!(scheduler.sweep_at(jan(15, 14, 10)).await.sent, 1);
    assert_eq!(scheduler.sweep_at(jan(15, 18, 10)).await.sent, 1);
    assert_eq!(messenger.sent().len(), 2);

    let reopened = JsonFileUserStore::new(&path);
    let record = reopened.get("ny").await.unwrap().unwrap();
    assert_eq!(record.timezone.as_deref(), Some("America/New_York"));
    assert_eq!(record.last_ping_at(CycleKind::Morning), Some(jan(15, 14, 10)));
    assert!(record.reminder_sent_for(CycleKind::Morning));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["ny"]["reminderSent"], serde_json::Value::Bool(true));
    assert_eq!(raw["ny"]["channelId"], "c-ny");

    // A fresh scheduler over the reopened file does not ping again.
    let (mut scheduler, messenger) = scheduler_over(Arc::new(reopened));
    assert_eq!(scheduler.sweep_at(jan(15, 14, 20)).await.sent, 0);
    assert!(messenger.sent().is_empty());
}

#[tokio::test]
async fn corrupt_file_fails_the_sweep_without_overwriting() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, "{ not json").unwrap();
    let store = JsonFileUserStore::new(&path);

    assert!(matches!(
        store.get_all().await,
        Err(CheckinError::Persistence(_))
    ));

    let (mut scheduler, messenger) = scheduler_over(Arc::new(store));
    let report = scheduler.sweep_at(jan(15, 14, 10)).await;
    assert!(report.failed >= 1);
    assert_eq!(report.sent, 0);
    assert!(messenger.sent().is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

#[tokio::test]
async fn hand_edited_bad_time_falls_back_to_the_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(
        &path,
        r#"{
            "ok": {"userId": "ok", "channelId": "c-ok"},
            "typo": {"userId": "typo", "channelId": "c-typo", "morningTime": "9am"}
        }"#,
    )
    .unwrap();

    let (mut scheduler, messenger) = scheduler_over(Arc::new(JsonFileUserStore::new(&path)));
    // 09:10 UTC: both users are on the default morning time.
    let report = scheduler.sweep_at(jan(15, 9, 10)).await;
    assert_eq!(report.failed, 0);
    assert_eq!(report.sent, 2);
    assert_eq!(messenger.sent_to("c-ok").len(), 1);
    assert_eq!(messenger.sent_to("c-typo").len(), 1);
}
