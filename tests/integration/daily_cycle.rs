//! A New York user through two January days of sweeps.

use std::sync::Arc;

use checkin::config::SchedulerConfig;
use checkin::cycle::Evaluator;
use checkin::notify::templates::MORNING_BUTTON_ID;
use checkin::notify::{Dispatcher, MemoryMessenger};
use checkin::scheduler::Scheduler;
use checkin::store::{MemoryUserStore, UserStore};
use checkin::user::{CycleKind, UserRecord};

use crate::helpers::{jan, memory_scheduler, user_in};

#[tokio::test]
async fn morning_ping_reminder_and_next_day_reset() {
    let (mut scheduler, store, messenger) = memory_scheduler([user_in("ny", "America/New_York")]);

    // 09:10 EST: ping goes out once.
    let report = scheduler.sweep_at(jan(15, 14, 10)).await;
    assert_eq!(report.sent, 1);
    assert!(report.reset_ran);
    let sent = messenger.sent_to("c-ny");
    assert_eq!(sent.len(), 1);
    assert!(sent[0].message.text.starts_with("Good morning <@ny>! 🌅"));
    assert!(sent[0].message.text.ends_with("(9:10 AM EST)"), "{}", sent[0].message.text);
    assert_eq!(
        sent[0].message.action.as_ref().map(|a| a.custom_id.as_str()),
        Some(MORNING_BUTTON_ID)
    );
    let record = store.get("ny").await.unwrap().unwrap();
    assert_eq!(record.last_ping_at(CycleKind::Morning), Some(jan(15, 14, 10)));

    // Still inside the window, already pinged this cycle.
    let report = scheduler.sweep_at(jan(15, 14, 20)).await;
    assert_eq!(report.sent, 0);
    assert!(!report.reset_ran);

    // 13:10 EST with no check-in: one reminder.
    let report = scheduler.sweep_at(jan(15, 18, 10)).await;
    assert_eq!(report.sent, 1);
    let sent = messenger.sent_to("c-ny");
    assert_eq!(sent.len(), 2);
    assert!(sent[1].message.text.contains("friendly reminder"));
    assert!(store.get("ny").await.unwrap().unwrap().reminder_sent_for(CycleKind::Morning));

    assert_eq!(scheduler.sweep_at(jan(15, 18, 20)).await.sent, 0);

    // 21:05 EST: night ping, before the reset hour.
    let report = scheduler.sweep_at(jan(16, 2, 5)).await;
    assert_eq!(report.sent, 1);
    assert!(!report.reset_ran);
    assert!(messenger.sent_to("c-ny")[2].message.text.starts_with("Good evening <@ny>!"));

    // Next morning: the stale reminder flag is cleared before the new ping.
    let report = scheduler.sweep_at(jan(16, 14, 10)).await;
    assert!(report.reset_ran);
    assert_eq!(report.flags_reset, 1);
    assert_eq!(report.sent, 1);
    let record = store.get("ny").await.unwrap().unwrap();
    assert!(!record.reminder_sent_for(CycleKind::Morning));
    assert_eq!(record.last_ping_at(CycleKind::Morning), Some(jan(16, 14, 10)));
    assert_eq!(messenger.sent_to("c-ny").len(), 4);
}

#[tokio::test]
async fn each_user_is_pinged_on_their_own_clock() {
    let (mut scheduler, _store, messenger) = memory_scheduler([
        user_in("ny", "America/New_York"),
        user_in("in", "Asia/Kolkata"),
        UserRecord::new("nobody"),
    ]);

    // 09:10 IST.
    let report = scheduler.sweep_at(jan(15, 3, 40)).await;
    assert_eq!(report.users_evaluated, 3);
    assert_eq!(report.sent, 1);
    assert_eq!(messenger.sent_to("c-in").len(), 1);
    assert!(messenger.sent_to("c-ny").is_empty());

    let report = scheduler.sweep_at(jan(15, 14, 10)).await;
    assert_eq!(report.sent, 1);
    assert_eq!(messenger.sent_to("c-ny").len(), 1);
    assert_eq!(messenger.sent().len(), 2);
}

#[tokio::test]
async fn unreachable_channel_counts_as_failure_and_is_retried() {
    let store = MemoryUserStore::with_records([
        user_in("gone", "America/New_York"),
        user_in("ny", "America/New_York"),
    ]);
    let messenger = MemoryMessenger::new().with_missing_channel("c-gone");
    let dispatcher = Dispatcher::new(
        Arc::new(store.clone()),
        Arc::new(messenger.clone()),
        Evaluator::default(),
    );
    let mut scheduler = Scheduler::new(dispatcher, SchedulerConfig::default());

    let report = scheduler.sweep_at(jan(15, 14, 10)).await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.sent, 1);
    let gone = store.get("gone").await.unwrap().unwrap();
    assert_eq!(gone.last_ping_at(CycleKind::Morning), None);

    // Not marked as pinged, so the next sweep in the window tries again.
    let report = scheduler.sweep_at(jan(15, 14, 20)).await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.sent, 0);
}
