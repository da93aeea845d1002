//! Setup through profile commands, then a submitted check-in silencing the
//! reminder.

use std::sync::Arc;

use checkin::checkin::{CheckInService, CheckInSubmission};
use checkin::cycle::Evaluator;
use checkin::enrich::NoopDecorator;
use checkin::notify::DispatchOutcome;
use checkin::profile;
use checkin::store::UserStore;
use checkin::user::CycleKind;

use crate::helpers::{empty_scheduler, jan};

#[tokio::test]
async fn completed_checkin_suppresses_reminder() {
    let (mut scheduler, store, messenger) = empty_scheduler();
    profile::setup_user(&store, "ny", "c-ny", true).await.unwrap();
    profile::set_timezone(&store, "ny", "America/New_York").await.unwrap();

    assert_eq!(scheduler.sweep_at(jan(15, 14, 10)).await.sent, 1);

    // Check-in at 09:30 EST.
    let service = CheckInService::new(
        Arc::new(store.clone()),
        Arc::new(messenger.clone()),
        Arc::new(NoopDecorator),
    );
    let submission = CheckInSubmission::from_form(
        "ny",
        CycleKind::Morning,
        jan(15, 14, 30),
        "coffee\nfriends",
        "a walk",
        None,
    );
    let ack = service.submit("c-ny", &submission).await.unwrap();
    ack.decoration.await.unwrap();
    assert!(
        messenger.sent_to("c-ny")[1]
            .message
            .text
            .starts_with("**Daily Check-in Complete!**")
    );

    let report = scheduler.sweep_at(jan(15, 18, 10)).await;
    assert_eq!(report.sent, 0);
    assert_eq!(messenger.sent_to("c-ny").len(), 2);

    let record = store.get("ny").await.unwrap().unwrap();
    let status = profile::status(&record, &Evaluator::default(), jan(15, 18, 10));
    assert!(status.morning.completed_this_cycle);
    assert!(!status.night.completed_this_cycle);
    assert!(status.render().contains("✅ Completed for current cycle (2026-01-15 9:30 AM EST)"));
}

#[tokio::test]
async fn custom_times_move_the_ping() {
    let (mut scheduler, store, messenger) = empty_scheduler();
    profile::setup_user(&store, "tk", "c-tk", false).await.unwrap();
    profile::set_timezone(&store, "tk", "Asia/Tokyo").await.unwrap();
    profile::set_times(&store, "tk", "06:30", "23:00", "2").await.unwrap();

    // 09:00 JST: the default time no longer applies.
    assert_eq!(scheduler.sweep_at(jan(15, 0, 0)).await.sent, 0);
    // 06:40 JST.
    assert_eq!(scheduler.sweep_at(jan(14, 21, 40)).await.sent, 1);
    // 23:10 JST night ping, then the 01:10 JST reminder after midnight.
    assert_eq!(scheduler.sweep_at(jan(15, 14, 10)).await.sent, 1);
    assert_eq!(scheduler.sweep_at(jan(15, 16, 10)).await.sent, 1);

    let texts: Vec<String> = messenger
        .sent_to("c-tk")
        .into_iter()
        .map(|m| m.message.text)
        .collect();
    assert_eq!(texts.len(), 3);
    assert!(texts[0].ends_with("(6:40 AM JST)"), "{}", texts[0]);
    assert!(texts[1].starts_with("Good evening <@tk>!"));
    assert!(texts[2].contains("nightly reflection"));
}

#[tokio::test]
async fn manual_trigger_ignores_window_but_not_setup() {
    let (scheduler, store, messenger) = empty_scheduler();
    assert_eq!(
        scheduler.trigger_ping("ghost", CycleKind::Morning).await.unwrap(),
        DispatchOutcome::UnknownUser
    );

    profile::setup_user(&store, "ny", "c-ny", true).await.unwrap();
    assert_eq!(
        scheduler.trigger_ping("ny", CycleKind::Night).await.unwrap(),
        DispatchOutcome::Sent
    );
    assert_eq!(messenger.sent_to("c-ny").len(), 1);
    let record = store.get("ny").await.unwrap().unwrap();
    assert!(record.last_ping_at(CycleKind::Night).is_some());
}
