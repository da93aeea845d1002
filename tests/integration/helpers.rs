//! Shared helpers for integration tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use checkin::config::SchedulerConfig;
use checkin::cycle::Evaluator;
use checkin::notify::{Dispatcher, MemoryMessenger};
use checkin::scheduler::Scheduler;
use checkin::store::{MemoryUserStore, UserStore};
use checkin::user::UserRecord;

/// `hh:mm` UTC on 2026-01-`day`. New York is UTC-5 throughout.
pub(crate) fn jan(day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day, h, m, 0).unwrap()
}

/// A set-up user in `zone` posting to channel `c-{user_id}`, on default times.
pub(crate) fn user_in(user_id: &str, zone: &str) -> UserRecord {
    let mut record = UserRecord::new(user_id);
    record.channel_id = Some(format!("c-{user_id}"));
    record.timezone = Some(zone.to_owned());
    record
}

/// Scheduler over `store` with default schedule settings and a recording
/// messenger.
pub(crate) fn scheduler_over(store: Arc<dyn UserStore>) -> (Scheduler, MemoryMessenger) {
    let messenger = MemoryMessenger::new();
    let dispatcher = Dispatcher::new(store, Arc::new(messenger.clone()), Evaluator::default());
    (Scheduler::new(dispatcher, SchedulerConfig::default()), messenger)
}

/// Scheduler over an in-memory store seeded with `records`.
pub(crate) fn memory_scheduler(
    records: impl IntoIterator<Item = UserRecord>,
) -> (Scheduler, MemoryUserStore, MemoryMessenger) {
    let store = MemoryUserStore::with_records(records);
    let (scheduler, messenger) = scheduler_over(Arc::new(store.clone()));
    (scheduler, store, messenger)
}

/// Scheduler over an empty in-memory store.
pub(crate) fn empty_scheduler() -> (Scheduler, MemoryUserStore, MemoryMessenger) {
    memory_scheduler(Vec::<UserRecord>::new())
}
