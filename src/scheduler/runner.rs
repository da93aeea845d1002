//! Scheduler background loop.
//!
//! Spawns a tokio task that periodically sweeps every user record, asks the
//! evaluator which jobs are due, and hands them to the dispatcher. There is
//! no per-user timer state: a changed schedule takes effect on the next tick.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::reset::reset_stale_flags;
use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::notify::{DispatchOutcome, Dispatcher};
use crate::user::CycleKind;

/// Shortest tick the loop will run at.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Summary of one sweep, sent on the report channel when one is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub users_evaluated: usize,
    pub sent: usize,
    /// Jobs due in the snapshot but not due on the fresh re-read.
    pub skipped: usize,
    pub failed: usize,
    /// `true` when the daily flag reset ran in this sweep.
    pub reset_ran: bool,
    pub flags_reset: usize,
}

impl SweepReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            users_evaluated: 0,
            sent: 0,
            skipped: 0,
            failed: 0,
            reset_ran: false,
            flags_reset: 0,
        }
    }
}

/// Scheduler state owned by one [`Scheduler`] instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepState {
    last_sweep: Option<DateTime<Utc>>,
    last_reset_date: Option<NaiveDate>,
}

impl SweepState {
    pub fn last_sweep(&self) -> Option<DateTime<Utc>> {
        self.last_sweep
    }

    /// UTC date of the last successful reset.
    pub fn last_reset_date(&self) -> Option<NaiveDate> {
        self.last_reset_date
    }

    /// `true` on the first sweep at or after `reset_hour_utc` each UTC day.
    pub fn reset_due(&self, now: DateTime<Utc>, reset_hour_utc: u32) -> bool {
        now.hour() >= reset_hour_utc && self.last_reset_date != Some(now.date_naive())
    }

    fn mark_reset(&mut self, now: DateTime<Utc>) {
        self.last_reset_date = Some(now.date_naive());
    }
}

/// Periodic sweep scheduler.
pub struct Scheduler {
    dispatcher: Dispatcher,
    config: SchedulerConfig,
    state: SweepState,
    report_tx: Option<mpsc::UnboundedSender<SweepReport>>,
}

impl Scheduler {
    pub fn new(dispatcher: Dispatcher, config: SchedulerConfig) -> Self {
        Self {
            dispatcher,
            config,
            state: SweepState::default(),
            report_tx: None,
        }
    }

    /// Send a [`SweepReport`] after every sweep.
    pub fn with_report_channel(mut self, report_tx: mpsc::UnboundedSender<SweepReport>) -> Self {
        self.report_tx = Some(report_tx);
        self
    }

    pub fn state(&self) -> &SweepState {
        &self.state
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run one sweep as of `now`.
    ///
    /// Never fails as a whole: a user whose dispatch fails is counted in
    /// [`SweepReport::failed`] and the remaining users are still processed.
    pub async fn sweep_at(&mut self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::new(now);

        if self.state.reset_due(now, self.config.reset_hour_utc) {
            let store = self.dispatcher.store().as_ref();
            match reset_stale_flags(store, self.dispatcher.evaluator(), now).await {
                Ok(changed) => {
                    self.state.mark_reset(now);
                    report.reset_ran = true;
                    report.flags_reset = changed;
                }
                Err(e) => {
                    error!(error = %e, "daily reset failed, will retry next sweep");
                    report.failed += 1;
                }
            }
        }

        let users = match self.dispatcher.store().get_all().await {
            Ok(users) => users,
            Err(e) => {
                error!(error = %e, "cannot load users, skipping sweep");
                report.failed += 1;
                self.finish(report.clone());
                return report;
            }
        };

        let mut user_ids: Vec<&String> = users.keys().collect();
        user_ids.sort();

        let evaluator = *self.dispatcher.evaluator();
        for user_id in user_ids {
            let Some(record) = users.get(user_id) else {
                continue;
            };
            report.users_evaluated += 1;

            for job in evaluator.due_actions(record, now) {
                match self.dispatcher.dispatch(user_id, job, now).await {
                    Ok(DispatchOutcome::Sent) => report.sent += 1,
                    Ok(outcome) => {
                        debug!(
                            user_id = %user_id,
                            action = %job,
                            ?outcome,
                            "job dropped on re-check"
                        );
                        report.skipped += 1;
                    }
                    Err(e) => {
                        warn!(user_id = %user_id, action = %job, error = %e, "dispatch failed");
                        report.failed += 1;
                    }
                }
            }
        }

        self.finish(report.clone());
        report
    }

    fn finish(&mut self, report: SweepReport) {
        self.state.last_sweep = Some(report.started_at);
        if report.sent > 0 || report.failed > 0 || report.reset_ran {
            info!(
                users = report.users_evaluated,
                sent = report.sent,
                skipped = report.skipped,
                failed = report.failed,
                reset = report.reset_ran,
                "sweep complete"
            );
        } else {
            debug!(users = report.users_evaluated, "sweep complete, nothing due");
        }
        if let Some(tx) = &self.report_tx
            && tx.send(report).is_err()
        {
            debug!("sweep report channel closed");
            self.report_tx = None;
        }
    }

    /// Send a ping to `user_id` now, ignoring the due window.
    ///
    /// Unconfigured users are still skipped.
    ///
    /// # Errors
    ///
    /// Propagates delivery and persistence errors from the dispatcher.
    pub async fn trigger_ping(&self, user_id: &str, kind: CycleKind) -> Result<DispatchOutcome> {
        self.dispatcher.force_ping(user_id, kind, Utc::now()).await
    }

    /// Start the sweep loop. The first sweep runs immediately.
    ///
    /// The task ends when `cancel` is cancelled.
    pub fn run(mut self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let period = self.config.sweep_interval().max(MIN_SWEEP_INTERVAL);
            info!(
                interval_secs = period.as_secs(),
                window_minutes = self.dispatcher.evaluator().window_minutes(),
                reset_hour_utc = self.config.reset_hour_utc,
                "check-in scheduler started"
            );
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("check-in scheduler cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        self.sweep_at(Utc::now()).await;
                    }
                }
            }
        })
    }
}
