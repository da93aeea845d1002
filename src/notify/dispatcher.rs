//! Notification dispatch: send a ping or reminder, then record it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::messenger::Messenger;
use super::templates::{ping_message, reminder_message};
use crate::cycle::{Evaluator, Job};
use crate::error::{CheckinError, Result};
use crate::store::{Mutator, UserStore};
use crate::user::CycleKind;

/// Result of a single dispatch attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    /// Fresh state showed the job is no longer due.
    NotDue,
    Unconfigured,
    UnknownUser,
}

/// Sends notifications through a [`Messenger`] and records them in a
/// [`UserStore`].
///
/// Due-ness is re-checked against a fresh read immediately before sending,
/// and only the fields belonging to the job are written afterwards.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn UserStore>,
    messenger: Arc<dyn Messenger>,
    evaluator: Evaluator,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn UserStore>,
        messenger: Arc<dyn Messenger>,
        evaluator: Evaluator,
    ) -> Self {
        Self {
            store,
            messenger,
            evaluator,
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn messenger(&self) -> &Arc<dyn Messenger> {
        &self.messenger
    }

    /// Dispatch `job` for `user_id` if it is still due at `now`.
    ///
    /// # Errors
    ///
    /// [`CheckinError::Delivery`] when the channel cannot be resolved or the
    /// send fails (nothing is recorded), [`CheckinError::Persistence`] when
    /// the record cannot be read or the write-back fails.
    pub async fn dispatch(
        &self,
        user_id: &str,
        job: Job,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome> {
        self.deliver(user_id, job, now, false).await
    }

    /// Send a ping regardless of the due window.
    ///
    /// # Errors
    ///
    /// Same as [`dispatch`](Self::dispatch).
    pub async fn force_ping(
        &self,
        user_id: &str,
        kind: CycleKind,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome> {
        self.deliver(user_id, Job::ping(kind), now, true).await
    }

    async fn deliver(
        &self,
        user_id: &str,
        job: Job,
        now: DateTime<Utc>,
        force: bool,
    ) -> Result<DispatchOutcome> {
        let Some(record) = self.store.get(user_id).await? else {
            debug!(user_id, action = %job, "user no longer exists");
            return Ok(DispatchOutcome::UnknownUser);
        };
        let Some(channel_id) = record.channel_id.clone().filter(|_| record.is_configured()) else {
            debug!(user_id, action = %job, "user has no channel, skipping");
            return Ok(DispatchOutcome::Unconfigured);
        };
        if !force && !self.evaluator.is_due(&record, job, now) {
            debug!(user_id, action = %job, "no longer due, skipping");
            return Ok(DispatchOutcome::NotDue);
        }

        let Some(channel) = self.messenger.fetch_channel(&channel_id).await? else {
            warn!(user_id, channel_id = %channel_id, action = %job, "channel unavailable");
            return Err(CheckinError::Delivery(format!(
                "channel {channel_id} not found or not text-capable"
            )));
        };

        let kind = job.kind();
        let message = if job.is_reminder() {
            reminder_message(user_id, kind)
        } else {
            ping_message(user_id, kind, now, record.tz())
        };
        self.messenger.send(&channel, message).await?;

        let mutate: Mutator = if job.is_reminder() {
            Box::new(move |r| r.set_reminder_sent(kind, true))
        } else {
            Box::new(move |r| r.record_ping(kind, now))
        };
        self.store.update(user_id, mutate).await?;

        info!(user_id, kind = %kind, action = %job, forced = force, "notification sent");
        Ok(DispatchOutcome::Sent)
    }
}
