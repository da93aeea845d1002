//! Recording completed check-ins and acknowledging them.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::submission::CheckInSubmission;
use crate::enrich::Decorator;
use crate::error::{CheckinError, Result};
use crate::notify::{ChannelHandle, MessageHandle, Messenger, OutboundMessage};
use crate::store::UserStore;
use crate::user::UserRecord;

/// The sent acknowledgment and its pending decoration task.
///
/// The task finishes on its own; awaiting it is only useful in tests.
#[derive(Debug)]
pub struct Acknowledgment {
    pub message: MessageHandle,
    pub decoration: JoinHandle<()>,
}

/// Records completed check-ins and acknowledges them.
#[derive(Clone)]
pub struct CheckInService {
    store: Arc<dyn UserStore>,
    messenger: Arc<dyn Messenger>,
    decorator: Arc<dyn Decorator>,
}

impl CheckInService {
    pub fn new(
        store: Arc<dyn UserStore>,
        messenger: Arc<dyn Messenger>,
        decorator: Arc<dyn Decorator>,
    ) -> Self {
        Self {
            store,
            messenger,
            decorator,
        }
    }

    /// Record the completion and clear the kind's reminder flag.
    ///
    /// Returns `Ok(None)` without writing when the user has no record.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Persistence`] if the write fails.
    pub async fn complete(&self, submission: &CheckInSubmission) -> Result<Option<UserRecord>> {
        let kind = submission.kind;
        let at = submission.timestamp;
        let record = self
            .store
            .update(&submission.user_id, Box::new(move |r| r.record_completion(kind, at)))
            .await?;
        match &record {
            Some(_) => info!(user_id = %submission.user_id, kind = %kind, "check-in recorded"),
            None => warn!(
                user_id = %submission.user_id,
                kind = %kind,
                "check-in from unknown user not recorded"
            ),
        }
        Ok(record)
    }

    /// Send the summary to `channel`, then decorate it in the background.
    ///
    /// The decoration edit happens after the summary is sent, if at all.
    /// Its failure is logged and never reaches the caller.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Delivery`] if the summary cannot be sent.
    pub async fn acknowledge(
        &self,
        channel: &ChannelHandle,
        submission: &CheckInSubmission,
    ) -> Result<Acknowledgment> {
        let message = self
            .messenger
            .send(channel, OutboundMessage::text(submission.summary()))
            .await?;

        let decoration = tokio::spawn(decorate(
            Arc::clone(&self.messenger),
            Arc::clone(&self.decorator),
            message.clone(),
            submission.clone(),
        ));
        Ok(Acknowledgment {
            message,
            decoration,
        })
    }

    /// Record `submission` and acknowledge it in `channel_id`.
    ///
    /// # Errors
    ///
    /// Persistence failures abort before anything is sent. A missing
    /// channel is a [`CheckinError::Delivery`].
    pub async fn submit(
        &self,
        channel_id: &str,
        submission: &CheckInSubmission,
    ) -> Result<Acknowledgment> {
        self.complete(submission).await?;
        let channel = self
            .messenger
            .fetch_channel(channel_id)
            .await?
            .ok_or_else(|| CheckinError::Delivery(format!("channel {channel_id} not found")))?;
        self.acknowledge(&channel, submission).await
    }
}

async fn decorate(
    messenger: Arc<dyn Messenger>,
    decorator: Arc<dyn Decorator>,
    message: MessageHandle,
    submission: CheckInSubmission,
) {
    let decoration = match decorator.generate(&submission.decoration_prompt()).await {
        Ok(Some(decoration)) => decoration,
        Ok(None) => {
            debug!(user_id = %submission.user_id, "no decoration produced");
            return;
        }
        Err(e) => {
            warn!(user_id = %submission.user_id, error = %e, "decoration failed");
            return;
        }
    };
    match messenger
        .edit(&message, submission.decorated_summary(&decoration))
        .await
    {
        Ok(()) => debug!(user_id = %submission.user_id, "acknowledgment decorated"),
        Err(e) => warn!(user_id = %submission.user_id, error = %e, "decoration edit failed"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::enrich::{DecorationPrompt, NoopDecorator};
    use crate::notify::MemoryMessenger;
    use crate::store::MemoryUserStore;
    use crate::user::CycleKind;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl Decorator for Fixed {
        async fn generate(&self, _prompt: &DecorationPrompt) -> Result<Option<String>> {
            Ok(self.0.map(str::to_owned))
        }
    }

    struct Failing;

    #[async_trait]
    impl Decorator for Failing {
        async fn generate(&self, _prompt: &DecorationPrompt) -> Result<Option<String>> {
            Err(CheckinError::Enrichment("quota".to_owned()))
        }
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 14, 5, 0).unwrap()
    }

    fn flagged_user() -> UserRecord {
        let mut record = UserRecord::new("u1");
        record.channel_id = Some("c1".to_owned());
        record.night_reminder_sent = true;
        record
    }

    fn submission(kind: CycleKind) -> CheckInSubmission {
        CheckInSubmission::from_form("u1", kind, ts(), "tea", "rest", None)
    }

    fn service(
        store: &MemoryUserStore,
        messenger: &MemoryMessenger,
        decorator: Arc<dyn Decorator>,
    ) -> CheckInService {
        CheckInService::new(Arc::new(store.clone()), Arc::new(messenger.clone()), decorator)
    }

    #[tokio::test]
    async fn complete_records_kind_and_clears_its_flag() {
        let store = MemoryUserStore::with_records([flagged_user()]);
        let svc = service(&store, &MemoryMessenger::new(), Arc::new(NoopDecorator));

        let record = svc.complete(&submission(CycleKind::Night)).await.unwrap().unwrap();
        assert_eq!(record.last_night_check_in, Some(ts()));
        assert!(!record.night_reminder_sent);
        assert_eq!(record.last_check_in, None);
    }

    #[tokio::test]
    async fn complete_for_unknown_user_writes_nothing() {
        let store = MemoryUserStore::new();
        let svc = service(&store, &MemoryMessenger::new(), Arc::new(NoopDecorator));
        assert!(svc.complete(&submission(CycleKind::Morning)).await.unwrap().is_none());
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn decoration_edits_after_summary() {
        let store = MemoryUserStore::with_records([flagged_user()]);
        let messenger = MemoryMessenger::new();
        let svc = service(&store, &messenger, Arc::new(Fixed(Some("🍵🌿🍵🌿🍵"))));

        let ack = svc.submit("c1", &submission(CycleKind::Morning)).await.unwrap();
        ack.decoration.await.unwrap();

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].message.text.contains("1. tea"));
        let edits = messenger.edits();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].0, ack.message);
        assert!(edits[0].1.starts_with("🍵🌿🍵🌿🍵\n\n**Daily Check-in Complete!**"));
    }

    #[tokio::test]
    async fn no_decoration_means_no_edit() {
        let store = MemoryUserStore::with_records([flagged_user()]);
        let messenger = MemoryMessenger::new();
        let svc = service(&store, &messenger, Arc::new(Fixed(None)));

        let ack = svc.submit("c1", &submission(CycleKind::Morning)).await.unwrap();
        ack.decoration.await.unwrap();
        assert!(messenger.edits().is_empty());
    }

    #[tokio::test]
    async fn decoration_failures_are_swallowed() {
        let store = MemoryUserStore::with_records([flagged_user()]);
        let messenger = MemoryMessenger::new();
        let svc = service(&store, &messenger, Arc::new(Failing));
        let ack = svc.submit("c1", &submission(CycleKind::Night)).await.unwrap();
        ack.decoration.await.unwrap();
        assert!(messenger.edits().is_empty());

        let failing_edits = MemoryMessenger::new().with_failing_edits();
        let svc = service(&store, &failing_edits, Arc::new(Fixed(Some("✨"))));
        let ack = svc.submit("c1", &submission(CycleKind::Night)).await.unwrap();
        ack.decoration.await.unwrap();
        assert_eq!(failing_edits.sent().len(), 1);
    }

    #[tokio::test]
    async fn missing_channel_fails_after_recording() {
        let store = MemoryUserStore::with_records([flagged_user()]);
        let messenger = MemoryMessenger::new().with_missing_channel("c1");
        let svc = service(&store, &messenger, Arc::new(NoopDecorator));

        let err = svc.submit("c1", &submission(CycleKind::Morning)).await.unwrap_err();
        assert!(matches!(err, CheckinError::Delivery(_)));
        assert_eq!(store.get("u1").await.unwrap().unwrap().last_check_in, Some(ts()));
    }
}
