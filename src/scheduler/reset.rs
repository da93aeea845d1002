//! Daily reminder-flag reset.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::cycle::Evaluator;
use crate::error::Result;
use crate::store::UserStore;
use crate::user::CycleKind;

/// Clear `reminderSent`/`nightReminderSent` for every user whose last ping
/// was not on their current local date and belongs to an earlier cycle.
///
/// Each user is re-checked against the freshly read record inside the
/// mutation, so a ping landing concurrently keeps its flag. A failed write
/// for one user is logged and the pass continues. Returns the number of
/// users with at least one flag actually cleared.
///
/// # Errors
///
/// Returns an error only if the collection cannot be loaded.
pub async fn reset_stale_flags(
    store: &dyn UserStore,
    evaluator: &Evaluator,
    now: DateTime<Utc>,
) -> Result<usize> {
    let users = store.get_all().await?;
    let mut changed = 0;

    for (user_id, record) in users {
        let stale: Vec<CycleKind> = CycleKind::ALL
            .into_iter()
            .filter(|kind| evaluator.needs_flag_reset(&record, *kind, now))
            .collect();
        if stale.is_empty() {
            continue;
        }

        let cleared = Arc::new(AtomicBool::new(false));
        let cleared_in = Arc::clone(&cleared);
        let evaluator = *evaluator;
        let result = store
            .update(
                &user_id,
                Box::new(move |r| {
                    for kind in stale {
                        if evaluator.needs_flag_reset(r, kind, now) {
                            r.set_reminder_sent(kind, false);
                            cleared_in.store(true, Ordering::Relaxed);
                        }
                    }
                }),
            )
            .await;
        match result {
            Ok(Some(_)) if cleared.load(Ordering::Relaxed) => {
                debug!(user_id = %user_id, "stale reminder flags cleared");
                changed += 1;
            }
            Ok(_) => {}
            Err(e) => error!(user_id = %user_id, error = %e, "failed to reset reminder flags"),
        }
    }

    info!(users = changed, "daily reminder flag reset complete");
    Ok(changed)
}
