//! Check-in scheduler.
//!
//! One recurring sweep re-evaluates every user against the current instant
//! and dispatches whatever is due, plus a once-a-day pass that clears stale
//! reminder flags.

pub mod reset;
pub mod runner;

pub use reset::reset_stale_flags;
pub use runner::{Scheduler, SweepReport, SweepState};
