//! Check-in submission intake.
//!
//! The form flow hands over a [`CheckInSubmission`]; [`CheckInService`]
//! records it, posts a summary, and decorates that summary in a detached
//! task.

pub mod service;
pub mod submission;

pub use service::{Acknowledgment, CheckInService};
pub use submission::{CheckInSubmission, split_lines};
