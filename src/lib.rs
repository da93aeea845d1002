//! Checkin: per-user morning and night check-in reminders for a chat bot.
//!
//! Each user has a timezone, a morning and night check-in time, and a
//! reminder delay. A periodic sweep decides for every user whether a ping or
//! a follow-up reminder is due and sends it.
//!
//! # Architecture
//!
//! - **Store** (`store`): user records behind a read-modify-write trait,
//!   backed by a single JSON file
//! - **Cycle evaluator** (`cycle`): pure due-ness and completion decisions
//! - **Scheduler** (`scheduler`): the sweep loop and the daily flag reset
//! - **Dispatcher** (`notify`): sends through a `Messenger` and records the
//!   result
//! - **Intake** (`checkin`, `enrich`): records completions and decorates the
//!   acknowledgment in the background

pub mod checkin;
pub mod config;
pub mod cycle;
pub mod enrich;
pub mod error;
pub mod notify;
pub mod paths;
pub mod profile;
pub mod scheduler;
pub mod store;
pub mod user;

pub use config::BotConfig;
pub use error::{CheckinError, Result};
pub use scheduler::Scheduler;
