//! Integration test binary. All integration tests share one binary to keep
//! link times down.
//!
//! Layout: <https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html>

// Allow unwrap/expect in test code
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod helpers;

mod checkin_flow;
mod config_roundtrip;
mod daily_cycle;
mod file_store;
