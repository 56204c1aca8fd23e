//! Domain model for teams, members, tasks and reassignment history.
//!
//! # Responsibility
//! - Define canonical data structures used by the workload engine.
//! - Keep derived load state (`MemberLoad`) separate from persisted records.
//!
//! # Invariants
//! - Every persisted object is identified by a stable UUID.
//! - Timestamps are Unix epoch milliseconds.

pub mod activity;
pub mod load;
pub mod task;
pub mod team;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in epoch milliseconds.
///
/// Clocks set before the epoch collapse to `0` instead of failing.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
