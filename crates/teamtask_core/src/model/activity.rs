//! Reassignment audit records.
//!
//! # Invariants
//! - Records are append-only; nothing updates or deletes them.
//! - Member names are captured at write time so history survives renames.

use crate::model::task::{Task, TaskId};
use crate::model::team::{Member, MemberId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ActivityId = Uuid;

/// One task move performed by a rebalance pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub task_id: TaskId,
    pub task_title: String,
    pub from_member: MemberId,
    pub from_name: String,
    pub to_member: MemberId,
    pub to_name: String,
    pub message: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl ActivityRecord {
    /// Builds the record for moving `task` from `from` to `to` at `timestamp`.
    pub fn reassignment(task: &Task, from: &Member, to: &Member, timestamp: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id: task.id,
            task_title: task.title.clone(),
            from_member: from.id,
            from_name: from.name.clone(),
            to_member: to.id,
            to_name: to.name.clone(),
            message: reassignment_message(&task.title, &from.name, &to.name),
            timestamp,
        }
    }
}

/// Human-readable move description shown in the activity feed.
pub fn reassignment_message(task_title: &str, from_name: &str, to_name: &str) -> String {
    format!("Task \"{task_title}\" reassigned from {from_name} to {to_name}")
}
