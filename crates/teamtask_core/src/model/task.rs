//! Task domain model.
//!
//! # Responsibility
//! - Define the task record plus its priority and status enumerations.
//! - Validate task fields before persistence.
//!
//! # Invariants
//! - `title` is never blank.
//! - `TaskPriority` ordering is `Low < Medium < High`; eviction order relies
//!   on it, not on string comparison.
//! - `Done` tasks never count toward a member's load.

use crate::model::now_epoch_ms;
use crate::model::team::{MemberId, ProjectId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type TaskId = Uuid;

/// Task priority. Variant order is the eviction order during rebalancing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// Priorities the rebalancer may move off an overloaded member.
    pub const DRAINABLE: [TaskPriority; 2] = [TaskPriority::Low, TaskPriority::Medium];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    /// Accepts `in-progress`, `in_progress` and `inprogress`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in-progress" | "in_progress" | "inprogress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Returns whether the task still occupies its assignee's capacity.
    pub fn counts_toward_load(self) -> bool {
        self != Self::Done
    }
}

/// Validation failure for task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    BlankTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub project_id: ProjectId,
    /// `None` means unassigned.
    pub assigned_to: Option<MemberId>,
    /// Display name of the assignee, resolved on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    /// Creates a pending, unassigned, medium-priority task.
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            project_id,
            assigned_to: None,
            assignee_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        Ok(())
    }

    /// Returns whether this task counts toward its assignee's load.
    pub fn is_incomplete(&self) -> bool {
        self.status.counts_toward_load()
    }
}
