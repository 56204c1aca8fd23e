//! Core domain logic for team workload balancing.
//!
//! Counts each member's incomplete tasks, suggests assignees with spare
//! capacity, and rebalances overloaded members' tasks across their team.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{load_config, ConfigError, EngineConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::activity::{ActivityId, ActivityRecord};
pub use model::load::MemberLoad;
pub use model::task::{Task, TaskId, TaskPriority, TaskStatus, TaskValidationError};
pub use model::team::{ActorId, Member, MemberId, Project, ProjectId, Team, TeamId};
pub use repo::{
    ActivityRepository, AssigneeFilter, IncompleteTaskFilter, RepoError, RepoResult, SqliteStore,
    TaskListQuery, TaskRepository, TeamRepository, WorkloadStore,
};
pub use service::advisor::{pick_assignee, AssignmentCheck, OvercapacityWarning};
pub use service::error::WorkloadError;
pub use service::rebalancer::{RebalanceReport, REBALANCE_COMPLETED_MESSAGE};
pub use service::team_lock::TeamLockRegistry;
pub use service::workload_service::{
    AssigneeChoice, AssignmentOutcome, CreateTaskRequest, WorkloadService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
