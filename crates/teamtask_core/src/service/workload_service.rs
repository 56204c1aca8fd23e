//! Workload use-case service.
//!
//! # Responsibility
//! - Entry points for team setup, task creation with capacity checks,
//!   assignee suggestion and rebalance passes.
//! - Enforce team ownership before any mutation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Only rebalance passes write activity records.
//! - Rebalance passes for the same team never overlap within a process.

use crate::config::EngineConfig;
use crate::model::activity::ActivityRecord;
use crate::model::load::MemberLoad;
use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::model::team::{Member, MemberId, Project, ProjectId, Team, TeamId};
use crate::repo::{TaskListQuery, WorkloadStore};
use crate::service::advisor::{self, AssignmentCheck, OvercapacityWarning};
use crate::service::error::WorkloadError;
use crate::service::load;
use crate::service::rebalancer::{self, RebalanceReport};
use crate::service::team_lock::TeamLockRegistry;
use log::{info, warn};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Who should receive a new task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssigneeChoice {
    #[default]
    Unassigned,
    Member(MemberId),
    /// Resolve through the advisor's suggestion.
    Auto,
}

impl FromStr for AssigneeChoice {
    type Err = WorkloadError;

    /// Accepts `unassigned`, an empty string, `auto`, or a member UUID.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "unassigned" => Ok(Self::Unassigned),
            "auto" => Ok(Self::Auto),
            other => Uuid::parse_str(other).map(Self::Member).map_err(|_| {
                WorkloadError::Validation(format!("invalid assignee `{other}`"))
            }),
        }
    }
}

/// Input for creating one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub project_id: ProjectId,
    pub assigned_to: AssigneeChoice,
    /// Falls back to `EngineConfig::default_priority`.
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    /// Commit even when the explicit assignee is at capacity.
    pub force: bool,
}

impl CreateTaskRequest {
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            project_id,
            assigned_to: AssigneeChoice::Unassigned,
            priority: None,
            status: None,
            force: false,
        }
    }
}

/// Outcome of creating or re-pointing a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AssignmentOutcome {
    /// The task was written with its resolved assignee.
    Committed(Task),
    /// Nothing was written; the caller must force or pick someone else.
    Overcapacity(OvercapacityWarning),
}

/// Use-case service over any `WorkloadStore`.
pub struct WorkloadService<S: WorkloadStore> {
    store: S,
    config: EngineConfig,
    locks: Arc<TeamLockRegistry>,
}

impl<S: WorkloadStore> WorkloadService<S> {
    /// Creates a service sharing the process-wide rebalance locks.
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self::with_locks(store, config, TeamLockRegistry::global())
    }

    pub fn with_locks(store: S, config: EngineConfig, locks: Arc<TeamLockRegistry>) -> Self {
        Self {
            store,
            config,
            locks,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Creates a team owned by `actor`.
    pub fn create_team(&self, actor: &str, name: &str) -> Result<Team, WorkloadError> {
        let name = require_text("team name", name)?;
        let team = Team::new(name, actor);
        self.store.create_team(&team)?;
        info!("event=team_create module=service status=ok team_id={}", team.id);
        Ok(team)
    }

    /// Teams owned by `actor`, oldest first.
    pub fn list_teams(&self, actor: &str) -> Result<Vec<Team>, WorkloadError> {
        Ok(self.store.list_teams_for_owner(actor)?)
    }

    /// Adds a member after checking ownership and the capacity bound.
    pub fn add_member(
        &self,
        actor: &str,
        team_id: TeamId,
        name: &str,
        role: &str,
        capacity: u32,
    ) -> Result<Member, WorkloadError> {
        self.owned_team(actor, team_id)?;
        let name = require_text("member name", name)?;
        let role = require_text("member role", role)?;
        if !self.config.capacity_in_bounds(capacity) {
            return Err(WorkloadError::Validation(format!(
                "capacity {capacity} outside allowed range {}..={}",
                self.config.capacity_min, self.config.capacity_max
            )));
        }

        let member = Member::new(team_id, name, role, capacity);
        self.store.create_member(&member)?;
        info!(
            "event=member_add module=service status=ok team_id={team_id} member_id={} capacity={capacity}",
            member.id
        );
        Ok(member)
    }

    pub fn list_members(&self, team_id: TeamId) -> Result<Vec<Member>, WorkloadError> {
        self.team(team_id)?;
        Ok(self.store.list_members(team_id)?)
    }

    /// Creates a project under a team owned by `actor`.
    pub fn create_project(
        &self,
        actor: &str,
        team_id: TeamId,
        name: &str,
    ) -> Result<Project, WorkloadError> {
        self.owned_team(actor, team_id)?;
        let name = require_text("project name", name)?;
        let project = Project::new(team_id, name);
        self.store.create_project(&project)?;
        info!(
            "event=project_create module=service status=ok team_id={team_id} project_id={}",
            project.id
        );
        Ok(project)
    }

    /// Load snapshot for the team, least loaded first.
    pub fn team_load(&self, team_id: TeamId) -> Result<Vec<MemberLoad>, WorkloadError> {
        load::team_load_snapshot(&self.store, team_id)
    }

    /// Load entry for one member.
    pub fn member_load(&self, member_id: MemberId) -> Result<MemberLoad, WorkloadError> {
        let member = self.member(member_id)?;
        load::member_load(&self.store, &member)
    }

    /// Suggests the best assignee for a new task in `team_id`.
    pub fn suggest_assignee(&self, team_id: TeamId) -> Result<MemberLoad, WorkloadError> {
        advisor::suggest_assignee(&self.store, team_id)
    }

    /// Creates a task, resolving and capacity-checking its assignee.
    ///
    /// An explicit assignee at capacity yields
    /// `AssignmentOutcome::Overcapacity` and writes nothing, unless
    /// `request.force` is set.
    pub fn create_task(
        &self,
        actor: &str,
        request: &CreateTaskRequest,
    ) -> Result<AssignmentOutcome, WorkloadError> {
        let project = self.project(request.project_id)?;
        self.owned_team(actor, project.team_id)?;
        let title = require_text("task title", &request.title)?;

        let assignee = match request.assigned_to {
            AssigneeChoice::Unassigned => None,
            AssigneeChoice::Member(member_id) => {
                let member = self.team_member(project.team_id, member_id)?;
                if !request.force {
                    if let AssignmentCheck::Overcapacity(warning) =
                        advisor::validate_assignment(&self.store, &member)?
                    {
                        return Ok(AssignmentOutcome::Overcapacity(warning));
                    }
                } else {
                    warn!(
                        "event=task_create module=service status=forced member_id={member_id}"
                    );
                }
                Some(member.id)
            }
            AssigneeChoice::Auto => {
                Some(advisor::suggest_assignee(&self.store, project.team_id)?.member_id)
            }
        };

        let mut task = Task::new(project.id, title);
        task.description = request
            .description
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        task.priority = request.priority.unwrap_or(self.config.default_priority);
        task.status = request.status.unwrap_or_default();
        task.assigned_to = assignee;

        let task_id = self.store.create_task(&task)?;
        info!(
            "event=task_create module=service status=ok task_id={task_id} project_id={} assigned={}",
            project.id,
            assignee.is_some()
        );
        self.task(task_id).map(AssignmentOutcome::Committed)
    }

    /// Re-points an existing task; `None` unassigns it.
    ///
    /// Uses the same capacity check as `create_task`. Re-assigning a task to
    /// its current assignee is a no-op.
    pub fn assign_task(
        &self,
        actor: &str,
        task_id: TaskId,
        member_id: Option<MemberId>,
        force: bool,
    ) -> Result<AssignmentOutcome, WorkloadError> {
        let task = self.task(task_id)?;
        let project = self.project(task.project_id)?;
        self.owned_team(actor, project.team_id)?;

        let Some(member_id) = member_id else {
            let updated = self.store.set_task_assignee(task_id, None)?;
            return Ok(AssignmentOutcome::Committed(updated));
        };

        if task.assigned_to == Some(member_id) {
            return Ok(AssignmentOutcome::Committed(task));
        }

        let member = self.team_member(project.team_id, member_id)?;
        if !force && task.is_incomplete() {
            if let AssignmentCheck::Overcapacity(warning) =
                advisor::validate_assignment(&self.store, &member)?
            {
                return Ok(AssignmentOutcome::Overcapacity(warning));
            }
        }

        let updated = self.store.set_task_assignee(task_id, Some(member.id))?;
        info!(
            "event=task_assign module=service status=ok task_id={task_id} member_id={member_id} forced={force}"
        );
        Ok(AssignmentOutcome::Committed(updated))
    }

    pub fn update_task_status(
        &self,
        actor: &str,
        task_id: TaskId,
        status: TaskStatus,
    ) -> Result<Task, WorkloadError> {
        let task = self.task(task_id)?;
        let project = self.project(task.project_id)?;
        self.owned_team(actor, project.team_id)?;
        Ok(self.store.update_task_status(task_id, status)?)
    }

    pub fn delete_task(&self, actor: &str, task_id: TaskId) -> Result<(), WorkloadError> {
        let task = self.task(task_id)?;
        let project = self.project(task.project_id)?;
        self.owned_team(actor, project.team_id)?;
        self.store.delete_task(task_id)?;
        info!("event=task_delete module=service status=ok task_id={task_id}");
        Ok(())
    }

    /// Tasks matching `query`, newest first.
    pub fn list_tasks(&self, query: &TaskListQuery) -> Result<Vec<Task>, WorkloadError> {
        Ok(self.store.list_tasks(query)?)
    }

    /// Runs one rebalance pass for a team owned by `actor`.
    ///
    /// Holds the team's rebalance lock for the whole pass.
    pub fn reassign(&self, actor: &str, team_id: TeamId) -> Result<RebalanceReport, WorkloadError> {
        self.owned_team(actor, team_id)?;
        self.locks.run_exclusive(team_id, || {
            rebalancer::rebalance_team(&self.store, team_id, &self.config)
        })
    }

    /// Most recent activity records; `None` uses the configured display limit.
    pub fn recent_activity(&self, limit: Option<u32>) -> Result<Vec<ActivityRecord>, WorkloadError> {
        let limit = limit.unwrap_or(self.config.activity_display_limit);
        Ok(self.store.list_recent_activity(limit)?)
    }

    fn team(&self, team_id: TeamId) -> Result<Team, WorkloadError> {
        self.store
            .get_team(team_id)?
            .ok_or(WorkloadError::NotFound {
                entity: "team",
                id: team_id,
            })
    }

    fn owned_team(&self, actor: &str, team_id: TeamId) -> Result<Team, WorkloadError> {
        let team = self.team(team_id)?;
        if !team.is_owned_by(actor) {
            warn!("event=authorize module=service status=denied team_id={team_id}");
            return Err(WorkloadError::NotAuthorized {
                actor: actor.to_string(),
                team_id,
            });
        }
        Ok(team)
    }

    fn project(&self, project_id: ProjectId) -> Result<Project, WorkloadError> {
        self.store
            .get_project(project_id)?
            .ok_or(WorkloadError::NotFound {
                entity: "project",
                id: project_id,
            })
    }

    fn member(&self, member_id: MemberId) -> Result<Member, WorkloadError> {
        self.store
            .get_member(member_id)?
            .ok_or(WorkloadError::NotFound {
                entity: "member",
                id: member_id,
            })
    }

    fn team_member(&self, team_id: TeamId, member_id: MemberId) -> Result<Member, WorkloadError> {
        let member = self.member(member_id)?;
        if member.team_id != team_id {
            return Err(WorkloadError::Validation(format!(
                "member {member_id} does not belong to team {team_id}"
            )));
        }
        Ok(member)
    }

    fn task(&self, task_id: TaskId) -> Result<Task, WorkloadError> {
        self.store
            .get_task(task_id)?
            .ok_or(WorkloadError::NotFound {
                entity: "task",
                id: task_id,
            })
    }
}

fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, WorkloadError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkloadError::Validation(format!("{field} must not be blank")));
    }
    Ok(trimmed)
}
