#![allow(dead_code)]

use rusqlite::Connection;
use std::sync::Arc;
use teamtask_core::db::open_db_in_memory;
use teamtask_core::{
    AssigneeChoice, AssignmentOutcome, CreateTaskRequest, EngineConfig, Member, Project,
    SqliteStore, Task, TaskPriority, TaskStatus, Team, TeamLockRegistry, WorkloadService,
};

pub const OWNER: &str = "owner";

pub fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

pub fn service(conn: &Connection) -> WorkloadService<SqliteStore<'_>> {
    service_with(conn, EngineConfig::default())
}

pub fn service_with(conn: &Connection, config: EngineConfig) -> WorkloadService<SqliteStore<'_>> {
    WorkloadService::with_locks(
        SqliteStore::new(conn),
        config,
        Arc::new(TeamLockRegistry::new()),
    )
}

pub fn team_with_project(service: &WorkloadService<SqliteStore<'_>>) -> (Team, Project) {
    let team = service.create_team(OWNER, "Platform").unwrap();
    let project = service.create_project(OWNER, team.id, "Launch").unwrap();
    (team, project)
}

pub fn member(
    service: &WorkloadService<SqliteStore<'_>>,
    team: &Team,
    name: &str,
    capacity: u32,
) -> Member {
    service
        .add_member(OWNER, team.id, name, "engineer", capacity)
        .unwrap()
}

/// Creates a task for `member`, bypassing the capacity check.
pub fn forced_task(
    service: &WorkloadService<SqliteStore<'_>>,
    project: &Project,
    member: &Member,
    title: &str,
    priority: TaskPriority,
) -> Task {
    let request = CreateTaskRequest {
        assigned_to: AssigneeChoice::Member(member.id),
        priority: Some(priority),
        force: true,
        ..CreateTaskRequest::new(project.id, title)
    };
    committed(service.create_task(OWNER, &request).unwrap())
}

pub fn done_task(
    service: &WorkloadService<SqliteStore<'_>>,
    project: &Project,
    member: &Member,
    title: &str,
) -> Task {
    let request = CreateTaskRequest {
        assigned_to: AssigneeChoice::Member(member.id),
        status: Some(TaskStatus::Done),
        force: true,
        ..CreateTaskRequest::new(project.id, title)
    };
    committed(service.create_task(OWNER, &request).unwrap())
}

pub fn committed(outcome: AssignmentOutcome) -> Task {
    match outcome {
        AssignmentOutcome::Committed(task) => task,
        AssignmentOutcome::Overcapacity(warning) => {
            panic!("expected committed task, got overcapacity: {}", warning.warning)
        }
    }
}

pub fn load_of(service: &WorkloadService<SqliteStore<'_>>, member: &Member) -> u32 {
    service.member_load(member.id).unwrap().current_tasks
}
