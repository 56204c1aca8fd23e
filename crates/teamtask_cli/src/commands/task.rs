//! Task commands, including capacity-checked assignment.

use super::{CommandOutput, Session};
use anyhow::{anyhow, Result};
use clap::Args;
use teamtask_core::{
    AssigneeChoice, AssigneeFilter, AssignmentOutcome, CreateTaskRequest, MemberId, ProjectId,
    TaskId, TaskListQuery, TaskPriority, TaskStatus,
};

#[derive(Args, Debug)]
pub struct CreateTaskArgs {
    /// Project id
    #[arg(long)]
    project: ProjectId,
    /// Task title
    #[arg(long)]
    title: String,
    /// Optional longer description
    #[arg(long)]
    description: Option<String>,
    /// low|medium|high (defaults to the configured priority)
    #[arg(long, value_parser = parse_priority)]
    priority: Option<TaskPriority>,
    /// pending|in-progress|done
    #[arg(long, value_parser = parse_status)]
    status: Option<TaskStatus>,
    /// unassigned, auto, or a member id
    #[arg(long, default_value = "unassigned")]
    assign: AssigneeChoice,
    /// Assign even when the member is at capacity
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug)]
pub struct AssignTaskArgs {
    /// Task id
    #[arg(long)]
    task: TaskId,
    /// New assignee
    #[arg(long, conflicts_with = "unassign", required_unless_present = "unassign")]
    member: Option<MemberId>,
    /// Clear the assignee
    #[arg(long)]
    unassign: bool,
    /// Assign even when the member is at capacity
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug)]
pub struct SetStatusArgs {
    /// Task id
    #[arg(long)]
    task: TaskId,
    /// pending|in-progress|done
    #[arg(long, value_parser = parse_status)]
    status: TaskStatus,
}

#[derive(Args, Debug)]
pub struct ListTasksArgs {
    /// Only tasks in this project
    #[arg(long)]
    project: Option<ProjectId>,
    /// A member id, or `unassigned`
    #[arg(long)]
    member: Option<String>,
}

pub fn create_task(session: &Session, args: CreateTaskArgs) -> Result<CommandOutput> {
    let request = CreateTaskRequest {
        title: args.title,
        description: args.description,
        project_id: args.project,
        assigned_to: args.assign,
        priority: args.priority,
        status: args.status,
        force: args.force,
    };
    let outcome = session.service().create_task(session.actor(), &request)?;
    render_outcome(&outcome)
}

pub fn assign_task(session: &Session, args: AssignTaskArgs) -> Result<CommandOutput> {
    let member = if args.unassign { None } else { args.member };
    let outcome = session
        .service()
        .assign_task(session.actor(), args.task, member, args.force)?;
    render_outcome(&outcome)
}

pub fn set_status(session: &Session, args: SetStatusArgs) -> Result<CommandOutput> {
    let task = session
        .service()
        .update_task_status(session.actor(), args.task, args.status)?;
    CommandOutput::json(&task)
}

pub fn list_tasks(session: &Session, args: ListTasksArgs) -> Result<CommandOutput> {
    let assignee = match args.member.as_deref() {
        None => AssigneeFilter::Any,
        Some("unassigned") => AssigneeFilter::Unassigned,
        Some(value) => AssigneeFilter::Member(
            value
                .parse()
                .map_err(|_| anyhow!("invalid member id `{value}`"))?,
        ),
    };
    let tasks = session.service().list_tasks(&TaskListQuery {
        project_id: args.project,
        assignee,
    })?;
    CommandOutput::json(&tasks)
}

fn render_outcome(outcome: &AssignmentOutcome) -> Result<CommandOutput> {
    match outcome {
        AssignmentOutcome::Committed(task) => CommandOutput::json(task),
        AssignmentOutcome::Overcapacity(warning) => CommandOutput::overcapacity(warning),
    }
}

fn parse_priority(value: &str) -> Result<TaskPriority, String> {
    TaskPriority::parse(value).ok_or_else(|| format!("unknown priority `{value}`"))
}

fn parse_status(value: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(value).ok_or_else(|| format!("unknown status `{value}`"))
}
