//! Task persistence and load queries.
//!
//! # Responsibility
//! - Provide CRUD APIs over `tasks`.
//! - Answer the load questions the engine asks: incomplete tasks per
//!   member and their count.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - "Incomplete" always means `status != 'done'`.
//! - Incomplete-task listings are returned in creation order (`rowid ASC`).

use crate::model::now_epoch_ms;
use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::model::team::{MemberId, ProjectId};
use crate::repo::{
    parse_optional_uuid, parse_uuid, u32_from_db, RepoError, RepoResult, SqliteStore,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};

const TASK_SELECT_SQL: &str = "SELECT
    t.uuid,
    t.title,
    t.description,
    t.priority,
    t.status,
    t.project_uuid,
    t.assignee_uuid,
    m.name AS assignee_name,
    t.created_at,
    t.updated_at
FROM tasks t
LEFT JOIN members m ON m.uuid = t.assignee_uuid";

/// Assignee filter for task listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssigneeFilter {
    #[default]
    Any,
    Unassigned,
    Member(MemberId),
}

/// Query options for listing tasks, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub project_id: Option<ProjectId>,
    pub assignee: AssigneeFilter,
}

/// Filter for incomplete (not `done`) tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncompleteTaskFilter {
    pub assigned_to: Option<MemberId>,
    /// `None` means every priority.
    pub priority_in: Option<Vec<TaskPriority>>,
}

/// Repository interface for task records.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn list_incomplete_tasks(&self, filter: &IncompleteTaskFilter) -> RepoResult<Vec<Task>>;
    fn count_incomplete_tasks(&self, member_id: MemberId) -> RepoResult<u32>;
    /// Points the task at `member_id` (or unassigns it) and returns the
    /// updated record.
    fn set_task_assignee(
        &self,
        task_id: TaskId,
        member_id: Option<MemberId>,
    ) -> RepoResult<Task>;
    fn update_task_status(&self, task_id: TaskId, status: TaskStatus) -> RepoResult<Task>;
    fn delete_task(&self, task_id: TaskId) -> RepoResult<()>;
}

impl TaskRepository for SqliteStore<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn().execute(
            "INSERT INTO tasks (
                uuid,
                title,
                description,
                priority,
                status,
                project_uuid,
                assignee_uuid,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                task.priority.as_str(),
                status_to_db(task.status),
                task.project_id.to_string(),
                task.assigned_to.map(|id| id.to_string()),
                task.created_at,
                task.updated_at,
            ],
        )?;

        Ok(task.id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{TASK_SELECT_SQL} WHERE t.uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(project_id) = query.project_id {
            sql.push_str(" AND t.project_uuid = ?");
            bind_values.push(Value::Text(project_id.to_string()));
        }

        match query.assignee {
            AssigneeFilter::Any => {}
            AssigneeFilter::Unassigned => sql.push_str(" AND t.assignee_uuid IS NULL"),
            AssigneeFilter::Member(member_id) => {
                sql.push_str(" AND t.assignee_uuid = ?");
                bind_values.push(Value::Text(member_id.to_string()));
            }
        }

        sql.push_str(" ORDER BY t.created_at DESC, t.rowid DESC");
        query_tasks(self, &sql, bind_values)
    }

    fn list_incomplete_tasks(&self, filter: &IncompleteTaskFilter) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE t.status != 'done'");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(member_id) = filter.assigned_to {
            sql.push_str(" AND t.assignee_uuid = ?");
            bind_values.push(Value::Text(member_id.to_string()));
        }

        if let Some(priorities) = filter.priority_in.as_ref() {
            if priorities.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = vec!["?"; priorities.len()].join(", ");
            sql.push_str(&format!(" AND t.priority IN ({placeholders})"));
            bind_values.extend(
                priorities
                    .iter()
                    .map(|priority| Value::Text(priority.as_str().to_string())),
            );
        }

        sql.push_str(" ORDER BY t.rowid ASC");
        query_tasks(self, &sql, bind_values)
    }

    fn count_incomplete_tasks(&self, member_id: MemberId) -> RepoResult<u32> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM tasks WHERE assignee_uuid = ?1 AND status != 'done';",
            [member_id.to_string()],
            |row| row.get(0),
        )?;
        u32_from_db(count, "COUNT(tasks)")
    }

    fn set_task_assignee(
        &self,
        task_id: TaskId,
        member_id: Option<MemberId>,
    ) -> RepoResult<Task> {
        let changed = self.conn().execute(
            "UPDATE tasks SET assignee_uuid = ?1, updated_at = ?2 WHERE uuid = ?3;",
            params![
                member_id.map(|id| id.to_string()),
                now_epoch_ms(),
                task_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("task", task_id));
        }

        read_back(self, task_id)
    }

    fn update_task_status(&self, task_id: TaskId, status: TaskStatus) -> RepoResult<Task> {
        let changed = self.conn().execute(
            "UPDATE tasks SET status = ?1, updated_at = ?2 WHERE uuid = ?3;",
            params![status_to_db(status), now_epoch_ms(), task_id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("task", task_id));
        }

        read_back(self, task_id)
    }

    fn delete_task(&self, task_id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [task_id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::not_found("task", task_id));
        }

        Ok(())
    }
}

fn read_back(store: &SqliteStore<'_>, task_id: TaskId) -> RepoResult<Task> {
    store
        .get_task(task_id)?
        .ok_or_else(|| RepoError::not_found("task", task_id))
}

fn query_tasks(
    store: &SqliteStore<'_>,
    sql: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<Task>> {
    let mut stmt = store.conn().prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        tasks.push(parse_task_row(row)?);
    }
    Ok(tasks)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid: String = row.get("uuid")?;
    let project_uuid: String = row.get("project_uuid")?;

    let priority_text: String = row.get("priority")?;
    let priority = TaskPriority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid priority `{priority_text}` in tasks.priority"))
    })?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in tasks.status"))
    })?;

    let task = Task {
        id: parse_uuid(&uuid, "tasks.uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority,
        status,
        project_id: parse_uuid(&project_uuid, "tasks.project_uuid")?,
        assigned_to: parse_optional_uuid(row.get("assignee_uuid")?, "tasks.assignee_uuid")?,
        assignee_name: row.get("assignee_name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    task.validate()?;
    Ok(task)
}

fn status_to_db(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Done => "done",
    }
}

fn parse_status(value: &str) -> Option<TaskStatus> {
    match value {
        "pending" => Some(TaskStatus::Pending),
        "in_progress" => Some(TaskStatus::InProgress),
        "done" => Some(TaskStatus::Done),
        _ => None,
    }
}
