//! Append-only activity log persistence.
//!
//! # Invariants
//! - Records are inserted once and never updated.
//! - Listings are newest first by insertion sequence, so records written in
//!   the same millisecond still come back in a stable order.

use crate::model::activity::{ActivityRecord, ActivityId};
use crate::model::task::TaskId;
use crate::repo::{parse_uuid, RepoError, RepoResult, SqliteStore};
use rusqlite::{params, Row};

const ACTIVITY_SELECT_SQL: &str = "SELECT
    uuid,
    task_uuid,
    task_title,
    from_member_uuid,
    from_name,
    to_member_uuid,
    to_name,
    message,
    created_at
FROM activity_log";

/// Repository interface for reassignment history.
pub trait ActivityRepository {
    fn append_activity_record(&self, record: &ActivityRecord) -> RepoResult<ActivityRecord>;
    /// Most recent records first, at most `limit`.
    fn list_recent_activity(&self, limit: u32) -> RepoResult<Vec<ActivityRecord>>;
    /// Every record for one task, most recent first.
    fn list_activity_for_task(&self, task_id: TaskId) -> RepoResult<Vec<ActivityRecord>>;
}

impl ActivityRepository for SqliteStore<'_> {
    fn append_activity_record(&self, record: &ActivityRecord) -> RepoResult<ActivityRecord> {
        self.conn().execute(
            "INSERT INTO activity_log (
                uuid,
                task_uuid,
                task_title,
                from_member_uuid,
                from_name,
                to_member_uuid,
                to_name,
                message,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                record.id.to_string(),
                record.task_id.to_string(),
                record.task_title.as_str(),
                record.from_member.to_string(),
                record.from_name.as_str(),
                record.to_member.to_string(),
                record.to_name.as_str(),
                record.message.as_str(),
                record.timestamp,
            ],
        )?;

        get_activity(self, record.id)
    }

    fn list_recent_activity(&self, limit: u32) -> RepoResult<Vec<ActivityRecord>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{ACTIVITY_SELECT_SQL} ORDER BY seq DESC LIMIT ?1;"))?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_activity_row(row)?);
        }
        Ok(records)
    }

    fn list_activity_for_task(&self, task_id: TaskId) -> RepoResult<Vec<ActivityRecord>> {
        let mut stmt = self.conn().prepare(&format!(
            "{ACTIVITY_SELECT_SQL} WHERE task_uuid = ?1 ORDER BY seq DESC;"
        ))?;
        let mut rows = stmt.query([task_id.to_string()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_activity_row(row)?);
        }
        Ok(records)
    }
}

fn get_activity(store: &SqliteStore<'_>, id: ActivityId) -> RepoResult<ActivityRecord> {
    let mut stmt = store
        .conn()
        .prepare(&format!("{ACTIVITY_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => parse_activity_row(row),
        None => Err(RepoError::not_found("activity record", id)),
    }
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<ActivityRecord> {
    let uuid: String = row.get("uuid")?;
    let task_uuid: String = row.get("task_uuid")?;
    let from_uuid: String = row.get("from_member_uuid")?;
    let to_uuid: String = row.get("to_member_uuid")?;

    Ok(ActivityRecord {
        id: parse_uuid(&uuid, "activity_log.uuid")?,
        task_id: parse_uuid(&task_uuid, "activity_log.task_uuid")?,
        task_title: row.get("task_title")?,
        from_member: parse_uuid(&from_uuid, "activity_log.from_member_uuid")?,
        from_name: row.get("from_name")?,
        to_member: parse_uuid(&to_uuid, "activity_log.to_member_uuid")?,
        to_name: row.get("to_name")?,
        message: row.get("message")?,
        timestamp: row.get("created_at")?,
    })
}
