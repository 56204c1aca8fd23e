//! Team, member and project persistence.
//!
//! # Invariants
//! - `list_members` returns members in insertion order; load snapshots use
//!   it as their tie-break.
//! - Members are never updated in place.

use crate::model::team::{Member, MemberId, Project, ProjectId, Team, TeamId};
use crate::repo::{parse_uuid, u32_from_db, RepoError, RepoResult, SqliteStore};
use rusqlite::{params, OptionalExtension, Row};

/// Repository interface for team structure records.
pub trait TeamRepository {
    fn create_team(&self, team: &Team) -> RepoResult<TeamId>;
    fn get_team(&self, id: TeamId) -> RepoResult<Option<Team>>;
    /// Teams owned by `owner`, oldest first.
    fn list_teams_for_owner(&self, owner: &str) -> RepoResult<Vec<Team>>;
    fn create_member(&self, member: &Member) -> RepoResult<MemberId>;
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    /// Members of `team_id` in insertion order.
    fn list_members(&self, team_id: TeamId) -> RepoResult<Vec<Member>>;
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
}

const MEMBER_SELECT_SQL: &str = "SELECT uuid, team_uuid, name, role, capacity, created_at
FROM members";

impl TeamRepository for SqliteStore<'_> {
    fn create_team(&self, team: &Team) -> RepoResult<TeamId> {
        self.conn().execute(
            "INSERT INTO teams (uuid, name, owner, created_at) VALUES (?1, ?2, ?3, ?4);",
            params![
                team.id.to_string(),
                team.name.as_str(),
                team.owner.as_str(),
                team.created_at,
            ],
        )?;
        Ok(team.id)
    }

    fn get_team(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let row = self
            .conn()
            .query_row(
                "SELECT uuid, name, owner, created_at FROM teams WHERE uuid = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, String>("name")?,
                        row.get::<_, String>("owner")?,
                        row.get::<_, i64>("created_at")?,
                    ))
                },
            )
            .optional()?;

        row.map(|(uuid, name, owner, created_at)| {
            Ok(Team {
                id: parse_uuid(&uuid, "teams.uuid")?,
                name,
                owner,
                created_at,
            })
        })
        .transpose()
    }

    fn list_teams_for_owner(&self, owner: &str) -> RepoResult<Vec<Team>> {
        let mut stmt = self.conn().prepare(
            "SELECT uuid, name, owner, created_at
             FROM teams
             WHERE owner = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([owner])?;
        let mut teams = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid: String = row.get("uuid")?;
            teams.push(Team {
                id: parse_uuid(&uuid, "teams.uuid")?,
                name: row.get("name")?,
                owner: row.get("owner")?,
                created_at: row.get("created_at")?,
            });
        }
        Ok(teams)
    }

    fn create_member(&self, member: &Member) -> RepoResult<MemberId> {
        if self.get_team(member.team_id)?.is_none() {
            return Err(RepoError::not_found("team", member.team_id));
        }

        self.conn().execute(
            "INSERT INTO members (uuid, team_uuid, name, role, capacity, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                member.id.to_string(),
                member.team_id.to_string(),
                member.name.as_str(),
                member.role.as_str(),
                i64::from(member.capacity),
                member.created_at,
            ],
        )?;
        Ok(member.id)
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn list_members(&self, team_id: TeamId) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn().prepare(&format!(
            "{MEMBER_SELECT_SQL} WHERE team_uuid = ?1 ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([team_id.to_string()])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        if self.get_team(project.team_id)?.is_none() {
            return Err(RepoError::not_found("team", project.team_id));
        }

        self.conn().execute(
            "INSERT INTO projects (uuid, team_uuid, name, created_at) VALUES (?1, ?2, ?3, ?4);",
            params![
                project.id.to_string(),
                project.team_id.to_string(),
                project.name.as_str(),
                project.created_at,
            ],
        )?;
        Ok(project.id)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self.conn().prepare(
            "SELECT uuid, team_uuid, name, created_at FROM projects WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let uuid: String = row.get("uuid")?;
            let team_uuid: String = row.get("team_uuid")?;
            return Ok(Some(Project {
                id: parse_uuid(&uuid, "projects.uuid")?,
                team_id: parse_uuid(&team_uuid, "projects.team_uuid")?,
                name: row.get("name")?,
                created_at: row.get("created_at")?,
            }));
        }
        Ok(None)
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let uuid: String = row.get("uuid")?;
    let team_uuid: String = row.get("team_uuid")?;
    Ok(Member {
        id: parse_uuid(&uuid, "members.uuid")?,
        team_id: parse_uuid(&team_uuid, "members.team_uuid")?,
        name: row.get("name")?,
        role: row.get("role")?,
        capacity: u32_from_db(row.get("capacity")?, "members.capacity")?,
        created_at: row.get("created_at")?,
    })
}
