//! Team, member and project records.
//!
//! # Invariants
//! - A member belongs to exactly one team.
//! - Member capacity is fixed at creation.

use crate::model::now_epoch_ms;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TeamId = Uuid;
pub type MemberId = Uuid;
pub type ProjectId = Uuid;

/// Identity of the caller acting on a team (the team creator in practice).
pub type ActorId = String;

/// A team owned by one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub owner: ActorId,
    pub created_at: i64,
}

impl Team {
    pub fn new(name: impl Into<String>, owner: impl Into<ActorId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner: owner.into(),
            created_at: now_epoch_ms(),
        }
    }

    /// Returns whether `actor` may mutate this team and its projects.
    pub fn is_owned_by(&self, actor: &str) -> bool {
        self.owner == actor
    }
}

/// A team member with a weekly task capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub team_id: TeamId,
    pub name: String,
    /// Free-text role label, e.g. "backend".
    pub role: String,
    /// Ceiling on simultaneously incomplete tasks.
    pub capacity: u32,
    pub created_at: i64,
}

impl Member {
    /// Creates a member record. Capacity bounds are checked by the service.
    pub fn new(
        team_id: TeamId,
        name: impl Into<String>,
        role: impl Into<String>,
        capacity: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_id,
            name: name.into(),
            role: role.into(),
            capacity,
            created_at: now_epoch_ms(),
        }
    }
}

/// A project grouping tasks under one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub team_id: TeamId,
    pub name: String,
    pub created_at: i64,
}

impl Project {
    pub fn new(team_id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_id,
            name: name.into(),
            created_at: now_epoch_ms(),
        }
    }
}
