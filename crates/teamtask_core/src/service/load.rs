//! Load accounting: how many incomplete tasks each member carries.
//!
//! # Invariants
//! - Load is recomputed from storage on every call; nothing is cached.
//! - Snapshots are ordered ascending by `current_tasks`; ties keep member
//!   insertion order (stable sort). The advisor and rebalancer depend on it.

use crate::model::load::MemberLoad;
use crate::model::team::{Member, MemberId, TeamId};
use crate::repo::{TaskRepository, TeamRepository};
use crate::service::error::WorkloadError;

/// Number of non-done tasks assigned to `member_id`.
pub fn count_member_load<S>(store: &S, member_id: MemberId) -> Result<u32, WorkloadError>
where
    S: TaskRepository + ?Sized,
{
    Ok(store.count_incomplete_tasks(member_id)?)
}

/// Load entry for one member.
pub fn member_load<S>(store: &S, member: &Member) -> Result<MemberLoad, WorkloadError>
where
    S: TaskRepository + ?Sized,
{
    let current = count_member_load(store, member.id)?;
    Ok(MemberLoad::new(member, current))
}

/// Every member of the team paired with its load, least loaded first.
pub fn team_members_with_load<S>(
    store: &S,
    team_id: TeamId,
) -> Result<Vec<(Member, MemberLoad)>, WorkloadError>
where
    S: TeamRepository + TaskRepository + ?Sized,
{
    if store.get_team(team_id)?.is_none() {
        return Err(WorkloadError::NotFound {
            entity: "team",
            id: team_id,
        });
    }

    let mut entries = Vec::new();
    for member in store.list_members(team_id)? {
        let load = member_load(store, &member)?;
        entries.push((member, load));
    }
    entries.sort_by_key(|(_, load)| load.current_tasks);
    Ok(entries)
}

/// Load snapshot for the whole team, least loaded first.
pub fn team_load_snapshot<S>(store: &S, team_id: TeamId) -> Result<Vec<MemberLoad>, WorkloadError>
where
    S: TeamRepository + TaskRepository + ?Sized,
{
    Ok(team_members_with_load(store, team_id)?
        .into_iter()
        .map(|(_, load)| load)
        .collect())
}
