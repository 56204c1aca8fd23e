//! Assignment advisor: who should receive a task.
//!
//! # Invariants
//! - A suggestion never has `current_tasks >= capacity`.
//! - Among eligible members the lowest load wins, then the highest capacity,
//!   then snapshot order.
//! - An explicit assignment is refused once the member is at capacity
//!   (`count >= capacity`), which is one unit stricter than the snapshot's
//!   `is_overloaded` flag.

use crate::model::load::MemberLoad;
use crate::model::team::{Member, MemberId, TeamId};
use crate::repo::{TaskRepository, TeamRepository};
use crate::service::error::WorkloadError;
use crate::service::load::{member_load, team_load_snapshot};
use log::info;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Signal that a proposed assignee has no spare capacity.
///
/// Serializes as `{"kind":"overcapacity","warning":..,"memberId":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "overcapacity", rename_all = "camelCase")]
pub struct OvercapacityWarning {
    pub warning: String,
    pub member_id: MemberId,
    pub member_name: String,
    pub current_tasks: u32,
    pub capacity: u32,
}

impl OvercapacityWarning {
    pub fn from_load(load: &MemberLoad) -> Self {
        Self {
            warning: format!(
                "{} has {} tasks but capacity is {}. Assign anyway?",
                load.name, load.current_tasks, load.capacity
            ),
            member_id: load.member_id,
            member_name: load.name.clone(),
            current_tasks: load.current_tasks,
            capacity: load.capacity,
        }
    }
}

/// Result of checking an explicit assignee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentCheck {
    /// Member has room; carries the load observed at check time.
    Available(MemberLoad),
    Overcapacity(OvercapacityWarning),
}

/// Picks the best candidate from a load snapshot.
pub fn pick_assignee(loads: &[MemberLoad]) -> Option<&MemberLoad> {
    loads
        .iter()
        .filter(|load| !load.is_at_capacity())
        .min_by(|a, b| compare_candidates(a, b))
}

fn compare_candidates(a: &MemberLoad, b: &MemberLoad) -> Ordering {
    a.current_tasks
        .cmp(&b.current_tasks)
        .then_with(|| b.capacity.cmp(&a.capacity))
}

/// Suggests the member of `team_id` best placed to take a new task.
pub fn suggest_assignee<S>(store: &S, team_id: TeamId) -> Result<MemberLoad, WorkloadError>
where
    S: TeamRepository + TaskRepository + ?Sized,
{
    let snapshot = team_load_snapshot(store, team_id)?;
    match pick_assignee(&snapshot) {
        Some(load) => {
            info!(
                "event=suggest_assignee module=advisor status=ok team_id={team_id} member_id={} current_tasks={} capacity={}",
                load.member_id, load.current_tasks, load.capacity
            );
            Ok(load.clone())
        }
        None => {
            info!(
                "event=suggest_assignee module=advisor status=none team_id={team_id} members={}",
                snapshot.len()
            );
            Err(WorkloadError::NoAvailableMember(team_id))
        }
    }
}

/// Checks whether `member` may take one more task right now.
pub fn validate_assignment<S>(store: &S, member: &Member) -> Result<AssignmentCheck, WorkloadError>
where
    S: TaskRepository + ?Sized,
{
    let load = member_load(store, member)?;
    if load.is_at_capacity() {
        info!(
            "event=assignment_check module=advisor status=overcapacity member_id={} current_tasks={} capacity={}",
            member.id, load.current_tasks, load.capacity
        );
        return Ok(AssignmentCheck::Overcapacity(OvercapacityWarning::from_load(
            &load,
        )));
    }
    Ok(AssignmentCheck::Available(load))
}
