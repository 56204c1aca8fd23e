//! Rebalancer: moves low/medium tasks off members at capacity.
//!
//! # Responsibility
//! - Partition a team snapshot into sources (at or over capacity) and
//!   targets (below capacity).
//! - Greedily drain each source's drainable tasks into the least loaded
//!   target, recording one activity entry per move. A source is drained
//!   until its tasks or the target queue run out, or, with
//!   `stop_when_relieved`, until it drops below capacity.
//!
//! # Invariants
//! - `high` priority tasks never move.
//! - A move never pushes a target past its capacity.
//! - Within a source, `low` tasks are evicted before `medium`; creation
//!   order breaks ties.
//! - Each move commits the assignee change before appending its activity
//!   record. A failed append leaves the move in place and aborts the pass.

use crate::config::EngineConfig;
use crate::model::activity::ActivityRecord;
use crate::model::load::MemberLoad;
use crate::model::now_epoch_ms;
use crate::model::task::TaskPriority;
use crate::model::team::{Member, TeamId};
use crate::repo::{IncompleteTaskFilter, WorkloadStore};
use crate::service::error::WorkloadError;
use crate::service::load::team_members_with_load;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const REBALANCE_COMPLETED_MESSAGE: &str = "Reassignment completed";

/// Summary of one rebalance pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceReport {
    pub message: String,
    pub moved_count: u32,
    /// Records written by this pass, newest first, capped for display.
    pub logs: Vec<ActivityRecord>,
}

/// A member that can still receive tasks, with its live tracked load.
#[derive(Debug, Clone)]
struct Target {
    member: Member,
    current_tasks: u32,
}

impl Target {
    fn is_full(&self) -> bool {
        self.current_tasks >= self.member.capacity
    }
}

/// Least-loaded-first queue of targets.
///
/// Built once from the snapshot and consumed from the head: a head that
/// fills up is popped, never re-sorted.
#[derive(Debug, Default)]
struct TargetQueue {
    entries: VecDeque<Target>,
}

impl TargetQueue {
    fn new(mut targets: Vec<Target>) -> Self {
        targets.sort_by_key(|target| target.current_tasks);
        Self {
            entries: targets.into(),
        }
    }

    /// Drops full heads and returns the member that should receive the
    /// next task.
    fn next_target(&mut self) -> Option<&Member> {
        while self.entries.front().is_some_and(Target::is_full) {
            self.entries.pop_front();
        }
        self.entries.front().map(|target| &target.member)
    }

    /// Counts one task against the head and pops it once full.
    fn record_move(&mut self) {
        if let Some(head) = self.entries.front_mut() {
            head.current_tasks += 1;
            if head.is_full() {
                self.entries.pop_front();
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Splits a snapshot into sources and targets, preserving snapshot order.
fn partition(entries: Vec<(Member, MemberLoad)>) -> (Vec<(Member, MemberLoad)>, Vec<Target>) {
    let mut sources = Vec::new();
    let mut targets = Vec::new();
    for (member, load) in entries {
        if load.is_at_capacity() {
            sources.push((member, load));
        } else {
            targets.push(Target {
                member,
                current_tasks: load.current_tasks,
            });
        }
    }
    (sources, targets)
}

/// Runs one rebalance pass over `team_id`.
///
/// The caller is responsible for holding the team's rebalance lock.
pub fn rebalance_team<S>(
    store: &S,
    team_id: TeamId,
    config: &EngineConfig,
) -> Result<RebalanceReport, WorkloadError>
where
    S: WorkloadStore + ?Sized,
{
    let snapshot = team_members_with_load(store, team_id)?;
    let (sources, targets) = partition(snapshot);
    info!(
        "event=rebalance module=rebalancer status=start team_id={team_id} sources={} targets={}",
        sources.len(),
        targets.len()
    );

    let mut queue = TargetQueue::new(targets);
    let mut records: Vec<ActivityRecord> = Vec::new();

    for (source, load) in &sources {
        let mut source_load = load.current_tasks;
        let mut drainable = store.list_incomplete_tasks(&IncompleteTaskFilter {
            assigned_to: Some(source.id),
            priority_in: Some(TaskPriority::DRAINABLE.to_vec()),
        })?;
        drainable.sort_by_key(|task| task.priority);

        for task in drainable {
            if config.stop_when_relieved && source_load < source.capacity {
                break;
            }
            let Some(target) = queue.next_target().cloned() else {
                debug!(
                    "event=rebalance_drain module=rebalancer status=no_target team_id={team_id} member_id={}",
                    source.id
                );
                break;
            };

            store.set_task_assignee(task.id, Some(target.id))?;
            queue.record_move();
            source_load = source_load.saturating_sub(1);

            let record = ActivityRecord::reassignment(&task, source, &target, now_epoch_ms());
            let stored = store.append_activity_record(&record)?;
            debug!(
                "event=rebalance_move module=rebalancer status=ok task_id={} from={} to={}",
                task.id, source.id, target.id
            );
            records.push(stored);
        }
    }

    let moved_count = u32::try_from(records.len()).unwrap_or(u32::MAX);
    info!(
        "event=rebalance module=rebalancer status=ok team_id={team_id} moved={moved_count}"
    );

    let display_limit = usize::try_from(config.activity_display_limit).unwrap_or(usize::MAX);
    let logs = records.into_iter().rev().take(display_limit).collect();

    Ok(RebalanceReport {
        message: REBALANCE_COMPLETED_MESSAGE.to_string(),
        moved_count,
        logs,
    })
}
