//! Per-team mutual exclusion for rebalance passes.
//!
//! # Invariants
//! - At most one closure runs under `run_exclusive` per team at a time.
//! - Different teams never block each other.
//! - A panic inside a pass does not wedge the team: poisoned locks are
//!   recovered, since they guard no data.
//! - An entry lives only while some caller holds or waits on it; the last
//!   caller out removes it, so the map stays as small as the set of busy
//!   teams.

use crate::model::team::TeamId;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

static GLOBAL_REGISTRY: Lazy<Arc<TeamLockRegistry>> =
    Lazy::new(|| Arc::new(TeamLockRegistry::new()));

type TeamLock = Arc<Mutex<()>>;

/// Lazily created lock per team.
#[derive(Debug, Default)]
pub struct TeamLockRegistry {
    locks: Mutex<HashMap<TeamId, TeamLock>>,
}

impl TeamLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry shared by every service instance.
    pub fn global() -> Arc<TeamLockRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Runs `operation` while holding the lock for `team_id`.
    pub fn run_exclusive<T>(&self, team_id: TeamId, operation: impl FnOnce() -> T) -> T {
        let lease = Lease {
            registry: self,
            team_id,
            lock: self.acquire(team_id),
        };
        let _guard = lease.lock.lock().unwrap_or_else(PoisonError::into_inner);
        operation()
    }

    /// Returns whether some caller currently holds the lock for `team_id`.
    pub fn is_locked(&self, team_id: TeamId) -> bool {
        let Some(lock) = self.entries().get(&team_id).cloned() else {
            return false;
        };
        let locked = matches!(lock.try_lock(), Err(TryLockError::WouldBlock));
        locked
    }

    /// Number of teams with a live entry.
    pub fn tracked_teams(&self) -> usize {
        self.entries().len()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<TeamId, TeamLock>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire(&self, team_id: TeamId) -> TeamLock {
        Arc::clone(self.entries().entry(team_id).or_default())
    }

    fn release(&self, team_id: TeamId, lock: &TeamLock) {
        let mut entries = self.entries();
        let only_the_map_and_us = entries
            .get(&team_id)
            .is_some_and(|entry| Arc::ptr_eq(entry, lock) && Arc::strong_count(lock) == 2);
        if only_the_map_and_us {
            entries.remove(&team_id);
        }
    }
}

/// One caller's claim on a team entry; dropping it prunes the entry when
/// nobody else is holding or waiting.
struct Lease<'a> {
    registry: &'a TeamLockRegistry,
    team_id: TeamId,
    lock: TeamLock,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.registry.release(self.team_id, &self.lock);
    }
}
