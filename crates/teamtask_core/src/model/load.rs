//! Derived per-member load state.
//!
//! `MemberLoad` is recomputed from storage on every request and never
//! persisted.
//!
//! # Invariants
//! - `is_overloaded == (current_tasks > capacity)`.
//! - `is_at_capacity() == (current_tasks >= capacity)`; assignment checks and
//!   rebalance partitioning use this threshold.

use crate::model::team::{Member, MemberId};
use serde::{Deserialize, Serialize};

/// One member's load snapshot entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberLoad {
    pub member_id: MemberId,
    pub name: String,
    pub role: String,
    pub capacity: u32,
    pub current_tasks: u32,
    pub is_overloaded: bool,
}

impl MemberLoad {
    pub fn new(member: &Member, current_tasks: u32) -> Self {
        Self {
            member_id: member.id,
            name: member.name.clone(),
            role: member.role.clone(),
            capacity: member.capacity,
            current_tasks,
            is_overloaded: current_tasks > member.capacity,
        }
    }

    pub fn is_at_capacity(&self) -> bool {
        self.current_tasks >= self.capacity
    }
}
