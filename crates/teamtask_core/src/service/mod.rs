//! Core use-case services.
//!
//! # Responsibility
//! - Load accounting, assignment advice and rebalance passes over a
//!   `WorkloadStore`.
//! - Keep CLI callers decoupled from storage details.

pub mod advisor;
pub mod error;
pub mod load;
pub mod rebalancer;
pub mod team_lock;
pub mod workload_service;
