//! Service-level error taxonomy.
//!
//! Overcapacity is reported through `AssignmentOutcome::Overcapacity`,
//! not through this enum.

use crate::model::team::TeamId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors from workload use-cases.
#[derive(Debug)]
pub enum WorkloadError {
    /// Team, project, member or task is absent.
    NotFound { entity: &'static str, id: Uuid },
    /// Actor does not own the team the operation touches.
    NotAuthorized { actor: String, team_id: TeamId },
    /// Every member of the team is at or over capacity, or the team is empty.
    NoAvailableMember(TeamId),
    /// Request input is unusable.
    Validation(String),
    /// Storage failure.
    Repo(RepoError),
}

impl WorkloadError {
    /// Returns whether the caller caused the failure (as opposed to storage).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

impl Display for WorkloadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::NotAuthorized { actor, team_id } => {
                write!(f, "actor `{actor}` is not authorized for team {team_id}")
            }
            Self::NoAvailableMember(team_id) => {
                write!(f, "no member of team {team_id} has spare capacity")
            }
            Self::Validation(message) => write!(f, "invalid request: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkloadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for WorkloadError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            other => Self::Repo(other),
        }
    }
}
