use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

/// Job file approval lifecycle. A file is created `pending`, reviewed into
/// `checked`, then finalized as `approved`; `rejected` is a terminal branch
/// reachable from either non-terminal state. Status never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Checked,
    Approved,
    Rejected,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Checked => "checked",
            JobStatus::Approved => "approved",
            JobStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "pending" => Ok(JobStatus::Pending),
            "checked" => Ok(JobStatus::Checked),
            "approved" => Ok(JobStatus::Approved),
            "rejected" => Ok(JobStatus::Rejected),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    // "checker" survives as a legacy alias for the same role.
    #[serde(alias = "checker")]
    Supervisor,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Supervisor => "supervisor",
            Role::Admin => "admin",
        }
    }

    pub fn is_reviewer(self) -> bool {
        matches!(self, Role::Supervisor | Role::Admin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "user" => Ok(Role::User),
            "supervisor" | "checker" => Ok(Role::Supervisor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Check,
    Approve,
    Reject,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Check => "check",
            Action::Approve => "approve",
            Action::Reject => "reject",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a permitted transition. Repeating the transition a file already
/// took is a no-op rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advance(JobStatus),
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("role {role} may not {action} job files")]
    RoleNotAllowed { role: Role, action: Action },
    #[error("cannot {action} a job file in status {from}")]
    InvalidState { from: JobStatus, action: Action },
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::RoleNotAllowed { .. } => AppError::forbidden(err.to_string()),
            TransitionError::InvalidState { .. } => AppError::conflict(err.to_string()),
        }
    }
}

/// Decides whether `role` may apply `action` to a file currently in `from`.
/// Role is judged before state so an unauthorized caller always sees 403, never
/// a hint about the file's current state.
pub fn transition(from: JobStatus, action: Action, role: Role) -> Result<Transition, TransitionError> {
    let allowed = match action {
        Action::Check => role.is_reviewer(),
        Action::Approve | Action::Reject => role == Role::Admin,
    };
    if !allowed {
        return Err(TransitionError::RoleNotAllowed { role, action });
    }

    match (action, from) {
        (Action::Check, JobStatus::Pending) => Ok(Transition::Advance(JobStatus::Checked)),
        (Action::Check, JobStatus::Checked) => Ok(Transition::NoOp),
        // Approval requires a prior check; a pending file cannot skip review.
        (Action::Approve, JobStatus::Checked) => Ok(Transition::Advance(JobStatus::Approved)),
        (Action::Approve, JobStatus::Approved) => Ok(Transition::NoOp),
        (Action::Reject, JobStatus::Pending) | (Action::Reject, JobStatus::Checked) => {
            Ok(Transition::Advance(JobStatus::Rejected))
        }
        (Action::Reject, JobStatus::Rejected) => Ok(Transition::NoOp),
        _ => Err(TransitionError::InvalidState { from, action }),
    }
}
