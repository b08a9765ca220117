use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationStatus};

/// How strictly status writes are checked against the application lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any status may overwrite any other.
    #[default]
    Permissive,
    /// Only `applied -> {shortlisted, rejected, hired}` and
    /// `shortlisted -> {rejected, hired}`; terminal states never reopen.
    ForwardOnly,
}

impl TransitionPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            TransitionPolicy::Permissive => "permissive",
            TransitionPolicy::ForwardOnly => "forward_only",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "permissive" => Some(Self::Permissive),
            "forward_only" | "strict" => Some(Self::ForwardOnly),
            _ => None,
        }
    }

    pub fn permits(self, from: ApplicationStatus, to: ApplicationStatus) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::ForwardOnly => is_forward_transition(from, to),
        }
    }
}

fn is_forward_transition(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    use ApplicationStatus::*;

    matches!(
        (from, to),
        (Applied, Shortlisted) | (Applied, Rejected) | (Applied, Hired)
            | (Shortlisted, Rejected)
            | (Shortlisted, Hired)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move application from {} to {}", from.label(), to.label())]
pub struct InvalidTransition {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

/// Outcome of a status write, kept for notification and audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub previous: ApplicationStatus,
    pub current: ApplicationStatus,
}

impl StatusChange {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Writes `status` onto `application`, stamping `status_updated_at` on success.
pub fn transition(
    application: &mut Application,
    status: ApplicationStatus,
    policy: TransitionPolicy,
    now: DateTime<Utc>,
) -> Result<StatusChange, InvalidTransition> {
    let previous = application.status;
    if !policy.permits(previous, status) {
        return Err(InvalidTransition {
            from: previous,
            to: status,
        });
    }

    application.status = status;
    application.status_updated_at = now;

    Ok(StatusChange {
        previous,
        current: status,
    })
}
