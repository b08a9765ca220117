use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Job, StudentProfile};

/// Reason a student may not view or apply to a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityRejection {
    #[error("this job is no longer active")]
    InactiveJob,
    #[error("application deadline has passed")]
    DeadlinePassed,
    #[error("you do not meet the minimum CGPA requirement")]
    CgpaTooLow,
    #[error("your stream is not eligible for this job")]
    StreamNotAllowed,
    #[error("your college is not eligible for this job")]
    CollegeNotAllowed,
}

impl EligibilityRejection {
    pub const fn code(self) -> &'static str {
        match self {
            EligibilityRejection::InactiveJob => "inactive_job",
            EligibilityRejection::DeadlinePassed => "deadline_passed",
            EligibilityRejection::CgpaTooLow => "cgpa_too_low",
            EligibilityRejection::StreamNotAllowed => "stream_not_allowed",
            EligibilityRejection::CollegeNotAllowed => "college_not_allowed",
        }
    }
}

/// Checks every job-side constraint in a fixed order and reports the first one violated.
pub fn check_eligibility(
    job: &Job,
    student: &StudentProfile,
    now: DateTime<Utc>,
) -> Result<(), EligibilityRejection> {
    if !job.is_active {
        return Err(EligibilityRejection::InactiveJob);
    }

    if now > job.application_deadline {
        return Err(EligibilityRejection::DeadlinePassed);
    }

    if student.cgpa < job.min_cgpa {
        return Err(EligibilityRejection::CgpaTooLow);
    }

    if !job.allowed_streams.iter().any(|stream| *stream == student.stream) {
        return Err(EligibilityRejection::StreamNotAllowed);
    }

    if !job.allowed_colleges.is_empty() && !job.allowed_colleges.contains(&student.college_id) {
        return Err(EligibilityRejection::CollegeNotAllowed);
    }

    Ok(())
}

pub fn is_eligible(job: &Job, student: &StudentProfile, now: DateTime<Utc>) -> bool {
    check_eligibility(job, student, now).is_ok()
}

/// Student-side pre-filter used when fanning out job notifications.
///
/// Only the attributes the student controls are compared; the job's own
/// activity and deadline are the caller's concern.
pub(crate) fn matches_candidate_criteria(job: &Job, student: &StudentProfile) -> bool {
    student.cgpa >= job.min_cgpa
        && job.allowed_streams.iter().any(|stream| *stream == student.stream)
        && (job.allowed_colleges.is_empty() || job.allowed_colleges.contains(&student.college_id))
}
