//! Campus placement rules: who may see and apply to a job, how well their
//! skills fit, and how applications move from submission to a hiring decision.
//!
//! The rule functions are pure; [`PlacementService`] wires them to a
//! [`PlacementRepository`] and a [`NotificationDispatcher`] supplied by the caller.

pub mod domain;
pub mod eligibility;
pub mod ids;
pub mod lifecycle;
pub mod matching;
pub mod notifications;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    Actor, Application, ApplicationId, ApplicationStatus, College, CollegeId, Company, CompanyId,
    Job, JobId, JobType, Role, SalaryRange, StudentId, StudentProfile, KNOWN_STREAMS,
};
pub use eligibility::{check_eligibility, is_eligible, EligibilityRejection};
pub use ids::{IdSource, RecordKind, SequentialIds};
pub use lifecycle::{transition, InvalidTransition, StatusChange, TransitionPolicy};
pub use matching::{match_score, qualifies_for_notification, DEFAULT_NOTIFICATION_THRESHOLD};
pub use notifications::{Notification, NotificationTemplate};
pub use policy::PlacementPolicy;
pub use repository::{
    ApplicationFilter, NotificationDispatcher, NotificationError, PlacementRepository,
    RepositoryError,
};
pub use router::placement_router;
pub use service::{PlacementError, PlacementService};
pub use validation::{
    ApplicationQuery, ApplyRequest, CompanyQuery, JobUpdateRequest, NewCollegeRequest,
    NewJobRequest, NewStudentRequest, StatusUpdateRequest, StudentProfileUpdate,
    StudentRecordUpdate, ValidationError,
};
pub use views::{
    ApplicantSummary, CandidateView, JobPostingOutcome, PlacementAnalytics, PlacementRecord,
    RankedJob, StudentApplicationView,
};
