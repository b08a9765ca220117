use serde::{Deserialize, Serialize};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, College, CollegeId, Company, CompanyId, Job,
    JobId, StudentId, StudentProfile,
};
use super::notifications::Notification;

/// Selection applied when listing applications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFilter {
    #[serde(default)]
    pub job_ids: Option<Vec<JobId>>,
    #[serde(default)]
    pub student_id: Option<StudentId>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &Application) -> bool {
        self.job_ids
            .as_ref()
            .map_or(true, |ids| ids.contains(&application.job_id))
            && self
                .student_id
                .as_ref()
                .map_or(true, |id| *id == application.student_id)
            && self.status.map_or(true, |status| status == application.status)
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `insert_application` must reject a second application for the same
/// (job, student) pair with [`RepositoryError::Conflict`], atomically with
/// the insert. `insert_student` does the same for a repeated email or
/// (college, roll number) pair, and `insert_college` for a repeated email.
/// Updates of records that do not exist return [`RepositoryError::NotFound`].
pub trait PlacementRepository: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update_job(&self, job: Job) -> Result<(), RepositoryError>;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    fn jobs(&self) -> Result<Vec<Job>, RepositoryError>;

    fn insert_student(&self, student: StudentProfile) -> Result<StudentProfile, RepositoryError>;
    fn update_student(&self, student: StudentProfile) -> Result<(), RepositoryError>;
    fn fetch_student(&self, id: &StudentId) -> Result<Option<StudentProfile>, RepositoryError>;
    fn students(&self) -> Result<Vec<StudentProfile>, RepositoryError>;

    fn update_company(&self, company: Company) -> Result<(), RepositoryError>;
    fn fetch_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError>;
    fn companies(&self) -> Result<Vec<Company>, RepositoryError>;

    fn insert_college(&self, college: College) -> Result<College, RepositoryError>;
    fn fetch_college(&self, id: &CollegeId) -> Result<Option<College>, RepositoryError>;
    fn colleges(&self) -> Result<Vec<College>, RepositoryError>;

    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn update_application(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch_application(&self, id: &ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    fn applications(&self, filter: &ApplicationFilter)
        -> Result<Vec<Application>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook (e-mail or queue adapters).
///
/// Implementations should hand the message off and return quickly; callers
/// log failures and carry on.
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(&self, notification: Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
