use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::domain::{
    Actor, Application, ApplicationId, ApplicationStatus, College, CollegeId, Company, CompanyId,
    Job, JobId, Role, StudentId, StudentProfile,
};
use super::eligibility::{check_eligibility, matches_candidate_criteria, EligibilityRejection};
use super::ids::{IdSource, RecordKind, SequentialIds};
use super::lifecycle::{transition, InvalidTransition};
use super::matching::{match_score, qualifies_for_notification};
use super::notifications::{Notification, NotificationTemplate};
use super::policy::PlacementPolicy;
use super::repository::{
    ApplicationFilter, NotificationDispatcher, PlacementRepository, RepositoryError,
};
use super::validation::{
    ApplicationQuery, ApplyRequest, CompanyQuery, JobUpdateRequest, NewCollegeRequest,
    NewJobRequest, NewStudentRequest, StatusUpdateRequest, StudentProfileUpdate,
    StudentRecordUpdate, ValidationError,
};
use super::views::{
    ApplicantSummary, CandidateView, CollegePlacementCount, JobPostingOutcome, PlacementAnalytics,
    PlacementRecord, RankedJob, StreamCount, StudentApplicationView,
};

/// Service composing the placement rules with the storage and notification ports.
pub struct PlacementService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    policy: PlacementPolicy,
    ids: Arc<dyn IdSource>,
}

impl<R, N> PlacementService<R, N>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, policy: PlacementPolicy) -> Self {
        Self {
            repository,
            notifier,
            policy,
            ids: Arc::new(SequentialIds::default()),
        }
    }

    /// Replace the per-instance counters, e.g. with ids shared across processes.
    pub fn with_ids(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    pub fn policy(&self) -> &PlacementPolicy {
        &self.policy
    }

    /// Publish a job for an approved company and notify students whose skills fit.
    pub fn post_job(
        &self,
        actor: &Actor,
        request: NewJobRequest,
        now: DateTime<Utc>,
    ) -> Result<JobPostingOutcome, PlacementError> {
        require_role(actor, Role::Company)?;
        let company = self.company(&CompanyId(actor.id.clone()))?;
        if !company.is_approved {
            return Err(PlacementError::Forbidden(
                "company is not yet approved by admin".to_string(),
            ));
        }

        let job_id = JobId(self.ids.next_id(RecordKind::Job));
        let job = request.into_job(job_id, company.id.clone(), now)?;
        let job = self.repository.insert_job(job)?;

        // The job is stored; a failed lookup only costs the alerts.
        let students = match self.repository.students() {
            Ok(students) => students,
            Err(err) => {
                warn!(job_id = %job.id.0, error = %err, "student lookup failed, skipping job alerts");
                Vec::new()
            }
        };
        let recipients: Vec<StudentProfile> = students
            .into_iter()
            .filter(|student| matches_candidate_criteria(&job, student))
            .filter(|student| {
                qualifies_for_notification(
                    &job.required_skills,
                    &student.skills,
                    self.policy.notification_threshold,
                )
            })
            .collect();

        for student in &recipients {
            self.notify(Notification::new(
                student.email.clone(),
                NotificationTemplate::JobPosted {
                    student_name: student.full_name(),
                    job_title: job.title.clone(),
                    company_name: company.name.clone(),
                    location: job.location.clone(),
                },
            ));
        }

        info!(
            job_id = %job.id.0,
            company_id = %company.id.0,
            notified = recipients.len(),
            "job posted"
        );

        Ok(JobPostingOutcome {
            job,
            notified_students: recipients.len(),
        })
    }

    /// Jobs owned by the calling company, newest first.
    pub fn company_jobs(&self, actor: &Actor) -> Result<Vec<Job>, PlacementError> {
        require_role(actor, Role::Company)?;
        let mut jobs: Vec<Job> = self
            .repository
            .jobs()?
            .into_iter()
            .filter(|job| job.company_id.0 == actor.id)
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    pub fn update_job(
        &self,
        actor: &Actor,
        job_id: &JobId,
        request: JobUpdateRequest,
    ) -> Result<Job, PlacementError> {
        require_role(actor, Role::Company)?;
        let mut job = self.job(job_id)?;
        if job.company_id.0 != actor.id {
            return Err(PlacementError::NotFound {
                entity: "job",
                id: job_id.0.clone(),
            });
        }

        request.apply_to(&mut job)?;
        self.repository.update_job(job.clone())?;
        debug!(job_id = %job.id.0, active = job.is_active, "job updated");
        Ok(job)
    }

    /// Jobs the calling student is eligible for, best skill match first.
    pub fn eligible_jobs(
        &self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedJob>, PlacementError> {
        require_role(actor, Role::Student)?;
        let student = self.student(&StudentId(actor.id.clone()))?;

        let mut ranked: Vec<RankedJob> = self
            .repository
            .jobs()?
            .into_iter()
            .filter(|job| check_eligibility(job, &student, now).is_ok())
            .map(|job| {
                let match_score = match_score(&job.required_skills, &student.skills);
                RankedJob { job, match_score }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then_with(|| b.job.created_at.cmp(&a.job.created_at))
        });
        Ok(ranked)
    }

    /// Active jobs still accepting applications, open to anonymous visitors.
    pub fn public_jobs(&self, now: DateTime<Utc>) -> Result<Vec<Job>, PlacementError> {
        let mut jobs: Vec<Job> = self
            .repository
            .jobs()?
            .into_iter()
            .filter(|job| job.is_active && job.application_deadline >= now)
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    /// Submit an application after re-checking eligibility.
    pub fn apply(
        &self,
        actor: &Actor,
        request: ApplyRequest,
        now: DateTime<Utc>,
    ) -> Result<Application, PlacementError> {
        require_role(actor, Role::Student)?;
        let (job_id, cover_letter) = request.validate()?;
        let student = self.student(&StudentId(actor.id.clone()))?;
        let job = self.job(&job_id)?;

        check_eligibility(&job, &student, now)?;

        let application = Application {
            id: ApplicationId(self.ids.next_id(RecordKind::Application)),
            job_id: job.id.clone(),
            student_id: student.id.clone(),
            status: ApplicationStatus::Applied,
            applied_at: now,
            status_updated_at: now,
            cover_letter,
        };

        let stored = match self.repository.insert_application(application) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => return Err(PlacementError::AlreadyApplied),
            Err(other) => return Err(other.into()),
        };

        match self.repository.fetch_company(&job.company_id) {
            Ok(Some(company)) => self.notify(Notification::new(
                company.email.clone(),
                NotificationTemplate::NewApplication {
                    company_name: company.name,
                    student_name: student.full_name(),
                    job_title: job.title.clone(),
                },
            )),
            Ok(None) => {
                warn!(company_id = %job.company_id.0, "job owner missing, skipping notification")
            }
            Err(err) => warn!(
                company_id = %job.company_id.0,
                error = %err,
                "job owner lookup failed, skipping notification"
            ),
        }

        info!(
            application_id = %stored.id.0,
            job_id = %job.id.0,
            student_id = %student.id.0,
            "application submitted"
        );
        Ok(stored)
    }

    /// The calling student's applications, newest first.
    pub fn student_applications(
        &self,
        actor: &Actor,
    ) -> Result<Vec<StudentApplicationView>, PlacementError> {
        require_role(actor, Role::Student)?;
        let filter = ApplicationFilter {
            student_id: Some(StudentId(actor.id.clone())),
            ..ApplicationFilter::default()
        };

        let jobs = self.jobs_by_id()?;
        let companies: HashMap<CompanyId, Company> = self
            .repository
            .companies()?
            .into_iter()
            .map(|company| (company.id.clone(), company))
            .collect();

        let mut views: Vec<StudentApplicationView> = self
            .repository
            .applications(&filter)?
            .into_iter()
            .map(|application| {
                let job = jobs.get(&application.job_id);
                let job_title = job.map(|job| job.title.clone()).unwrap_or_default();
                let company_name = job
                    .and_then(|job| companies.get(&job.company_id))
                    .map(|company| company.name.clone())
                    .unwrap_or_default();
                StudentApplicationView {
                    application,
                    job_title,
                    company_name,
                }
            })
            .collect();
        views.sort_by(|a, b| b.application.applied_at.cmp(&a.application.applied_at));
        Ok(views)
    }

    /// Applications received on the calling company's jobs.
    pub fn company_applications(
        &self,
        actor: &Actor,
        query: &ApplicationQuery,
    ) -> Result<Vec<CandidateView>, PlacementError> {
        require_role(actor, Role::Company)?;
        let (job_id, status) = query.validate()?;

        let jobs: HashMap<JobId, Job> = self
            .repository
            .jobs()?
            .into_iter()
            .filter(|job| job.company_id.0 == actor.id)
            .map(|job| (job.id.clone(), job))
            .collect();

        let job_ids: Vec<JobId> = match job_id {
            Some(id) if jobs.contains_key(&id) => vec![id],
            Some(_) => Vec::new(),
            None => jobs.keys().cloned().collect(),
        };
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }

        let filter = ApplicationFilter {
            job_ids: Some(job_ids),
            student_id: None,
            status,
        };

        let mut views = Vec::new();
        for application in self.repository.applications(&filter)? {
            let student = self.repository.fetch_student(&application.student_id)?;
            let job_title = jobs
                .get(&application.job_id)
                .map(|job| job.title.clone())
                .unwrap_or_default();
            views.push(CandidateView {
                application,
                job_title,
                student: student.as_ref().map(ApplicantSummary::from),
            });
        }
        views.sort_by(|a, b| b.application.applied_at.cmp(&a.application.applied_at));
        Ok(views)
    }

    /// Overwrite an application's status on behalf of the job's company.
    pub fn update_status(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
        request: StatusUpdateRequest,
        now: DateTime<Utc>,
    ) -> Result<Application, PlacementError> {
        require_role(actor, Role::Company)?;
        let status = request.validate()?;

        let mut application = self
            .repository
            .fetch_application(application_id)?
            .ok_or_else(|| PlacementError::NotFound {
                entity: "application",
                id: application_id.0.clone(),
            })?;
        let job = self.job(&application.job_id)?;
        if job.company_id.0 != actor.id {
            return Err(PlacementError::Forbidden(
                "application belongs to another company's job".to_string(),
            ));
        }

        let change = transition(
            &mut application,
            status,
            self.policy.transition_policy,
            now,
        )?;
        self.repository.update_application(application.clone())?;

        info!(
            application_id = %application.id.0,
            from = change.previous.label(),
            to = change.current.label(),
            changed = change.changed(),
            "application status updated"
        );

        match self.repository.fetch_student(&application.student_id) {
            Ok(Some(student)) => {
                let company_name = match self.repository.fetch_company(&job.company_id) {
                    Ok(Some(company)) => company.name,
                    Ok(None) => "Company".to_string(),
                    Err(err) => {
                        warn!(company_id = %job.company_id.0, error = %err, "company lookup failed");
                        "Company".to_string()
                    }
                };
                self.notify(Notification::new(
                    student.email.clone(),
                    NotificationTemplate::ApplicationStatusChanged {
                        student_name: student.full_name(),
                        job_title: job.title.clone(),
                        company_name,
                        status: change.current,
                    },
                ));
            }
            Ok(None) => warn!(
                student_id = %application.student_id.0,
                "applicant missing, skipping status notification"
            ),
            Err(err) => warn!(
                student_id = %application.student_id.0,
                error = %err,
                "applicant lookup failed, skipping status notification"
            ),
        }

        Ok(application)
    }

    /// Hired applications for students of the calling college, most recent first.
    pub fn college_placements(&self, actor: &Actor) -> Result<Vec<PlacementRecord>, PlacementError> {
        require_role(actor, Role::College)?;

        let students: HashMap<StudentId, StudentProfile> = self
            .repository
            .students()?
            .into_iter()
            .filter(|student| student.college_id.0 == actor.id)
            .map(|student| (student.id.clone(), student))
            .collect();
        let jobs = self.jobs_by_id()?;
        let companies: HashMap<CompanyId, Company> = self
            .repository
            .companies()?
            .into_iter()
            .map(|company| (company.id.clone(), company))
            .collect();

        let filter = ApplicationFilter {
            status: Some(ApplicationStatus::Hired),
            ..ApplicationFilter::default()
        };

        let mut placements: Vec<PlacementRecord> = self
            .repository
            .applications(&filter)?
            .into_iter()
            .filter_map(|application| {
                let student = students.get(&application.student_id)?;
                let job = jobs.get(&application.job_id)?;
                let company = companies.get(&job.company_id)?;
                Some(PlacementRecord {
                    application_id: application.id,
                    student_name: student.full_name(),
                    student_email: student.email.clone(),
                    job_title: job.title.clone(),
                    company_name: company.name.clone(),
                    hired_at: application.status_updated_at,
                })
            })
            .collect();
        placements.sort_by(|a, b| b.hired_at.cmp(&a.hired_at));
        Ok(placements)
    }

    pub fn approve_company(
        &self,
        actor: &Actor,
        company_id: &CompanyId,
    ) -> Result<Company, PlacementError> {
        require_role(actor, Role::Admin)?;
        let mut company = self.company(company_id)?;
        company.is_approved = true;
        self.repository.update_company(company.clone())?;
        info!(company_id = %company.id.0, "company approved");
        Ok(company)
    }

    /// Register a student; colleges may only enroll their own students.
    pub fn register_student(
        &self,
        actor: &Actor,
        request: NewStudentRequest,
    ) -> Result<StudentProfile, PlacementError> {
        match actor.role {
            Role::Admin => {}
            Role::College if request.college_id.trim() == actor.id => {}
            Role::College => {
                return Err(PlacementError::Forbidden(
                    "colleges may only register their own students".to_string(),
                ))
            }
            _ => {
                return Err(PlacementError::Forbidden(
                    "admin or college access required".to_string(),
                ))
            }
        }

        let profile = request.into_profile(StudentId(self.ids.next_id(RecordKind::Student)))?;
        if self.repository.fetch_college(&profile.college_id)?.is_none() {
            return Err(PlacementError::NotFound {
                entity: "college",
                id: profile.college_id.0.clone(),
            });
        }

        let stored = match self.repository.insert_student(profile) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => return Err(PlacementError::DuplicateStudent),
            Err(other) => return Err(other.into()),
        };
        info!(student_id = %stored.id.0, college_id = %stored.college_id.0, "student registered");
        Ok(stored)
    }

    /// The calling student's own profile.
    pub fn student_profile(&self, actor: &Actor) -> Result<StudentProfile, PlacementError> {
        require_role(actor, Role::Student)?;
        self.student(&StudentId(actor.id.clone()))
    }

    /// Let a student edit contact details and skills; email, college and
    /// academic record stay as registered.
    pub fn update_student_profile(
        &self,
        actor: &Actor,
        request: StudentProfileUpdate,
    ) -> Result<StudentProfile, PlacementError> {
        require_role(actor, Role::Student)?;
        let mut student = self.student(&StudentId(actor.id.clone()))?;
        request.apply_to(&mut student)?;
        self.repository.update_student(student.clone())?;
        debug!(student_id = %student.id.0, skills = student.skills.len(), "student profile updated");
        Ok(student)
    }

    /// Students enrolled at the calling college, ordered by roll number.
    pub fn college_students(&self, actor: &Actor) -> Result<Vec<StudentProfile>, PlacementError> {
        require_role(actor, Role::College)?;
        let mut students: Vec<StudentProfile> = self
            .repository
            .students()?
            .into_iter()
            .filter(|student| student.college_id.0 == actor.id)
            .collect();
        students.sort_by(|a, b| a.roll_number.cmp(&b.roll_number));
        Ok(students)
    }

    pub fn list_colleges(&self, actor: &Actor) -> Result<Vec<College>, PlacementError> {
        require_role(actor, Role::Admin)?;
        let mut colleges = self.repository.colleges()?;
        colleges.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(colleges)
    }

    pub fn create_college(
        &self,
        actor: &Actor,
        request: NewCollegeRequest,
    ) -> Result<College, PlacementError> {
        require_role(actor, Role::Admin)?;
        let college = request.into_college(CollegeId(self.ids.next_id(RecordKind::College)))?;
        let stored = match self.repository.insert_college(college) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => return Err(PlacementError::DuplicateCollege),
            Err(other) => return Err(other.into()),
        };
        info!(college_id = %stored.id.0, "college created");
        Ok(stored)
    }

    /// Companies for the admin console, pending approvals first.
    pub fn list_companies(
        &self,
        actor: &Actor,
        query: &CompanyQuery,
    ) -> Result<Vec<Company>, PlacementError> {
        require_role(actor, Role::Admin)?;
        let approved = query.validate()?;
        let mut companies: Vec<Company> = self
            .repository
            .companies()?
            .into_iter()
            .filter(|company| approved.map_or(true, |approved| company.is_approved == approved))
            .collect();
        companies.sort_by(|a, b| {
            a.is_approved
                .cmp(&b.is_approved)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(companies)
    }

    /// Admin correction of any student record, including stream and CGPA.
    pub fn update_student(
        &self,
        actor: &Actor,
        student_id: &StudentId,
        request: StudentRecordUpdate,
    ) -> Result<StudentProfile, PlacementError> {
        require_role(actor, Role::Admin)?;
        let mut student = self.student(student_id)?;
        request.apply_to(&mut student)?;
        self.repository.update_student(student.clone())?;
        info!(student_id = %student.id.0, "student record updated by admin");
        Ok(student)
    }

    pub fn analytics(&self, actor: &Actor) -> Result<PlacementAnalytics, PlacementError> {
        require_role(actor, Role::Admin)?;

        let students = self.repository.students()?;
        let companies = self.repository.companies()?;
        let colleges = self.repository.colleges()?;
        let jobs = self.repository.jobs()?;
        let applications = self.repository.applications(&ApplicationFilter::default())?;

        let mut status_distribution: BTreeMap<&'static str, usize> = ApplicationStatus::ALL
            .into_iter()
            .map(|status| (status.label(), 0))
            .collect();
        for application in &applications {
            *status_distribution
                .entry(application.status.label())
                .or_default() += 1;
        }

        let college_of: HashMap<&StudentId, &College> = students
            .iter()
            .filter_map(|student| {
                colleges
                    .iter()
                    .find(|college| college.id == student.college_id)
                    .map(|college| (&student.id, college))
            })
            .collect();
        let mut per_college: BTreeMap<&str, CollegePlacementCount> = BTreeMap::new();
        for application in applications
            .iter()
            .filter(|application| application.status == ApplicationStatus::Hired)
        {
            if let Some(college) = college_of.get(&application.student_id) {
                per_college
                    .entry(college.id.0.as_str())
                    .or_insert_with(|| CollegePlacementCount {
                        college_id: college.id.clone(),
                        college_name: college.name.clone(),
                        placements: 0,
                    })
                    .placements += 1;
            }
        }
        let mut placements_per_college: Vec<CollegePlacementCount> =
            per_college.into_values().collect();
        placements_per_college.sort_by(|a, b| b.placements.cmp(&a.placements));

        let mut streams: BTreeMap<&str, usize> = BTreeMap::new();
        for student in &students {
            *streams.entry(student.stream.as_str()).or_default() += 1;
        }
        let mut stream_distribution: Vec<StreamCount> = streams
            .into_iter()
            .map(|(stream, students)| StreamCount {
                stream: stream.to_string(),
                students,
            })
            .collect();
        stream_distribution.sort_by(|a, b| b.students.cmp(&a.students));

        Ok(PlacementAnalytics {
            total_students: students.len(),
            total_companies: companies.iter().filter(|company| company.is_approved).count(),
            total_colleges: colleges.len(),
            total_jobs: jobs.len(),
            total_applications: applications.len(),
            total_placements: status_distribution
                .get(ApplicationStatus::Hired.label())
                .copied()
                .unwrap_or_default(),
            pending_approvals: companies.iter().filter(|company| !company.is_approved).count(),
            status_distribution,
            placements_per_college,
            stream_distribution,
        })
    }

    fn notify(&self, notification: Notification) {
        let kind = notification.template.kind();
        let recipient = notification.recipient.clone();
        if let Err(err) = self.notifier.dispatch(notification) {
            warn!(kind, %recipient, error = %err, "notification dispatch failed");
        }
    }

    fn job(&self, id: &JobId) -> Result<Job, PlacementError> {
        self.repository
            .fetch_job(id)?
            .ok_or_else(|| PlacementError::NotFound {
                entity: "job",
                id: id.0.clone(),
            })
    }

    fn student(&self, id: &StudentId) -> Result<StudentProfile, PlacementError> {
        self.repository
            .fetch_student(id)?
            .ok_or_else(|| PlacementError::NotFound {
                entity: "student",
                id: id.0.clone(),
            })
    }

    fn company(&self, id: &CompanyId) -> Result<Company, PlacementError> {
        self.repository
            .fetch_company(id)?
            .ok_or_else(|| PlacementError::NotFound {
                entity: "company",
                id: id.0.clone(),
            })
    }

    fn jobs_by_id(&self) -> Result<HashMap<JobId, Job>, PlacementError> {
        Ok(self
            .repository
            .jobs()?
            .into_iter()
            .map(|job| (job.id.clone(), job))
            .collect())
    }
}

fn require_role(actor: &Actor, role: Role) -> Result<(), PlacementError> {
    if actor.role != role {
        return Err(PlacementError::Forbidden(format!(
            "{} access required",
            role.label()
        )));
    }
    Ok(())
}

/// Error raised by the placement service.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Eligibility(#[from] EligibilityRejection),
    #[error("you have already applied for this job")]
    AlreadyApplied,
    #[error("a student with this email or roll number already exists")]
    DuplicateStudent,
    #[error("a college with this email already exists")]
    DuplicateCollege,
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("authentication required")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl PlacementError {
    pub fn code(&self) -> &'static str {
        match self {
            PlacementError::Validation(_) => "validation_error",
            PlacementError::Eligibility(reason) => reason.code(),
            PlacementError::AlreadyApplied => "already_applied",
            PlacementError::DuplicateStudent => "duplicate_student",
            PlacementError::DuplicateCollege => "duplicate_college",
            PlacementError::NotFound { .. } => "not_found",
            PlacementError::Unauthorized => "unauthorized",
            PlacementError::Forbidden(_) => "forbidden",
            PlacementError::InvalidTransition(_) => "invalid_transition",
            PlacementError::Repository(RepositoryError::NotFound) => "not_found",
            PlacementError::Repository(_) => "repository_error",
        }
    }
}
