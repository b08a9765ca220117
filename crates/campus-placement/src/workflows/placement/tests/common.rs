use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::placement::domain::{
    Application, ApplicationId, ApplicationStatus, College, CollegeId, Company, CompanyId, Job,
    JobId, JobType, StudentId, StudentProfile,
};
use crate::workflows::placement::notifications::Notification;
use crate::workflows::placement::repository::{
    ApplicationFilter, NotificationDispatcher, NotificationError, PlacementRepository,
    RepositoryError,
};
use crate::workflows::placement::validation::NewJobRequest;
use crate::workflows::placement::{placement_router, PlacementPolicy, PlacementService};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn skills(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub(super) fn college(id: &str, name: &str) -> College {
    College {
        id: CollegeId(id.to_string()),
        name: name.to_string(),
        email: format!("tpo@{id}.edu"),
        city: "Pune".to_string(),
    }
}

pub(super) fn company(id: &str, name: &str, approved: bool) -> Company {
    Company {
        id: CompanyId(id.to_string()),
        name: name.to_string(),
        email: format!("hr@{id}.example.com"),
        industry: "Software".to_string(),
        city: "Bengaluru".to_string(),
        is_approved: approved,
    }
}

pub(super) fn student(
    id: &str,
    college_id: &str,
    stream: &str,
    cgpa: f32,
    student_skills: &[&str],
) -> StudentProfile {
    StudentProfile {
        id: StudentId(id.to_string()),
        email: format!("{id}@students.example.edu"),
        first_name: "Asha".to_string(),
        last_name: id.to_uppercase(),
        college_id: CollegeId(college_id.to_string()),
        roll_number: format!("R-{id}"),
        stream: stream.to_string(),
        graduation_year: 2025,
        cgpa,
        phone: "9876543210".to_string(),
        skills: skills(student_skills),
        resume_url: None,
    }
}

pub(super) fn job(id: &str, company_id: &str, job_skills: &[&str]) -> Job {
    Job {
        id: JobId(id.to_string()),
        company_id: CompanyId(company_id.to_string()),
        title: format!("Engineer {id}"),
        description: "Work on the campus hiring platform end to end.".to_string(),
        requirements: Vec::new(),
        required_skills: skills(job_skills),
        location: "Bengaluru".to_string(),
        job_type: JobType::FullTime,
        salary: None,
        allowed_streams: skills(&["Computer Science", "Information Technology"]),
        allowed_colleges: Vec::new(),
        min_cgpa: 7.0,
        application_deadline: now() + Duration::days(14),
        is_active: true,
        created_at: now() - Duration::days(1),
    }
}

pub(super) fn application(id: &str, job_id: &str, student_id: &str) -> Application {
    Application {
        id: ApplicationId(id.to_string()),
        job_id: JobId(job_id.to_string()),
        student_id: StudentId(student_id.to_string()),
        status: ApplicationStatus::Applied,
        applied_at: now(),
        status_updated_at: now(),
        cover_letter: None,
    }
}

pub(super) fn job_request(job_skills: &[&str]) -> NewJobRequest {
    NewJobRequest {
        title: "Backend Engineer".to_string(),
        description: "Design and operate the placement notification pipeline.".to_string(),
        requirements: vec!["Final year students".to_string()],
        skills: skills(job_skills),
        location: "Hyderabad".to_string(),
        job_type: "Full-time".to_string(),
        salary: None,
        allowed_colleges: Vec::new(),
        allowed_streams: skills(&["Computer Science"]),
        min_cgpa: 7.0,
        application_deadline: now() + Duration::days(21),
    }
}

/// Seeds two colleges, an approved and a pending company, and three students.
pub(super) fn seeded_repository() -> Arc<MemoryRepository> {
    let repository = Arc::new(MemoryRepository::default());
    repository.add_college(college("col-1", "Northfield Institute"));
    repository.add_college(college("col-2", "Riverside College"));
    repository.add_company(company("cmp-1", "Acme Labs", true));
    repository.add_company(company("cmp-2", "Pending Corp", false));
    repository.add_student(student(
        "stu-a",
        "col-1",
        "Computer Science",
        8.2,
        &["React", "Node.js", "SQL"],
    ));
    repository.add_student(student("stu-b", "col-2", "Mechanical", 6.5, &["AutoCAD"]));
    repository.add_student(student("stu-c", "col-1", "Computer Science", 7.5, &[]));
    repository
}

pub(super) fn build_service() -> (
    PlacementService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    build_service_with_policy(PlacementPolicy::default())
}

pub(super) fn build_service_with_policy(
    policy: PlacementPolicy,
) -> (
    PlacementService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let repository = seeded_repository();
    let notifier = Arc::new(MemoryNotifier::default());
    let service = PlacementService::new(repository.clone(), notifier.clone(), policy);
    (service, repository, notifier)
}

#[derive(Default)]
struct Tables {
    jobs: BTreeMap<JobId, Job>,
    students: BTreeMap<StudentId, StudentProfile>,
    companies: BTreeMap<CompanyId, Company>,
    colleges: BTreeMap<CollegeId, College>,
    applications: BTreeMap<ApplicationId, Application>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryRepository {
    pub(super) fn add_job(&self, job: Job) {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        guard.jobs.insert(job.id.clone(), job);
    }

    pub(super) fn add_student(&self, student: StudentProfile) {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        guard.students.insert(student.id.clone(), student);
    }

    pub(super) fn add_company(&self, company: Company) {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        guard.companies.insert(company.id.clone(), company);
    }

    pub(super) fn add_college(&self, college: College) {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        guard.colleges.insert(college.id.clone(), college);
    }

    pub(super) fn add_application(&self, application: Application) {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        guard
            .applications
            .insert(application.id.clone(), application);
    }

    pub(super) fn application_count(&self) -> usize {
        self.tables
            .lock()
            .expect("repository mutex poisoned")
            .applications
            .len()
    }
}

impl PlacementRepository for MemoryRepository {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        if guard.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update_job(&self, job: Job) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        guard.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.jobs.get(id).cloned())
    }

    fn jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.jobs.values().cloned().collect())
    }

    fn insert_student(&self, student: StudentProfile) -> Result<StudentProfile, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        let duplicate = guard.students.values().any(|existing| {
            existing.email == student.email
                || (existing.college_id == student.college_id
                    && existing.roll_number == student.roll_number)
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.students.insert(student.id.clone(), student.clone());
        Ok(student)
    }

    fn update_student(&self, student: StudentProfile) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        if !guard.students.contains_key(&student.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.students.insert(student.id.clone(), student);
        Ok(())
    }

    fn fetch_student(&self, id: &StudentId) -> Result<Option<StudentProfile>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.students.get(id).cloned())
    }

    fn students(&self) -> Result<Vec<StudentProfile>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.students.values().cloned().collect())
    }

    fn update_company(&self, company: Company) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        guard.companies.insert(company.id.clone(), company);
        Ok(())
    }

    fn fetch_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.companies.get(id).cloned())
    }

    fn companies(&self) -> Result<Vec<Company>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.companies.values().cloned().collect())
    }

    fn insert_college(&self, college: College) -> Result<College, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        let duplicate = guard
            .colleges
            .values()
            .any(|existing| existing.id == college.id || existing.email == college.email);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.colleges.insert(college.id.clone(), college.clone());
        Ok(college)
    }

    fn fetch_college(&self, id: &CollegeId) -> Result<Option<College>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.colleges.get(id).cloned())
    }

    fn colleges(&self) -> Result<Vec<College>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.colleges.values().cloned().collect())
    }

    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        let duplicate = guard.applications.values().any(|existing| {
            existing.job_id == application.job_id && existing.student_id == application.student_id
        });
        if duplicate || guard.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard
            .applications
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update_application(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        if !guard.applications.contains_key(&application.id) {
            return Err(RepositoryError::NotFound);
        }
        guard
            .applications
            .insert(application.id.clone(), application);
        Ok(())
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.applications.get(id).cloned())
    }

    fn applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard
            .applications
            .values()
            .filter(|application| filter.matches(application))
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub(super) fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn recipients(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|notification| notification.recipient)
            .collect()
    }
}

impl NotificationDispatcher for MemoryNotifier {
    fn dispatch(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl NotificationDispatcher for FailingNotifier {
    fn dispatch(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl PlacementRepository for UnavailableRepository {
    fn insert_job(&self, _job: Job) -> Result<Job, RepositoryError> {
        Err(offline())
    }

    fn update_job(&self, _job: Job) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn fetch_job(&self, _id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Err(offline())
    }

    fn jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Err(offline())
    }

    fn insert_student(&self, _student: StudentProfile) -> Result<StudentProfile, RepositoryError> {
        Err(offline())
    }

    fn update_student(&self, _student: StudentProfile) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn fetch_student(&self, _id: &StudentId) -> Result<Option<StudentProfile>, RepositoryError> {
        Err(offline())
    }

    fn students(&self) -> Result<Vec<StudentProfile>, RepositoryError> {
        Err(offline())
    }

    fn update_company(&self, _company: Company) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn fetch_company(&self, _id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        Err(offline())
    }

    fn companies(&self) -> Result<Vec<Company>, RepositoryError> {
        Err(offline())
    }

    fn insert_college(&self, _college: College) -> Result<College, RepositoryError> {
        Err(offline())
    }

    fn fetch_college(&self, _id: &CollegeId) -> Result<Option<College>, RepositoryError> {
        Err(offline())
    }

    fn colleges(&self) -> Result<Vec<College>, RepositoryError> {
        Err(offline())
    }

    fn insert_application(
        &self,
        _application: Application,
    ) -> Result<Application, RepositoryError> {
        Err(offline())
    }

    fn update_application(&self, _application: Application) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn fetch_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Err(offline())
    }

    fn applications(
        &self,
        _filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, RepositoryError> {
        Err(offline())
    }
}

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

/// Serves reads from a [`MemoryRepository`] until a write commits, then fails
/// every read, like a primary that drops right after acknowledging a write.
pub(super) struct ReadsFailAfterWrite {
    inner: Arc<MemoryRepository>,
    written: AtomicBool,
}

impl ReadsFailAfterWrite {
    pub(super) fn new(inner: Arc<MemoryRepository>) -> Self {
        Self {
            inner,
            written: AtomicBool::new(false),
        }
    }

    fn read<T>(
        &self,
        fetch: impl FnOnce(&MemoryRepository) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        if self.written.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("connection reset".to_string()));
        }
        fetch(&self.inner)
    }

    fn write<T>(&self, result: Result<T, RepositoryError>) -> Result<T, RepositoryError> {
        if result.is_ok() {
            self.written.store(true, Ordering::SeqCst);
        }
        result
    }
}

impl PlacementRepository for ReadsFailAfterWrite {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        self.write(self.inner.insert_job(job))
    }

    fn update_job(&self, job: Job) -> Result<(), RepositoryError> {
        self.write(self.inner.update_job(job))
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        self.read(|inner| inner.fetch_job(id))
    }

    fn jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        self.read(|inner| inner.jobs())
    }

    fn insert_student(&self, student: StudentProfile) -> Result<StudentProfile, RepositoryError> {
        self.write(self.inner.insert_student(student))
    }

    fn update_student(&self, student: StudentProfile) -> Result<(), RepositoryError> {
        self.write(self.inner.update_student(student))
    }

    fn fetch_student(&self, id: &StudentId) -> Result<Option<StudentProfile>, RepositoryError> {
        self.read(|inner| inner.fetch_student(id))
    }

    fn students(&self) -> Result<Vec<StudentProfile>, RepositoryError> {
        self.read(|inner| inner.students())
    }

    fn update_company(&self, company: Company) -> Result<(), RepositoryError> {
        self.write(self.inner.update_company(company))
    }

    fn fetch_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        self.read(|inner| inner.fetch_company(id))
    }

    fn companies(&self) -> Result<Vec<Company>, RepositoryError> {
        self.read(|inner| inner.companies())
    }

    fn insert_college(&self, college: College) -> Result<College, RepositoryError> {
        self.write(self.inner.insert_college(college))
    }

    fn fetch_college(&self, id: &CollegeId) -> Result<Option<College>, RepositoryError> {
        self.read(|inner| inner.fetch_college(id))
    }

    fn colleges(&self) -> Result<Vec<College>, RepositoryError> {
        self.read(|inner| inner.colleges())
    }

    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        self.write(self.inner.insert_application(application))
    }

    fn update_application(&self, application: Application) -> Result<(), RepositoryError> {
        self.write(self.inner.update_application(application))
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.read(|inner| inner.fetch_application(id))
    }

    fn applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, RepositoryError> {
        self.read(|inner| inner.applications(filter))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: PlacementService<MemoryRepository, MemoryNotifier>,
) -> axum::Router {
    placement_router(Arc::new(service))
}
