use campus_placement::workflows::placement::{
    Application, ApplicationFilter, ApplicationId, College, CollegeId, Company, CompanyId, Job,
    JobId, Notification, NotificationDispatcher, NotificationError, PlacementRepository,
    RepositoryError, StudentId, StudentProfile,
};
use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct Tables {
    jobs: BTreeMap<JobId, Job>,
    students: BTreeMap<StudentId, StudentProfile>,
    companies: BTreeMap<CompanyId, Company>,
    colleges: BTreeMap<CollegeId, College>,
    applications: BTreeMap<ApplicationId, Application>,
}

/// Process-local store; every check-and-insert runs under one lock.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPlacementRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryPlacementRepository {
    /// Repository preloaded with the sample campus used by `serve` and `demo`.
    pub(crate) fn seeded() -> Self {
        let mut tables = Tables::default();
        for college in sample_colleges() {
            tables.colleges.insert(college.id.clone(), college);
        }
        for company in sample_companies() {
            tables.companies.insert(company.id.clone(), company);
        }
        for student in sample_students() {
            tables.students.insert(student.id.clone(), student);
        }
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl PlacementRepository for InMemoryPlacementRepository {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update_job(&self, job: Job) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        match tables.jobs.get_mut(&job.id) {
            Some(existing) => {
                *existing = job;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.lock()?.jobs.get(id).cloned())
    }

    fn jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self.lock()?.jobs.values().cloned().collect())
    }

    fn insert_student(&self, student: StudentProfile) -> Result<StudentProfile, RepositoryError> {
        let mut tables = self.lock()?;
        let duplicate = tables.students.values().any(|existing| {
            existing.email == student.email
                || (existing.college_id == student.college_id
                    && existing.roll_number.eq_ignore_ascii_case(&student.roll_number))
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        tables.students.insert(student.id.clone(), student.clone());
        Ok(student)
    }

    fn update_student(&self, student: StudentProfile) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        match tables.students.get_mut(&student.id) {
            Some(existing) => {
                *existing = student;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_student(&self, id: &StudentId) -> Result<Option<StudentProfile>, RepositoryError> {
        Ok(self.lock()?.students.get(id).cloned())
    }

    fn students(&self) -> Result<Vec<StudentProfile>, RepositoryError> {
        Ok(self.lock()?.students.values().cloned().collect())
    }

    fn update_company(&self, company: Company) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        match tables.companies.get_mut(&company.id) {
            Some(existing) => {
                *existing = company;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        Ok(self.lock()?.companies.get(id).cloned())
    }

    fn companies(&self) -> Result<Vec<Company>, RepositoryError> {
        Ok(self.lock()?.companies.values().cloned().collect())
    }

    fn insert_college(&self, college: College) -> Result<College, RepositoryError> {
        let mut tables = self.lock()?;
        let duplicate = tables
            .colleges
            .values()
            .any(|existing| existing.id == college.id || existing.email == college.email);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        tables.colleges.insert(college.id.clone(), college.clone());
        Ok(college)
    }

    fn fetch_college(&self, id: &CollegeId) -> Result<Option<College>, RepositoryError> {
        Ok(self.lock()?.colleges.get(id).cloned())
    }

    fn colleges(&self) -> Result<Vec<College>, RepositoryError> {
        Ok(self.lock()?.colleges.values().cloned().collect())
    }

    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.lock()?;
        let duplicate = tables.applications.values().any(|existing| {
            existing.job_id == application.job_id && existing.student_id == application.student_id
        });
        if duplicate || tables.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        tables
            .applications
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update_application(&self, application: Application) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        match tables.applications.get_mut(&application.id) {
            Some(existing) => {
                *existing = application;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self.lock()?.applications.get(id).cloned())
    }

    fn applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, RepositoryError> {
        Ok(self
            .lock()?
            .applications
            .values()
            .filter(|application| filter.matches(application))
            .cloned()
            .collect())
    }
}

/// Hands notifications to a background task so request handlers never wait on mail.
#[derive(Clone)]
pub(crate) struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Must be called from within a tokio runtime.
    pub(crate) fn spawn(from_address: String) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Notification>();
        let worker = tokio::spawn(async move {
            while let Some(notification) = receiver.recv().await {
                info!(
                    from = %from_address,
                    to = %notification.recipient,
                    kind = notification.template.kind(),
                    subject = %notification.template.subject(),
                    "notification delivered"
                );
                debug!(body = %notification.template.body(), "notification body");
            }
            debug!("notification queue closed");
        });
        (Self { sender }, worker)
    }
}

impl NotificationDispatcher for ChannelNotifier {
    fn dispatch(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sender
            .send(notification)
            .map_err(|_| NotificationError::Transport("notification queue closed".to_string()))
    }
}

/// Keeps every notification in memory so the CLI demo can print them.
#[derive(Default, Clone)]
pub(crate) struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub(crate) fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationDispatcher for RecordingNotifier {
    fn dispatch(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .map_err(|_| NotificationError::Transport("recorder mutex poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}

fn sample_colleges() -> Vec<College> {
    vec![
        College {
            id: CollegeId("col-northfield".to_string()),
            name: "Northfield Institute of Technology".to_string(),
            email: "placements@northfield.edu".to_string(),
            city: "Pune".to_string(),
        },
        College {
            id: CollegeId("col-riverside".to_string()),
            name: "Riverside College of Engineering".to_string(),
            email: "tpo@riverside.edu".to_string(),
            city: "Chennai".to_string(),
        },
    ]
}

fn sample_companies() -> Vec<Company> {
    vec![
        Company {
            id: CompanyId("cmp-acme".to_string()),
            name: "Acme Cloud Systems".to_string(),
            email: "campus@acme.example.com".to_string(),
            industry: "Cloud Infrastructure".to_string(),
            city: "Bengaluru".to_string(),
            is_approved: true,
        },
        Company {
            id: CompanyId("cmp-globex".to_string()),
            name: "Globex Manufacturing".to_string(),
            email: "hr@globex.example.com".to_string(),
            industry: "Manufacturing".to_string(),
            city: "Ahmedabad".to_string(),
            is_approved: false,
        },
    ]
}

fn sample_students() -> Vec<StudentProfile> {
    let student = |id: &str,
                   first: &str,
                   last: &str,
                   college: &str,
                   stream: &str,
                   cgpa: f32,
                   skills: &[&str]| StudentProfile {
        id: StudentId(id.to_string()),
        email: format!("{}.{}@students.example.edu", first, last).to_ascii_lowercase(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        college_id: CollegeId(college.to_string()),
        roll_number: id.to_ascii_uppercase(),
        stream: stream.to_string(),
        graduation_year: 2025,
        cgpa,
        phone: "9800000000".to_string(),
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        resume_url: None,
    };

    vec![
        student(
            "stu-asha",
            "Asha",
            "Verma",
            "col-northfield",
            "Computer Science",
            8.6,
            &["Rust", "PostgreSQL", "Docker"],
        ),
        student(
            "stu-ravi",
            "Ravi",
            "Kumar",
            "col-northfield",
            "Information Technology",
            7.1,
            &["Java", "Spring"],
        ),
        student(
            "stu-meera",
            "Meera",
            "Iyer",
            "col-riverside",
            "Computer Science",
            9.2,
            &[],
        ),
        student(
            "stu-arjun",
            "Arjun",
            "Das",
            "col-riverside",
            "Mechanical",
            8.0,
            &["AutoCAD", "SolidWorks"],
        ),
    ]
}

/// Accepts RFC 3339 timestamps or plain dates, the latter meaning the end of that day in UTC.
pub(crate) fn parse_deadline(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD"))
}
