//! Integration scenarios for the placement workflow, driven through the public
//! rule functions, the service facade, and the HTTP router.

mod common {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use campus_placement::workflows::placement::{
        Application, ApplicationFilter, ApplicationId, College, CollegeId, Company, CompanyId,
        Job, JobId, JobType, Notification, NotificationDispatcher, NotificationError,
        PlacementPolicy, PlacementRepository, PlacementService, RepositoryError, StudentId,
        StudentProfile,
    };

    pub(super) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(super) fn job(deadline: DateTime<Utc>) -> Job {
        Job {
            id: JobId("job-e2e".to_string()),
            company_id: CompanyId("cmp-acme".to_string()),
            title: "Graduate Engineer".to_string(),
            description: "Rotate through the platform and data teams.".to_string(),
            requirements: Vec::new(),
            required_skills: vec!["Python".to_string(), "SQL".to_string()],
            location: "Chennai".to_string(),
            job_type: JobType::FullTime,
            salary: None,
            allowed_streams: vec!["CS".to_string()],
            allowed_colleges: Vec::new(),
            min_cgpa: 7.0,
            application_deadline: deadline,
            is_active: true,
            created_at: now() - Duration::days(2),
        }
    }

    pub(super) fn student() -> StudentProfile {
        StudentProfile {
            id: StudentId("stu-nila".to_string()),
            email: "nila@northfield.edu".to_string(),
            first_name: "Nila".to_string(),
            last_name: "Raman".to_string(),
            college_id: CollegeId("col-north".to_string()),
            roll_number: "CS-17".to_string(),
            stream: "CS".to_string(),
            graduation_year: 2025,
            cgpa: 7.0,
            phone: "9000000001".to_string(),
            skills: vec!["python".to_string()],
            resume_url: None,
        }
    }

    pub(super) fn build_service(
        deadline: DateTime<Utc>,
    ) -> (
        Arc<PlacementService<MemoryRepository, MemoryNotifier>>,
        Arc<MemoryRepository>,
        Arc<MemoryNotifier>,
    ) {
        let repository = Arc::new(MemoryRepository::default());
        {
            let mut tables = repository.tables.lock().expect("repository mutex poisoned");
            let college = College {
                id: CollegeId("col-north".to_string()),
                name: "Northfield Institute".to_string(),
                email: "tpo@northfield.edu".to_string(),
                city: "Chennai".to_string(),
            };
            tables.colleges.insert(college.id.clone(), college);
            let company = Company {
                id: CompanyId("cmp-acme".to_string()),
                name: "Acme Analytics".to_string(),
                email: "talent@acme.example.com".to_string(),
                industry: "Analytics".to_string(),
                city: "Chennai".to_string(),
                is_approved: true,
            };
            tables.companies.insert(company.id.clone(), company);
            let student = student();
            tables.students.insert(student.id.clone(), student);
            let job = job(deadline);
            tables.jobs.insert(job.id.clone(), job);
        }
        let notifier = Arc::new(MemoryNotifier::default());
        let service = Arc::new(PlacementService::new(
            repository.clone(),
            notifier.clone(),
            PlacementPolicy::default(),
        ));
        (service, repository, notifier)
    }

    #[derive(Default)]
    pub(super) struct Tables {
        pub(super) jobs: BTreeMap<JobId, Job>,
        pub(super) students: BTreeMap<StudentId, StudentProfile>,
        pub(super) companies: BTreeMap<CompanyId, Company>,
        pub(super) colleges: BTreeMap<CollegeId, College>,
        pub(super) applications: BTreeMap<ApplicationId, Application>,
    }

    #[derive(Default)]
    pub(super) struct MemoryRepository {
        pub(super) tables: Mutex<Tables>,
    }

    impl PlacementRepository for MemoryRepository {
        fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
            let mut tables = self.tables.lock().expect("repository mutex poisoned");
            tables.jobs.insert(job.id.clone(), job.clone());
            Ok(job)
        }

        fn update_job(&self, job: Job) -> Result<(), RepositoryError> {
            self.insert_job(job).map(|_| ())
        }

        fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
            let tables = self.tables.lock().expect("repository mutex poisoned");
            Ok(tables.jobs.get(id).cloned())
        }

        fn jobs(&self) -> Result<Vec<Job>, RepositoryError> {
            let tables = self.tables.lock().expect("repository mutex poisoned");
            Ok(tables.jobs.values().cloned().collect())
        }

        fn insert_student(
            &self,
            student: StudentProfile,
        ) -> Result<StudentProfile, RepositoryError> {
            let mut tables = self.tables.lock().expect("repository mutex poisoned");
            tables.students.insert(student.id.clone(), student.clone());
            Ok(student)
        }

        fn update_student(&self, student: StudentProfile) -> Result<(), RepositoryError> {
            self.insert_student(student).map(|_| ())
        }

        fn fetch_student(
            &self,
            id: &StudentId,
        ) -> Result<Option<StudentProfile>, RepositoryError> {
            let tables = self.tables.lock().expect("repository mutex poisoned");
            Ok(tables.students.get(id).cloned())
        }

        fn students(&self) -> Result<Vec<StudentProfile>, RepositoryError> {
            let tables = self.tables.lock().expect("repository mutex poisoned");
            Ok(tables.students.values().cloned().collect())
        }

        fn update_company(&self, company: Company) -> Result<(), RepositoryError> {
            let mut tables = self.tables.lock().expect("repository mutex poisoned");
            tables.companies.insert(company.id.clone(), company);
            Ok(())
        }

        fn fetch_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
            let tables = self.tables.lock().expect("repository mutex poisoned");
            Ok(tables.companies.get(id).cloned())
        }

        fn companies(&self) -> Result<Vec<Company>, RepositoryError> {
            let tables = self.tables.lock().expect("repository mutex poisoned");
            Ok(tables.companies.values().cloned().collect())
        }

        fn insert_college(&self, college: College) -> Result<College, RepositoryError> {
            let mut tables = self.tables.lock().expect("repository mutex poisoned");
            tables.colleges.insert(college.id.clone(), college.clone());
            Ok(college)
        }

        fn fetch_college(&self, id: &CollegeId) -> Result<Option<College>, RepositoryError> {
            let tables = self.tables.lock().expect("repository mutex poisoned");
            Ok(tables.colleges.get(id).cloned())
        }

        fn colleges(&self) -> Result<Vec<College>, RepositoryError> {
            let tables = self.tables.lock().expect("repository mutex poisoned");
            Ok(tables.colleges.values().cloned().collect())
        }

        fn insert_application(
            &self,
            application: Application,
        ) -> Result<Application, RepositoryError> {
            let mut tables = self.tables.lock().expect("repository mutex poisoned");
            if tables.applications.values().any(|existing| {
                existing.job_id == application.job_id
                    && existing.student_id == application.student_id
            }) {
                return Err(RepositoryError::Conflict);
            }
            tables
                .applications
                .insert(application.id.clone(), application.clone());
            Ok(application)
        }

        fn update_application(&self, application: Application) -> Result<(), RepositoryError> {
            let mut tables = self.tables.lock().expect("repository mutex poisoned");
            tables
                .applications
                .insert(application.id.clone(), application);
            Ok(())
        }

        fn fetch_application(
            &self,
            id: &ApplicationId,
        ) -> Result<Option<Application>, RepositoryError> {
            let tables = self.tables.lock().expect("repository mutex poisoned");
            Ok(tables.applications.get(id).cloned())
        }

        fn applications(
            &self,
            filter: &ApplicationFilter,
        ) -> Result<Vec<Application>, RepositoryError> {
            let tables = self.tables.lock().expect("repository mutex poisoned");
            Ok(tables
                .applications
                .values()
                .filter(|application| filter.matches(application))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub(super) struct MemoryNotifier {
        sent: Mutex<Vec<Notification>>,
    }

    impl MemoryNotifier {
        pub(super) fn subjects(&self) -> Vec<String> {
            self.sent
                .lock()
                .expect("notifier mutex poisoned")
                .iter()
                .map(|notification| notification.template.subject())
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
}

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use tower::ServiceExt;

use campus_placement::workflows::placement::{
    check_eligibility, is_eligible, match_score, placement_router, qualifies_for_notification,
    Actor, ApplicationStatus, ApplyRequest, EligibilityRejection, PlacementError,
    StatusUpdateRequest, DEFAULT_NOTIFICATION_THRESHOLD,
};

use common::*;

#[test]
fn student_at_minimum_cgpa_is_eligible_before_deadline() {
    let job = job(now() + Duration::days(7));

    assert!(is_eligible(&job, &student(), now()));
}

#[test]
fn same_job_after_deadline_reports_deadline_passed() {
    let job = job(now() - Duration::days(1));

    assert_eq!(
        check_eligibility(&job, &student(), now()),
        Err(EligibilityRejection::DeadlinePassed)
    );
}

#[test]
fn empty_skill_asymmetry_holds() {
    let go = vec!["Go".to_string()];

    assert!(qualifies_for_notification(
        &go,
        &[],
        DEFAULT_NOTIFICATION_THRESHOLD
    ));
    assert_eq!(match_score(&go, &[]), 0);
}

#[test]
fn application_moves_from_submission_to_placement() {
    let (service, _, notifier) = build_service(now() + Duration::days(7));
    let student = Actor::student("stu-nila");
    let company = Actor::company("cmp-acme");

    let ranked = service
        .eligible_jobs(&student, now())
        .expect("eligible listing");
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].match_score, 50);

    let application = service
        .apply(
            &student,
            ApplyRequest {
                job_id: "job-e2e".to_string(),
                cover_letter: None,
            },
            now(),
        )
        .expect("application accepted");

    for (step, status) in ["shortlisted", "hired"].into_iter().enumerate() {
        service
            .update_status(
                &company,
                &application.id,
                StatusUpdateRequest {
                    status: status.to_string(),
                },
                now() + Duration::days(step as i64 + 1),
            )
            .expect("owner updates status");
    }

    let placements = service
        .college_placements(&Actor::college("col-north"))
        .expect("college listing");
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].student_name, "Nila Raman");
    assert_eq!(placements[0].company_name, "Acme Analytics");
    assert_eq!(placements[0].hired_at, now() + Duration::days(2));

    let views = service
        .student_applications(&student)
        .expect("student listing");
    assert_eq!(views[0].application.status, ApplicationStatus::Hired);

    assert_eq!(
        notifier.subjects(),
        vec![
            "New Application Received - Graduate Engineer".to_string(),
            "Application Status Update - Graduate Engineer".to_string(),
            "Application Status Update - Graduate Engineer".to_string(),
        ]
    );

    match service.apply(
        &student,
        ApplyRequest {
            job_id: "job-e2e".to_string(),
            cover_letter: None,
        },
        now(),
    ) {
        Err(PlacementError::AlreadyApplied) => {}
        other => panic!("expected duplicate rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn router_rejects_duplicate_application_with_conflict() {
    let (service, _, _) = build_service(Utc::now() + Duration::days(7));
    let router = placement_router(service);

    let request = || {
        Request::post("/api/v1/student/applications")
            .header("x-portal-role", "student")
            .header("x-portal-user", "stu-nila")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"job_id":"job-e2e"}"#))
            .expect("request builds")
    };

    let first = router
        .clone()
        .oneshot(request())
        .await
        .expect("route executes");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = router.oneshot(request()).await.expect("route executes");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}
