use crate::infra::{InMemoryPlacementRepository, RecordingNotifier};
use campus_placement::error::AppError;
use campus_placement::workflows::placement::{
    Actor, ApplicationId, ApplicationQuery, ApplyRequest, CompanyId, NewJobRequest,
    PlacementError, PlacementPolicy, PlacementService, SalaryRange, StatusUpdateRequest,
    TransitionPolicy,
};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use std::sync::Arc;

type DemoService = PlacementService<InMemoryPlacementRepository, RecordingNotifier>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reject backward status moves such as hired -> applied.
    #[arg(long)]
    pub(crate) forward_only: bool,
    /// Stop after applications are submitted.
    #[arg(long)]
    pub(crate) skip_status_updates: bool,
    /// Print the body of every notification instead of only its subject.
    #[arg(long)]
    pub(crate) show_bodies: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct DemoSummary {
    pub(crate) notified_students: usize,
    pub(crate) applications: usize,
    pub(crate) placements: usize,
    pub(crate) notifications: usize,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let show_bodies = args.show_bodies;
    let notifier = RecordingNotifier::default();
    let service = demo_service(&args, notifier.clone());

    println!("Campus placement walkthrough");
    let summary = walkthrough(&service, &notifier, &args, Utc::now())?;

    println!("\nNotifications queued ({})", summary.notifications);
    for notification in notifier.sent() {
        println!(
            "- [{}] {} -> {}",
            notification.template.kind(),
            notification.recipient,
            notification.template.subject()
        );
        if show_bodies {
            for line in notification.template.body().lines() {
                println!("    {line}");
            }
        }
    }

    Ok(())
}

fn demo_service(args: &DemoArgs, notifier: RecordingNotifier) -> DemoService {
    let mut policy = PlacementPolicy::default();
    if args.forward_only {
        policy.transition_policy = TransitionPolicy::ForwardOnly;
    }

    PlacementService::new(
        Arc::new(InMemoryPlacementRepository::seeded()),
        Arc::new(notifier),
        policy,
    )
}

fn walkthrough(
    service: &DemoService,
    notifier: &RecordingNotifier,
    args: &DemoArgs,
    now: DateTime<Utc>,
) -> Result<DemoSummary, AppError> {
    let mut summary = DemoSummary::default();
    let recruiter = Actor::company("cmp-acme");

    println!("\n1. Acme Cloud Systems posts a job");
    let posting = service.post_job(&recruiter, sample_job(now), now)?;
    let job = posting.job;
    summary.notified_students = posting.notified_students;
    println!(
        "   {} ({}) | streams: {} | min CGPA {:.1} | {} students notified",
        job.title,
        job.job_type.label(),
        job.allowed_streams.join(", "),
        job.min_cgpa,
        posting.notified_students
    );

    println!("\n2. Students browse and apply");
    let mut application_ids: Vec<ApplicationId> = Vec::new();
    for student in ["stu-asha", "stu-ravi", "stu-meera", "stu-arjun"] {
        let actor = Actor::student(student);
        let visible = service.eligible_jobs(&actor, now)?;
        let score = visible
            .iter()
            .find(|ranked| ranked.job.id == job.id)
            .map(|ranked| ranked.match_score);

        let request = ApplyRequest {
            job_id: job.id.0.clone(),
            cover_letter: None,
        };
        match service.apply(&actor, request, now) {
            Ok(application) => {
                println!(
                    "   {student}: applied ({} match) as {}",
                    score.map_or_else(|| "n/a".to_string(), |score| format!("{score}%")),
                    application.id.0
                );
                application_ids.push(application.id);
            }
            Err(PlacementError::Eligibility(reason)) => {
                println!("   {student}: not eligible ({reason})");
            }
            Err(other) => return Err(other.into()),
        }
    }
    summary.applications = application_ids.len();

    if let Some(first) = application_ids.first() {
        let retry = ApplyRequest {
            job_id: job.id.0.clone(),
            cover_letter: Some("Applying again".to_string()),
        };
        match service.apply(&Actor::student("stu-asha"), retry, now) {
            Err(PlacementError::AlreadyApplied) => {
                println!("   stu-asha: second application rejected ({first} kept)", first = first.0)
            }
            Err(other) => return Err(other.into()),
            Ok(_) => println!("   stu-asha: second application unexpectedly accepted"),
        }
    }

    if !args.skip_status_updates {
        println!("\n3. Acme reviews its applicants");
        let decisions = ["shortlisted", "hired"];
        for (application_id, status) in application_ids.iter().zip(decisions) {
            let updated = service.update_status(
                &recruiter,
                application_id,
                StatusUpdateRequest {
                    status: status.to_string(),
                },
                now,
            )?;
            println!("   {} -> {}", updated.id.0, updated.status.label());
        }
        if let Some(application_id) = application_ids.first() {
            let promoted = service.update_status(
                &recruiter,
                application_id,
                StatusUpdateRequest {
                    status: "hired".to_string(),
                },
                now,
            )?;
            println!("   {} -> {}", promoted.id.0, promoted.status.label());
        }

        let hired = service.company_applications(
            &recruiter,
            &ApplicationQuery {
                job_id: Some(job.id.0.clone()),
                status: Some("hired".to_string()),
            },
        )?;
        println!("   hired candidates: {}", hired.len());

        println!("\n4. Colleges see their placements");
        for college in ["col-northfield", "col-riverside"] {
            let placements = service.college_placements(&Actor::college(college))?;
            summary.placements += placements.len();
            for record in &placements {
                println!(
                    "   {college}: {} placed at {} as {}",
                    record.student_name, record.company_name, record.job_title
                );
            }
            if placements.is_empty() {
                println!("   {college}: no placements yet");
            }
        }
    }

    println!("\n5. Admin approves pending companies");
    let admin = Actor::admin("placement-office");
    let company = service.approve_company(&admin, &CompanyId("cmp-globex".to_string()))?;
    println!("   {} approved: {}", company.name, company.is_approved);

    let analytics = service.analytics(&admin)?;
    println!(
        "   {} students | {} companies | {} jobs | {} applications | {} placements | {} pending approvals",
        analytics.total_students,
        analytics.total_companies,
        analytics.total_jobs,
        analytics.total_applications,
        analytics.total_placements,
        analytics.pending_approvals
    );
    for (status, count) in &analytics.status_distribution {
        println!("   {status}: {count}");
    }

    summary.notifications = notifier.sent().len();
    Ok(summary)
}

fn sample_job(now: DateTime<Utc>) -> NewJobRequest {
    NewJobRequest {
        title: "Graduate Platform Engineer".to_string(),
        description: "Build and operate the internal deployment platform with the SRE team."
            .to_string(),
        requirements: vec!["Comfortable on a Linux shell".to_string()],
        skills: vec![
            "Rust".to_string(),
            "PostgreSQL".to_string(),
            "Kubernetes".to_string(),
        ],
        location: "Bengaluru".to_string(),
        job_type: "Full-time".to_string(),
        salary: Some(SalaryRange {
            min: 900_000,
            max: 1_400_000,
            currency: "INR".to_string(),
        }),
        allowed_colleges: Vec::new(),
        allowed_streams: vec![
            "Computer Science".to_string(),
            "Information Technology".to_string(),
        ],
        min_cgpa: 7.5,
        application_deadline: now + Duration::days(21),
    }
}
