use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Application, ApplicationId, CollegeId, Job, StudentId, StudentProfile};

/// Job visible to a student, annotated with how well their skills fit.
#[derive(Debug, Clone, Serialize)]
pub struct RankedJob {
    #[serde(flatten)]
    pub job: Job,
    pub match_score: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobPostingOutcome {
    pub job: Job,
    pub notified_students: usize,
}

/// Application as listed on the student's dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct StudentApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
    pub company_name: String,
}

/// Subset of the student profile shared with recruiting companies.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicantSummary {
    pub student_id: StudentId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cgpa: f32,
    pub stream: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
}

impl From<&StudentProfile> for ApplicantSummary {
    fn from(student: &StudentProfile) -> Self {
        Self {
            student_id: student.id.clone(),
            name: student.full_name(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            cgpa: student.cgpa,
            stream: student.stream.clone(),
            resume_url: student.resume_url.clone(),
        }
    }
}

/// Application as listed for the recruiting company.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<ApplicantSummary>,
}

/// Hired application reported back to the student's college.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementRecord {
    pub application_id: ApplicationId,
    pub student_name: String,
    pub student_email: String,
    pub job_title: String,
    pub company_name: String,
    pub hired_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CollegePlacementCount {
    pub college_id: CollegeId,
    pub college_name: String,
    pub placements: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StreamCount {
    pub stream: String,
    pub students: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementAnalytics {
    pub total_students: usize,
    pub total_companies: usize,
    pub total_colleges: usize,
    pub total_jobs: usize,
    pub total_applications: usize,
    pub total_placements: usize,
    pub pending_approvals: usize,
    pub status_distribution: BTreeMap<&'static str, usize>,
    pub placements_per_college: Vec<CollegePlacementCount>,
    pub stream_distribution: Vec<StreamCount>,
}
