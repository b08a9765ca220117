use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for posted jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

/// Identifier wrapper for registered students.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollegeId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub String);

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

/// Academic streams a student may be enrolled in.
pub const KNOWN_STREAMS: [&str; 9] = [
    "Computer Science",
    "Information Technology",
    "Electronics",
    "Mechanical",
    "Civil",
    "Electrical",
    "Chemical",
    "Biotechnology",
    "Other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Internship,
    Contract,
}

impl JobType {
    pub const fn label(self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Internship => "Internship",
            JobType::Contract => "Contract",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u32,
    pub max: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// A job posting together with the constraints used to gate applicants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub company_id: CompanyId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub required_skills: Vec<String>,
    pub location: String,
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryRange>,
    pub allowed_streams: Vec<String>,
    /// Empty means every college may apply.
    #[serde(default)]
    pub allowed_colleges: Vec<CollegeId>,
    pub min_cgpa: f32,
    pub application_deadline: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Student attributes consulted by eligibility and skill matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: StudentId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub college_id: CollegeId,
    pub roll_number: String,
    pub stream: String,
    pub graduation_year: u16,
    pub cgpa: f32,
    pub phone: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
}

impl StudentProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub email: String,
    pub industry: String,
    pub city: String,
    pub is_approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct College {
    pub id: CollegeId,
    pub name: String,
    pub email: String,
    pub city: String,
}

/// Status tracked for every application from submission to decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Hired,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Rejected | ApplicationStatus::Hired)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(raw.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub student_id: StudentId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub status_updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
}

/// Portal roles supplied by the authentication collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    College,
    Company,
    Student,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::College => "college",
            Role::Company => "company",
            Role::Student => "student",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "college" => Some(Role::College),
            "company" => Some(Role::Company),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

/// Authenticated caller of a portal operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub role: Role,
    pub id: String,
}

impl Actor {
    pub fn new(role: Role, id: impl Into<String>) -> Self {
        Self {
            role,
            id: id.into(),
        }
    }

    pub fn student(id: impl Into<String>) -> Self {
        Self::new(Role::Student, id)
    }

    pub fn company(id: impl Into<String>) -> Self {
        Self::new(Role::Company, id)
    }

    pub fn college(id: impl Into<String>) -> Self {
        Self::new(Role::College, id)
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(Role::Admin, id)
    }
}
