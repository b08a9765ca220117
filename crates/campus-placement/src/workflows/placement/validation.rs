use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationStatus, College, CollegeId, CompanyId, Job, JobId, JobType, SalaryRange,
    StudentId, StudentProfile, KNOWN_STREAMS,
};

const MAX_CGPA: f32 = 10.0;
const GRADUATION_YEARS: std::ops::RangeInclusive<u16> = 2020..=2030;

/// Malformed input rejected before any placement rule runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("at least one {field} is required")]
    EmptyList { field: &'static str },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
    #[error("unknown stream '{0}'")]
    UnknownStream(String),
    #[error("unknown job type '{0}'")]
    UnknownJobType(String),
    #[error("unknown application status '{0}'")]
    UnknownStatus(String),
    #[error("unknown company filter '{0}', expected pending, approved or all")]
    UnknownFilter(String),
    #[error("salary minimum {min} exceeds maximum {max}")]
    InvertedSalary { min: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJobRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub location: String,
    pub job_type: String,
    #[serde(default)]
    pub salary: Option<SalaryRange>,
    #[serde(default)]
    pub allowed_colleges: Vec<String>,
    pub allowed_streams: Vec<String>,
    pub min_cgpa: f32,
    pub application_deadline: DateTime<Utc>,
}

impl NewJobRequest {
    pub fn into_job(
        self,
        id: JobId,
        company_id: CompanyId,
        now: DateTime<Utc>,
    ) -> Result<Job, ValidationError> {
        require_len("title", &self.title, 2)?;
        require_len("description", &self.description, 20)?;
        require_len("location", &self.location, 2)?;
        let job_type = parse_job_type(&self.job_type)?;
        let required_skills = require_non_empty("skill", normalize_list(self.skills))?;
        let allowed_streams = validate_streams(self.allowed_streams)?;
        let min_cgpa = validate_cgpa("min_cgpa", self.min_cgpa)?;
        if let Some(salary) = &self.salary {
            validate_salary(salary)?;
        }

        Ok(Job {
            id,
            company_id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            requirements: normalize_list(self.requirements),
            required_skills,
            location: self.location.trim().to_string(),
            job_type,
            salary: self.salary,
            allowed_streams,
            allowed_colleges: normalize_list(self.allowed_colleges)
                .into_iter()
                .map(CollegeId)
                .collect(),
            min_cgpa,
            application_deadline: self.application_deadline,
            is_active: true,
            created_at: now,
        })
    }
}

/// Partial job edit; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobUpdateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub allowed_streams: Option<Vec<String>>,
    #[serde(default)]
    pub allowed_colleges: Option<Vec<String>>,
    #[serde(default)]
    pub min_cgpa: Option<f32>,
    #[serde(default)]
    pub application_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl JobUpdateRequest {
    pub fn apply_to(self, job: &mut Job) -> Result<(), ValidationError> {
        let mut updated = job.clone();

        if let Some(title) = self.title {
            require_len("title", &title, 2)?;
            updated.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            require_len("description", &description, 20)?;
            updated.description = description.trim().to_string();
        }
        if let Some(skills) = self.skills {
            updated.required_skills = require_non_empty("skill", normalize_list(skills))?;
        }
        if let Some(location) = self.location {
            require_len("location", &location, 2)?;
            updated.location = location.trim().to_string();
        }
        if let Some(streams) = self.allowed_streams {
            updated.allowed_streams = validate_streams(streams)?;
        }
        if let Some(colleges) = self.allowed_colleges {
            updated.allowed_colleges = normalize_list(colleges).into_iter().map(CollegeId).collect();
        }
        if let Some(min_cgpa) = self.min_cgpa {
            updated.min_cgpa = validate_cgpa("min_cgpa", min_cgpa)?;
        }
        if let Some(deadline) = self.application_deadline {
            updated.application_deadline = deadline;
        }
        if let Some(is_active) = self.is_active {
            updated.is_active = is_active;
        }

        *job = updated;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyRequest {
    pub job_id: String,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

impl ApplyRequest {
    pub fn validate(self) -> Result<(JobId, Option<String>), ValidationError> {
        require_len("job_id", &self.job_id, 1)?;
        let cover_letter = self
            .cover_letter
            .map(|letter| letter.trim().to_string())
            .filter(|letter| !letter.is_empty());
        Ok((JobId(self.job_id.trim().to_string()), cover_letter))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

impl StatusUpdateRequest {
    pub fn validate(&self) -> Result<ApplicationStatus, ValidationError> {
        ApplicationStatus::parse(&self.status)
            .ok_or_else(|| ValidationError::UnknownStatus(self.status.clone()))
    }
}

/// Optional filters a company may apply when listing its applicants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationQuery {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ApplicationQuery {
    pub fn validate(&self) -> Result<(Option<JobId>, Option<ApplicationStatus>), ValidationError> {
        let job_id = self
            .job_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| JobId(id.to_string()));
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                ApplicationStatus::parse(raw)
                    .ok_or_else(|| ValidationError::UnknownStatus(raw.to_string()))?,
            ),
        };
        Ok((job_id, status))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudentRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub college_id: String,
    pub roll_number: String,
    pub stream: String,
    pub graduation_year: u16,
    pub cgpa: f32,
    pub phone: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
}

impl NewStudentRequest {
    pub fn into_profile(self, id: StudentId) -> Result<StudentProfile, ValidationError> {
        let email = validate_email(&self.email)?;
        require_len("first_name", &self.first_name, 2)?;
        require_len("last_name", &self.last_name, 2)?;
        require_len("college_id", &self.college_id, 1)?;
        require_len("roll_number", &self.roll_number, 1)?;
        require_len("phone", &self.phone, 10)?;
        let stream = validate_stream(&self.stream)?;
        let cgpa = validate_cgpa("cgpa", self.cgpa)?;
        validate_graduation_year(self.graduation_year)?;

        Ok(StudentProfile {
            id,
            email,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            college_id: CollegeId(self.college_id.trim().to_string()),
            roll_number: self.roll_number.trim().to_string(),
            stream,
            graduation_year: self.graduation_year,
            cgpa,
            phone: self.phone.trim().to_string(),
            skills: normalize_list(self.skills),
            resume_url: self.resume_url.filter(|url| !url.trim().is_empty()),
        })
    }
}

/// Fields a student may change on their own profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub resume_url: Option<String>,
}

impl StudentProfileUpdate {
    /// Validates every supplied field before touching `student`.
    pub fn apply_to(self, student: &mut StudentProfile) -> Result<(), ValidationError> {
        let mut updated = student.clone();

        if let Some(first_name) = self.first_name {
            require_len("first_name", &first_name, 2)?;
            updated.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = self.last_name {
            require_len("last_name", &last_name, 2)?;
            updated.last_name = last_name.trim().to_string();
        }
        if let Some(phone) = self.phone {
            require_len("phone", &phone, 10)?;
            updated.phone = phone.trim().to_string();
        }
        if let Some(skills) = self.skills {
            updated.skills = normalize_list(skills);
        }
        if let Some(resume_url) = self.resume_url {
            let trimmed = resume_url.trim();
            updated.resume_url = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }

        *student = updated;
        Ok(())
    }
}

/// Admin edit of a student record; academic fields are admin-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecordUpdate {
    #[serde(flatten)]
    pub profile: StudentProfileUpdate,
    #[serde(default)]
    pub stream: Option<String>,
    #[serde(default)]
    pub cgpa: Option<f32>,
    #[serde(default)]
    pub graduation_year: Option<u16>,
}

impl StudentRecordUpdate {
    pub fn apply_to(self, student: &mut StudentProfile) -> Result<(), ValidationError> {
        let mut updated = student.clone();
        self.profile.apply_to(&mut updated)?;

        if let Some(stream) = self.stream {
            updated.stream = validate_stream(&stream)?;
        }
        if let Some(cgpa) = self.cgpa {
            updated.cgpa = validate_cgpa("cgpa", cgpa)?;
        }
        if let Some(year) = self.graduation_year {
            updated.graduation_year = validate_graduation_year(year)?;
        }

        *student = updated;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCollegeRequest {
    pub name: String,
    pub email: String,
    pub city: String,
}

impl NewCollegeRequest {
    pub fn into_college(self, id: CollegeId) -> Result<College, ValidationError> {
        require_len("name", &self.name, 2)?;
        let email = validate_email(&self.email)?;
        require_len("city", &self.city, 2)?;

        Ok(College {
            id,
            name: self.name.trim().to_string(),
            email,
            city: self.city.trim().to_string(),
        })
    }
}

/// `?filter=pending|approved|all` on the admin company listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyQuery {
    #[serde(default)]
    pub filter: Option<String>,
}

impl CompanyQuery {
    /// Approval state to keep, `None` meaning every company.
    pub fn validate(&self) -> Result<Option<bool>, ValidationError> {
        match self.filter.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "all" => Ok(None),
                "pending" => Ok(Some(false)),
                "approved" => Ok(Some(true)),
                _ => Err(ValidationError::UnknownFilter(raw.to_string())),
            },
        }
    }
}

fn require_len(field: &'static str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.trim().chars().count() < min {
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}

fn require_non_empty(
    field: &'static str,
    values: Vec<String>,
) -> Result<Vec<String>, ValidationError> {
    if values.is_empty() {
        return Err(ValidationError::EmptyList { field });
    }
    Ok(values)
}

/// Trims entries, drops blanks, and removes case-insensitive duplicates keeping the first spelling.
pub(crate) fn normalize_list(values: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        if normalized
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(trimmed))
        {
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    normalized
}

pub(crate) fn validate_cgpa(field: &'static str, value: f32) -> Result<f32, ValidationError> {
    if !value.is_finite() || !(0.0..=MAX_CGPA).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            min: 0.0,
            max: MAX_CGPA,
        });
    }
    Ok(value)
}

pub(crate) fn validate_stream(raw: &str) -> Result<String, ValidationError> {
    KNOWN_STREAMS
        .iter()
        .find(|stream| stream.eq_ignore_ascii_case(raw.trim()))
        .map(|stream| stream.to_string())
        .ok_or_else(|| ValidationError::UnknownStream(raw.to_string()))
}

fn validate_streams(values: Vec<String>) -> Result<Vec<String>, ValidationError> {
    let streams = normalize_list(values)
        .iter()
        .map(|stream| validate_stream(stream))
        .collect::<Result<Vec<String>, ValidationError>>()?;
    require_non_empty("stream", normalize_list(streams))
}

fn validate_graduation_year(year: u16) -> Result<u16, ValidationError> {
    if !GRADUATION_YEARS.contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "graduation_year",
            min: f32::from(*GRADUATION_YEARS.start()),
            max: f32::from(*GRADUATION_YEARS.end()),
        });
    }
    Ok(year)
}

pub(crate) fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(ValidationError::InvalidEmail(raw.to_string()))
    }
}

fn parse_job_type(raw: &str) -> Result<JobType, ValidationError> {
    match raw.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
        "full-time" | "fulltime" => Ok(JobType::FullTime),
        "part-time" | "parttime" => Ok(JobType::PartTime),
        "internship" => Ok(JobType::Internship),
        "contract" => Ok(JobType::Contract),
        _ => Err(ValidationError::UnknownJobType(raw.to_string())),
    }
}

fn validate_salary(salary: &SalaryRange) -> Result<(), ValidationError> {
    if salary.min > salary.max {
        return Err(ValidationError::InvertedSalary {
            min: salary.min,
            max: salary.max,
        });
    }
    Ok(())
}
