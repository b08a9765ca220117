//! CSV student rosters: bulk import and offline screening against a job's criteria.

mod parser;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

use crate::workflows::placement::{
    check_eligibility, match_score, qualifies_for_notification, EligibilityRejection, Job,
    StudentId, StudentProfile, ValidationError,
};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, source: ValidationError },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read student roster: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::InvalidRow { line, source } => {
                write!(f, "roster line {}: {}", line, source)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::InvalidRow { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<StudentProfile>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parses and validates every row; the first invalid row aborts the import.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<StudentProfile>, RosterImportError> {
        parser::parse_records(reader)?
            .into_iter()
            .map(|record| {
                let id = StudentId(format!("roster-{:04}", record.line - 1));
                record
                    .request
                    .into_profile(id)
                    .map_err(|source| RosterImportError::InvalidRow {
                        line: record.line,
                        source,
                    })
            })
            .collect()
    }
}

/// How one rostered student fares against a job.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningResult {
    pub student_id: StudentId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<EligibilityRejection>,
    pub match_score: u8,
    pub notify: bool,
}

impl ScreeningResult {
    pub fn is_eligible(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Screens students against `job`: eligible candidates first, then by match score.
pub fn screen_roster(
    job: &Job,
    students: &[StudentProfile],
    threshold: f32,
    now: DateTime<Utc>,
) -> Vec<ScreeningResult> {
    let mut results: Vec<ScreeningResult> = students
        .iter()
        .map(|student| {
            let rejection = check_eligibility(job, student, now).err();
            let notify = rejection.is_none()
                && qualifies_for_notification(&job.required_skills, &student.skills, threshold);
            ScreeningResult {
                student_id: student.id.clone(),
                name: student.full_name(),
                email: student.email.clone(),
                rejection,
                match_score: match_score(&job.required_skills, &student.skills),
                notify,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.is_eligible()
            .cmp(&a.is_eligible())
            .then_with(|| b.match_score.cmp(&a.match_score))
    });
    results
}
