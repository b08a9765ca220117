use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::workflows::placement::NewStudentRequest;

/// One data row of a roster export, with its 1-based line number for error reporting.
#[derive(Debug)]
pub(crate) struct RosterRecord {
    pub(crate) line: u64,
    pub(crate) request: NewStudentRequest,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<RosterRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<RosterRow>() {
        let row = record?;
        let line = records.len() as u64 + 2;
        records.push(RosterRecord {
            line,
            request: row.into_request(),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    first_name: String,
    last_name: String,
    email: String,
    college_id: String,
    roll_number: String,
    stream: String,
    graduation_year: u16,
    cgpa: f32,
    phone: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    skills: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    resume_url: Option<String>,
}

impl RosterRow {
    fn into_request(self) -> NewStudentRequest {
        NewStudentRequest {
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            college_id: self.college_id,
            roll_number: self.roll_number,
            stream: self.stream,
            graduation_year: self.graduation_year,
            cgpa: self.cgpa,
            phone: self.phone,
            skills: split_skills(self.skills.as_deref()),
            resume_url: self.resume_url,
        }
    }
}

/// Skills share one cell, separated by `;`.
fn split_skills(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(';')
            .map(str::trim)
            .filter(|skill| !skill.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
