use crate::infra::parse_deadline;
use campus_placement::error::AppError;
use campus_placement::workflows::placement::{
    match_score, qualifies_for_notification, CollegeId, CompanyId, Job, JobId, JobType,
    DEFAULT_NOTIFICATION_THRESHOLD, KNOWN_STREAMS,
};
use campus_placement::workflows::roster::{screen_roster, RosterImporter, ScreeningResult};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Skills the job requires, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub(crate) job_skills: Vec<String>,
    /// Skills the candidate lists, comma separated (may be empty)
    #[arg(long, value_delimiter = ',')]
    pub(crate) skills: Vec<String>,
    /// Fraction of required skills needed to be notified about the job
    #[arg(long, default_value_t = DEFAULT_NOTIFICATION_THRESHOLD)]
    pub(crate) threshold: f32,
}

#[derive(Args, Debug)]
pub(crate) struct ScreenArgs {
    /// Student roster CSV export
    #[arg(long)]
    pub(crate) roster: PathBuf,
    /// Streams allowed to apply, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub(crate) streams: Vec<String>,
    /// Minimum CGPA (inclusive)
    #[arg(long, default_value_t = 0.0)]
    pub(crate) min_cgpa: f32,
    /// Required skills, comma separated
    #[arg(long, value_delimiter = ',')]
    pub(crate) skills: Vec<String>,
    /// Restrict to these college ids, comma separated (default: all colleges)
    #[arg(long, value_delimiter = ',')]
    pub(crate) colleges: Vec<String>,
    /// Application deadline (RFC 3339 or YYYY-MM-DD). Defaults to 30 days from now.
    #[arg(long, value_parser = parse_deadline)]
    pub(crate) deadline: Option<DateTime<Utc>>,
    /// Fraction of required skills needed to be notified about the job
    #[arg(long, default_value_t = DEFAULT_NOTIFICATION_THRESHOLD)]
    pub(crate) threshold: f32,
    /// Print results as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, PartialEq)]
pub(crate) struct MatchOutcome {
    pub(crate) score: u8,
    pub(crate) notify: bool,
}

pub(crate) fn evaluate_match(args: &MatchArgs) -> Result<MatchOutcome, AppError> {
    let threshold = validate_threshold(args.threshold)?;
    let job_skills = clean(&args.job_skills);
    let skills = clean(&args.skills);

    Ok(MatchOutcome {
        score: match_score(&job_skills, &skills),
        notify: qualifies_for_notification(&job_skills, &skills, threshold),
    })
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let outcome = evaluate_match(&args)?;
    println!("Match score: {}%", outcome.score);
    println!(
        "Job-posting notification at threshold {:.2}: {}",
        args.threshold,
        if outcome.notify { "sent" } else { "skipped" }
    );
    Ok(())
}

pub(crate) fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let threshold = validate_threshold(args.threshold)?;
    let now = Utc::now();
    let job = screening_job(&args, now);
    let students = RosterImporter::from_path(&args.roster)?;
    let results = screen_roster(&job, &students, threshold, now);

    if args.json {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Screening results unavailable as JSON: {err}"),
        }
        return Ok(());
    }

    render_screening(&job, &results);
    Ok(())
}

/// Ad hoc job carrying only the criteria supplied on the command line.
pub(crate) fn screening_job(args: &ScreenArgs, now: DateTime<Utc>) -> Job {
    Job {
        id: JobId("cli-screen".to_string()),
        company_id: CompanyId("cli".to_string()),
        title: "Roster screening".to_string(),
        description: "Criteria supplied on the command line.".to_string(),
        requirements: Vec::new(),
        required_skills: clean(&args.skills),
        location: "n/a".to_string(),
        job_type: JobType::FullTime,
        salary: None,
        allowed_streams: clean(&args.streams)
            .iter()
            .map(|stream| canonical_stream(stream))
            .collect(),
        allowed_colleges: clean(&args.colleges).into_iter().map(CollegeId).collect(),
        min_cgpa: args.min_cgpa,
        application_deadline: args.deadline.unwrap_or(now + Duration::days(30)),
        is_active: true,
        created_at: now,
    }
}

fn render_screening(job: &Job, results: &[ScreeningResult]) {
    let eligible = results.iter().filter(|result| result.is_eligible()).count();
    let notified = results.iter().filter(|result| result.notify).count();

    println!("Roster screening");
    println!(
        "Streams: {} | Min CGPA: {:.2} | Skills: {}",
        job.allowed_streams.join(", "),
        job.min_cgpa,
        if job.required_skills.is_empty() {
            "any".to_string()
        } else {
            job.required_skills.join(", ")
        }
    );
    println!(
        "{} students | {} eligible | {} would be notified",
        results.len(),
        eligible,
        notified
    );

    for result in results {
        let verdict = match result.rejection {
            Some(reason) => format!("ineligible ({reason})"),
            None => "eligible".to_string(),
        };
        println!(
            "- {} <{}>: {} | match {}%{}",
            result.name,
            result.email,
            verdict,
            result.match_score,
            if result.notify { " | notify" } else { "" }
        );
    }
}

fn validate_threshold(threshold: f32) -> Result<f32, AppError> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(AppError::Usage(format!(
            "--threshold must be between 0 and 1, got {threshold}"
        )))
    }
}

fn clean(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn canonical_stream(raw: &str) -> String {
    KNOWN_STREAMS
        .iter()
        .find(|stream| stream.eq_ignore_ascii_case(raw))
        .map(|stream| stream.to_string())
        .unwrap_or_else(|| raw.to_string())
}
