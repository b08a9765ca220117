mod rules;

use rules::{matched_skill_count, rounded_percent};

/// Minimum fraction of required skills a student must cover to hear about a new job.
pub const DEFAULT_NOTIFICATION_THRESHOLD: f32 = 0.4;

/// Percentage (0..=100) of `job_skills` covered by `candidate_skills`.
///
/// An empty list on either side scores 0.
pub fn match_score(job_skills: &[String], candidate_skills: &[String]) -> u8 {
    if job_skills.is_empty() || candidate_skills.is_empty() {
        return 0;
    }

    let matched = matched_skill_count(job_skills, candidate_skills);
    rounded_percent(matched, job_skills.len())
}

/// Decides whether a student should be told about a newly posted job.
///
/// Students without recorded skills are always notified, and so is everyone
/// when the job lists no skills. This intentionally differs from
/// [`match_score`], which reports 0 for the same inputs.
pub fn qualifies_for_notification(
    job_skills: &[String],
    candidate_skills: &[String],
    threshold: f32,
) -> bool {
    if candidate_skills.is_empty() || job_skills.is_empty() {
        return true;
    }

    let matched = matched_skill_count(job_skills, candidate_skills);
    let fraction = matched as f32 / job_skills.len() as f32;
    fraction >= threshold
}
