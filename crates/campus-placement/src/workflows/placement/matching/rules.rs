/// Counts required skills covered by the candidate, comparing lower-cased
/// values by substring containment in either direction.
pub(crate) fn matched_skill_count(job_skills: &[String], candidate_skills: &[String]) -> usize {
    let candidate: Vec<String> = candidate_skills
        .iter()
        .map(|skill| skill.to_lowercase())
        .collect();

    job_skills
        .iter()
        .map(|skill| skill.to_lowercase())
        .filter(|required| {
            candidate
                .iter()
                .any(|owned| owned.contains(required.as_str()) || required.contains(owned.as_str()))
        })
        .count()
}

/// Percentage rounded half up, matching how scores are displayed to students.
pub(crate) fn rounded_percent(matched: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (matched * 200 + total) / (total * 2);
    percent.min(100) as u8
}
