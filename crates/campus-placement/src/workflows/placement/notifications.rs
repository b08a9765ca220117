use serde::{Deserialize, Serialize};

use super::domain::ApplicationStatus;

const SIGNATURE: &str = "Best regards,\nCampus Placement Team";

/// Message kinds the portal sends, each carrying its own template data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationTemplate {
    ApplicationStatusChanged {
        student_name: String,
        job_title: String,
        company_name: String,
        status: ApplicationStatus,
    },
    NewApplication {
        company_name: String,
        student_name: String,
        job_title: String,
    },
    JobPosted {
        student_name: String,
        job_title: String,
        company_name: String,
        location: String,
    },
}

impl NotificationTemplate {
    pub const fn kind(&self) -> &'static str {
        match self {
            NotificationTemplate::ApplicationStatusChanged { .. } => "application_status_changed",
            NotificationTemplate::NewApplication { .. } => "new_application",
            NotificationTemplate::JobPosted { .. } => "job_posted",
        }
    }

    pub fn subject(&self) -> String {
        match self {
            NotificationTemplate::ApplicationStatusChanged { job_title, .. } => {
                format!("Application Status Update - {job_title}")
            }
            NotificationTemplate::NewApplication { job_title, .. } => {
                format!("New Application Received - {job_title}")
            }
            NotificationTemplate::JobPosted { job_title, .. } => {
                format!("New Job Opportunity - {job_title}")
            }
        }
    }

    pub fn body(&self) -> String {
        match self {
            NotificationTemplate::ApplicationStatusChanged {
                student_name,
                job_title,
                company_name,
                status,
            } => {
                let closing = match status {
                    ApplicationStatus::Shortlisted => {
                        "Congratulations! You've been shortlisted. The company will contact you soon.\n"
                    }
                    ApplicationStatus::Hired => {
                        "Congratulations! You've been selected for the position!\n"
                    }
                    ApplicationStatus::Rejected => {
                        "Thank you for your interest. We encourage you to apply for other opportunities.\n"
                    }
                    ApplicationStatus::Applied => "",
                };
                format!(
                    "Hello {student_name},\n\nYour application for {job_title} at {company_name} has been updated.\nNew status: {}\n{closing}\nLog in to your dashboard to view more details.\n\n{SIGNATURE}",
                    status.label().to_uppercase()
                )
            }
            NotificationTemplate::NewApplication {
                company_name,
                student_name,
                job_title,
            } => format!(
                "Hello {company_name},\n\nYou have received a new application for {job_title}.\nCandidate: {student_name}\n\nLog in to your dashboard to review the application.\n\n{SIGNATURE}"
            ),
            NotificationTemplate::JobPosted {
                student_name,
                job_title,
                company_name,
                location,
            } => format!(
                "Hello {student_name},\n\nA new job matching your profile has been posted.\nPosition: {job_title}\nCompany: {company_name}\nLocation: {location}\n\nLog in to your dashboard to view details and apply.\n\n{SIGNATURE}"
            ),
        }
    }
}

/// Outbound message addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: String,
    pub template: NotificationTemplate,
}

impl Notification {
    pub fn new(recipient: impl Into<String>, template: NotificationTemplate) -> Self {
        Self {
            recipient: recipient.into(),
            template,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_body_mentions_new_status() {
        let template = NotificationTemplate::ApplicationStatusChanged {
            student_name: "Asha Rao".to_string(),
            job_title: "Backend Engineer".to_string(),
            company_name: "TechCorp".to_string(),
            status: ApplicationStatus::Shortlisted,
        };

        assert_eq!(template.subject(), "Application Status Update - Backend Engineer");
        let body = template.body();
        assert!(body.contains("SHORTLISTED"));
        assert!(body.contains("shortlisted"));
        assert_eq!(template.kind(), "application_status_changed");
    }
}
