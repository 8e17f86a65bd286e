//! Email Drafter — personalized interview invitations with a deterministic
//! fallback so the product degrades gracefully when the provider is down.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::models::candidate::CandidateRow;
use crate::models::job::JobRow;
use crate::scheduling::prompts::{DRAFT_PROMPT_TEMPLATE, DRAFT_ROLE};

const DRAFT_TEMPERATURE: f32 = 0.5;

/// A drafted email. Doubles as the strict response contract for the LLM call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

/// Drafts an interview invitation. Total: any provider or contract failure
/// returns the fallback template instead of erroring.
pub async fn draft_email(
    llm: &LlmClient,
    job: &JobRow,
    candidate: &CandidateRow,
    interview_time: &str,
) -> EmailContent {
    let prompt = DRAFT_PROMPT_TEMPLATE
        .replace("{candidate_name}", &candidate.candidate_name)
        .replace("{job_title}", &job.title)
        .replace("{interview_time}", interview_time);
    let system = format!("{DRAFT_ROLE} {JSON_ONLY_SYSTEM}");

    match llm
        .call_json::<EmailContent>(&prompt, &system, DRAFT_TEMPERATURE)
        .await
    {
        Ok(email) if !email.subject.trim().is_empty() && !email.body.trim().is_empty() => email,
        Ok(_) => {
            warn!("Drafter returned an empty subject or body, using fallback template");
            fallback_email(&job.title, &candidate.candidate_name, interview_time)
        }
        Err(e) => {
            warn!(
                "Email drafting failed for '{}', using fallback template: {e}",
                candidate.candidate_name
            );
            fallback_email(&job.title, &candidate.candidate_name, interview_time)
        }
    }
}

/// The deterministic fallback invitation.
pub fn fallback_email(job_title: &str, candidate_name: &str, interview_time: &str) -> EmailContent {
    EmailContent {
        subject: format!("Interview Invitation for the {job_title} Position at ResumeRank"),
        body: format!(
            "Hi {candidate_name},\n\n\
             Thank you for your application for the {job_title} position. \
             Our team was impressed with your background, especially your \
             experience highlighted in your resume.\n\n\
             We would like to invite you to an interview to discuss your \
             qualifications further. The interview is scheduled for:\n\n\
             **Date & Time:** {interview_time}\n\n\
             Please let us know if this time works for you. We look forward \
             to speaking with you soon.\n\n\
             Best regards,\n\n\
             The Hiring Team\n\
             ResumeRank"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_deterministic() {
        let a = fallback_email("Backend Engineer", "Jane Doe", "2026-03-02T09:00:00Z");
        let b = fallback_email("Backend Engineer", "Jane Doe", "2026-03-02T09:00:00Z");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fallback_mentions_all_details() {
        let email = fallback_email("Backend Engineer", "Jane Doe", "2026-03-02T09:00:00Z");
        assert!(email.subject.contains("Backend Engineer"));
        assert!(email.body.contains("Jane Doe"));
        assert!(email.body.contains("2026-03-02T09:00:00Z"));
        assert!(email.body.contains("The Hiring Team"));
    }

    #[test]
    fn test_contract_rejects_extra_keys() {
        let parsed: Result<EmailContent, _> =
            serde_json::from_str(r#"{"subject":"s","body":"b","tone":"warm"}"#);
        assert!(parsed.is_err());
    }
}
