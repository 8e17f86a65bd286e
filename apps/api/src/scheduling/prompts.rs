// All LLM prompt constants for the scheduling module.
// The JSON-only fragment from llm_client::prompts is appended at call time.

/// System prompt for interview email drafting.
pub const DRAFT_ROLE: &str = "You are an expert HR assistant drafting warm, \
    professional interview invitation emails on behalf of a hiring team. \
    The tone is friendly and encouraging, never stiff.";

/// Drafting prompt template. Replace `{candidate_name}`, `{job_title}` and
/// `{interview_time}` before sending.
pub const DRAFT_PROMPT_TEMPLATE: &str = r#"Draft a friendly and professional email to a candidate named {candidate_name} inviting them to an interview for the {job_title} position.

The interview is scheduled for {interview_time}.

The email should:
- Have a clear subject line.
- Thank them for their application.
- Mention that the team was impressed with their background.
- Clearly state the date and time of the interview.
- Ask them to confirm if the time works for them.
- Be signed by "The Hiring Team, ResumeRank".

Return a JSON object with exactly two keys: "subject" and "body". The body is plain text with Markdown emphasis allowed."#;
