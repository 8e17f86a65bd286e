// All LLM prompt constants for the screening module.
// The JSON-only fragment from llm_client::prompts is appended at call time.

/// System prompt for resume scoring.
pub const SCORING_ROLE: &str = "You are an expert HR assistant. \
    You rank a candidate's resume against a job description. \
    From the resume you MUST extract the candidate's full name and email address. \
    If the provided document is not a resume (e.g. a code file, an invoice, or \
    another irrelevant document), still produce a record: set candidateName to 'N/A', \
    set suitabilityScore to 0, omit candidateEmail, and let the summary explain \
    that the document is not a valid resume.";

/// Scoring prompt template. Replace `{job_description}` and `{resume_text}`
/// before sending.
pub const SCORING_PROMPT_TEMPLATE: &str = r#"Evaluate the following resume against the job description.

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}

Return a JSON object with this EXACT schema (no extra fields):
{
  "candidateName": "full name from the resume, or 'N/A'",
  "candidateEmail": "email address from the resume (omit the field if none is found)",
  "suitabilityScore": 0.82,
  "summary": "brief summary of the candidate's qualifications and experience, highlighting suitability for the role"
}

RULES:
1. suitabilityScore is a number between 0 and 1, with 1 being the most suitable.
2. The summary must address fit for THIS role, not generic strengths.
3. For a non-resume document: candidateName is "N/A", suitabilityScore is 0, and the summary explains why the document is not suitable.
4. Return ONLY the JSON object — nothing else, no code fences."#;
