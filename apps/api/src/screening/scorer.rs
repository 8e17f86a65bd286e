//! Resume Scorer — turns raw resume text into a structured candidate record.
//!
//! The scorer is total: any provider failure, contract violation, or
//! out-of-range score degrades to the documented fallback record instead of
//! erroring. Callers can rely on always getting a persistable candidate.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::models::candidate::ScoredCandidate;
use crate::screening::prompts::{SCORING_PROMPT_TEMPLATE, SCORING_ROLE};

const SCORING_TEMPERATURE: f32 = 0.0;

impl ScoredCandidate {
    /// The record returned whenever a resume cannot be processed.
    pub fn error_fallback() -> Self {
        ScoredCandidate {
            candidate_name: "N/A".to_string(),
            candidate_email: "N/A".to_string(),
            suitability_score: 0.0,
            summary: "Error processing resume.".to_string(),
        }
    }
}

/// The scorer seam. Carried in `AppState` as `Arc<dyn ResumeScorer>` so the
/// ingestion pipeline can be exercised without a live model.
#[async_trait]
pub trait ResumeScorer: Send + Sync {
    async fn score(&self, job_description: &str, resume_text: &str) -> ScoredCandidate;
}

/// Response contract the model must satisfy. Unknown fields reject the
/// response outright; there is no lenient repair of malformed output.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RankingWire {
    candidate_name: String,
    #[serde(default)]
    candidate_email: Option<String>,
    suitability_score: f64,
    summary: String,
}

/// Validates a parsed response against the scorer's invariants.
/// A score outside [0, 1] or a blank name rejects the whole response.
fn validate_ranking(wire: RankingWire) -> Option<ScoredCandidate> {
    if !(0.0..=1.0).contains(&wire.suitability_score) {
        return None;
    }
    if wire.candidate_name.trim().is_empty() {
        return None;
    }
    Some(ScoredCandidate {
        candidate_name: wire.candidate_name,
        candidate_email: wire
            .candidate_email
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "N/A".to_string()),
        suitability_score: wire.suitability_score,
        summary: wire.summary,
    })
}

pub struct LlmResumeScorer {
    llm: LlmClient,
}

impl LlmResumeScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeScorer for LlmResumeScorer {
    async fn score(&self, job_description: &str, resume_text: &str) -> ScoredCandidate {
        let prompt = SCORING_PROMPT_TEMPLATE
            .replace("{job_description}", job_description)
            .replace("{resume_text}", resume_text);
        let system = format!("{SCORING_ROLE} {JSON_ONLY_SYSTEM}");

        match self
            .llm
            .call_json::<RankingWire>(&prompt, &system, SCORING_TEMPERATURE)
            .await
        {
            Ok(wire) => validate_ranking(wire).unwrap_or_else(|| {
                warn!("Scorer response violated invariants, using fallback record");
                ScoredCandidate::error_fallback()
            }),
            Err(e) => {
                warn!("Resume scoring failed, using fallback record: {e}");
                ScoredCandidate::error_fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(score: f64) -> RankingWire {
        RankingWire {
            candidate_name: "Ada Lovelace".to_string(),
            candidate_email: Some("ada@example.com".to_string()),
            suitability_score: score,
            summary: "Strong systems background.".to_string(),
        }
    }

    #[test]
    fn test_fallback_record_exact() {
        let fallback = ScoredCandidate::error_fallback();
        assert_eq!(fallback.candidate_name, "N/A");
        assert_eq!(fallback.candidate_email, "N/A");
        assert_eq!(fallback.suitability_score, 0.0);
        assert_eq!(fallback.summary, "Error processing resume.");
    }

    #[test]
    fn test_valid_ranking_accepted() {
        let candidate = validate_ranking(wire(0.82)).unwrap();
        assert_eq!(candidate.candidate_name, "Ada Lovelace");
        assert_eq!(candidate.suitability_score, 0.82);
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        assert!(validate_ranking(wire(1.2)).is_none());
        assert!(validate_ranking(wire(-0.1)).is_none());
    }

    #[test]
    fn test_boundary_scores_accepted() {
        assert!(validate_ranking(wire(0.0)).is_some());
        assert!(validate_ranking(wire(1.0)).is_some());
    }

    #[test]
    fn test_missing_email_maps_to_na() {
        let mut w = wire(0.5);
        w.candidate_email = None;
        assert_eq!(validate_ranking(w).unwrap().candidate_email, "N/A");
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut w = wire(0.5);
        w.candidate_name = "   ".to_string();
        assert!(validate_ranking(w).is_none());
    }

    #[test]
    fn test_wire_contract_rejects_extra_fields() {
        let parsed: Result<RankingWire, _> = serde_json::from_str(
            r#"{"candidateName":"A","suitabilityScore":0.5,"summary":"ok","rank":1}"#,
        );
        assert!(parsed.is_err());
    }
}
