use super::llm_helper::{language_instruction, query_stage, StageContext};
use crate::model::{BehavioralHypothesis, IdeaContext, Language};
use crate::pipeline::error::PipelineError;
use crate::pipeline::state::Stage;
use crate::validation::audit::{
    BEHAVIORAL_SOURCES_PER_HYPOTHESIS, CONTRADICTING_SIGNAL_MAX_CHARS,
    HYPOTHESIS_SNIPPET_MAX_CHARS, MAX_CONTRADICTING_SIGNALS, QUANTITATIVE_SOURCES_PER_HYPOTHESIS,
    SOURCES_PER_HYPOTHESIS,
};
use serde::{Deserialize, Serialize};

/// The researched hypotheses; replaces the draft list wholesale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypothesisEvidencePayload {
    pub behavioral_hypotheses: Vec<BehavioralHypothesis>,
}

fn build_prompt(idea: &IdeaContext, language: Language, skeleton: &[BehavioralHypothesis]) -> String {
    let skeleton_json =
        serde_json::to_string_pretty(skeleton).unwrap_or_else(|_| "[]".to_string());
    let total_sources = SOURCES_PER_HYPOTHESIS * skeleton.len().max(1);

    format!(
        r#"You are researching evidence for the behavioral hypotheses of a market validation report.

Idea: {title}
{description}

Hypotheses to research (keep "layer", "title" and "description" unchanged, keep the order):
{skeleton}

Use web search. For EACH hypothesis attach exactly {per_hypothesis} supportingSources:
- {behavioral} with "evidenceType": "behavioral" showing what people actually do. Prefer user-generated content: forums, Reddit threads, reviews, community Q&A.
- {quantitative} with "evidenceType": "quantitative": market sizes, search volumes, pricing or survey numbers.

Domain rules:
- The {per_hypothesis} sources of a hypothesis come from {per_hypothesis} different domains.
- No domain may appear twice anywhere in your answer. All {total} sources use distinct domains. "www.example.com" and "example.com" are the same domain.
- Every "url" must be a real page you found in this search session.

Content rules:
- "snippet" is a short quote or paraphrase of at most {snippet_max} characters.
- "evidenceSummary" summarises what the sources show, in one or two sentences.
- "confidence" is "low" | "medium" | "high" based on the evidence found.
- "contradictingSignals" holds 0 to {max_contradictions} strings of at most {contradiction_max} characters each, describing evidence against the hypothesis.
- {language_rule}

Respond with JSON only, no commentary:
{{
  "behavioralHypotheses": [
    {{
      "layer": "existence",
      "title": "...",
      "description": "...",
      "evidenceSummary": "...",
      "confidence": "medium",
      "supportingSources": [
        {{"title": "page title", "url": "https://...", "evidenceType": "behavioral", "snippet": "..."}}
      ],
      "contradictingSignals": []
    }}
  ]
}}
"#,
        title = idea.title,
        description = idea.description,
        skeleton = skeleton_json,
        per_hypothesis = SOURCES_PER_HYPOTHESIS,
        behavioral = BEHAVIORAL_SOURCES_PER_HYPOTHESIS,
        quantitative = QUANTITATIVE_SOURCES_PER_HYPOTHESIS,
        total = total_sources,
        snippet_max = HYPOTHESIS_SNIPPET_MAX_CHARS,
        max_contradictions = MAX_CONTRADICTING_SIGNALS,
        contradiction_max = CONTRADICTING_SIGNAL_MAX_CHARS,
        language_rule = language_instruction(language),
    )
}

/// Returns the enriched hypotheses unverified; counts and domain uniqueness
/// are checked afterwards by the audit.
pub async fn execute(
    ctx: &StageContext<'_>,
    idea: &IdeaContext,
    language: Language,
    skeleton: &[BehavioralHypothesis],
) -> Result<HypothesisEvidencePayload, PipelineError> {
    let prompt = build_prompt(idea, language, skeleton);
    query_stage(ctx, Stage::HypothesisEvidence, prompt).await
}
