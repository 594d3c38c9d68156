use super::llm_helper::{language_instruction, query_stage, StageContext};
use crate::model::{
    BehavioralHypothesis, ConflictsAndGaps, Language, MarketSignal, MarketSnapshot,
    SynthesisAndNextSteps,
};
use crate::pipeline::error::PipelineError;
use crate::pipeline::state::Stage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisPayload {
    pub conflicts_and_gaps: ConflictsAndGaps,
    pub synthesis_and_next_steps: SynthesisAndNextSteps,
}

/// Prior stage outputs the synthesis may draw on
#[derive(Debug, Serialize)]
pub struct SynthesisInput<'a> {
    #[serde(rename = "marketSnapshot")]
    pub market_snapshot: &'a MarketSnapshot,
    #[serde(rename = "behavioralHypotheses")]
    pub hypotheses: &'a [BehavioralHypothesis],
    #[serde(rename = "marketSignals")]
    pub signals: &'a [MarketSignal],
}

fn build_prompt(input: &SynthesisInput<'_>, language: Language) -> String {
    let evidence = serde_json::to_string_pretty(input).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"You are writing the synthesis of a market validation report.

Use ONLY the evidence below. Do not browse. Do not introduce URLs, sources or facts that are not in it.

Evidence:
{evidence}

Produce:
- "conflictsAndGaps": "contradictions" (hypotheses or signals that disagree), "missingSignals" (evidence that should exist but was not found), "riskFlags" (threats to the idea). Each entry is {{"type": "short_label", "description": "..."}}.
- "synthesisAndNextSteps" with at most {strong} "strongPoints", at most {weak} "weakPoints", at most {unknowns} "keyUnknowns", at most {steps} "suggestedNextSteps" and at most {pivots} "pivotGuidance" items, each a plain string.
- {language_rule}

Respond with JSON only:
{{
  "conflictsAndGaps": {{
    "contradictions": [{{"type": "...", "description": "..."}}],
    "missingSignals": [],
    "riskFlags": []
  }},
  "synthesisAndNextSteps": {{
    "strongPoints": [],
    "weakPoints": [],
    "keyUnknowns": [],
    "suggestedNextSteps": [],
    "pivotGuidance": []
  }}
}}
"#,
        evidence = evidence,
        strong = SynthesisAndNextSteps::MAX_STRONG_POINTS,
        weak = SynthesisAndNextSteps::MAX_WEAK_POINTS,
        unknowns = SynthesisAndNextSteps::MAX_KEY_UNKNOWNS,
        steps = SynthesisAndNextSteps::MAX_NEXT_STEPS,
        pivots = SynthesisAndNextSteps::MAX_PIVOT_GUIDANCE,
        language_rule = language_instruction(language),
    )
}

pub async fn execute(
    ctx: &StageContext<'_>,
    input: &SynthesisInput<'_>,
    language: Language,
) -> Result<SynthesisPayload, PipelineError> {
    let prompt = build_prompt(input, language);
    query_stage(ctx, Stage::Synthesis, prompt).await
}
