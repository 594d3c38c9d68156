use super::draft::DraftPayload;
use super::hypothesis_evidence::HypothesisEvidencePayload;
use super::signal_evidence::SignalEvidencePayload;
use super::synthesis::SynthesisPayload;
use crate::model::{MarketValidationResult, SearchData, SCHEMA_VERSION};
use chrono::Utc;
use tracing::warn;

/// Outputs of every stage, moved into the final report
pub struct StageOutputs {
    pub draft: DraftPayload,
    pub hypotheses: HypothesisEvidencePayload,
    pub signals: SignalEvidencePayload,
    pub synthesis: SynthesisPayload,
    pub keywords: Vec<String>,
}

/// Builds the report. The researched hypotheses replace the draft ones; only
/// the draft snapshot survives from the first stage.
pub fn execute(outputs: StageOutputs, enforce_list_bounds: bool) -> MarketValidationResult {
    let StageOutputs {
        draft,
        hypotheses,
        signals,
        synthesis,
        keywords,
    } = outputs;

    let mut synthesis_and_next_steps = synthesis.synthesis_and_next_steps;
    if enforce_list_bounds {
        let dropped = synthesis_and_next_steps.truncate_to_bounds();
        if dropped > 0 {
            warn!(dropped, "Truncated over-long synthesis lists");
        }
    }

    MarketValidationResult {
        market_snapshot: draft.market_snapshot,
        behavioral_hypotheses: hypotheses.behavioral_hypotheses,
        market_signals: signals.market_signals,
        conflicts_and_gaps: synthesis.conflicts_and_gaps,
        synthesis_and_next_steps,
        search_data: SearchData::placeholder(keywords),
        generated_at: Utc::now(),
        schema_version: SCHEMA_VERSION.to_string(),
    }
}
