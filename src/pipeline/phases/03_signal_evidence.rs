use super::llm_helper::{language_instruction, query_stage, StageContext};
use crate::model::{IdeaContext, Language, MarketSignal, SignalType};
use crate::pipeline::error::PipelineError;
use crate::pipeline::state::Stage;
use crate::validation::audit::{SIGNAL_COUNT, SIGNAL_SNIPPET_MAX_CHARS, SOURCES_PER_SIGNAL};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalEvidencePayload {
    pub market_signals: Vec<MarketSignal>,
}

fn build_prompt(idea: &IdeaContext, language: Language, banned_domains: &[String]) -> String {
    let signal_list = SignalType::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}", i + 1, t.as_str()))
        .collect::<Vec<_>>()
        .join("\n");
    let banned = if banned_domains.is_empty() {
        "(none)".to_string()
    } else {
        banned_domains.join(", ")
    };

    format!(
        r#"You are researching market signals for a product idea.

Idea: {title}
{description}

Use web search to produce exactly {count} market signals, one per type, in this exact order:
{signal_list}

Source rules:
- Each signal has exactly {per_signal} sources from {per_signal} different domains.
- All {total} sources in your answer use distinct domains. "www.example.com" and "example.com" are the same domain.
- These domains are already used elsewhere in the report and MUST NOT be cited: {banned}
- If you cannot find a clean pair of sources for a signal, still emit the signal: use the best remaining sources with "evidenceType": "directional" on both and set "strength": "low". Never omit a signal and never reuse a domain.

Content rules:
- "evidenceSnippets" holds exactly {per_signal} strings of at most {snippet_max} characters; snippet N quotes or paraphrases source N.
- "classification" is a short label for what the signal indicates.
- "strength" is "low" | "medium" | "high".
- {language_rule}

Respond with JSON only, no commentary:
{{
  "marketSignals": [
    {{
      "type": "{first_type}",
      "title": "...",
      "summary": "...",
      "classification": "...",
      "evidenceSnippets": ["...", "..."],
      "sources": [
        {{"title": "page title", "url": "https://...", "evidenceType": "behavioral", "snippet": "..."}},
        {{"title": "page title", "url": "https://...", "evidenceType": "quantitative", "snippet": "..."}}
      ],
      "strength": "medium"
    }}
  ]
}}
"#,
        title = idea.title,
        description = idea.description,
        count = SIGNAL_COUNT,
        signal_list = signal_list,
        per_signal = SOURCES_PER_SIGNAL,
        total = SIGNAL_COUNT * SOURCES_PER_SIGNAL,
        banned = banned,
        snippet_max = SIGNAL_SNIPPET_MAX_CHARS,
        language_rule = language_instruction(language),
        first_type = SignalType::ALL[0].as_str(),
    )
}

pub async fn execute(
    ctx: &StageContext<'_>,
    idea: &IdeaContext,
    language: Language,
    banned_domains: &[String],
) -> Result<SignalEvidencePayload, PipelineError> {
    let prompt = build_prompt(idea, language, banned_domains);
    query_stage(ctx, Stage::SignalEvidence, prompt).await
}
