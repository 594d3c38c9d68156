use super::llm_helper::{language_instruction, query_stage, StageContext};
use crate::model::{BehavioralHypothesis, IdeaContext, Language, Layer, MarketSnapshot};
use crate::pipeline::compact::CompactedIdea;
use crate::pipeline::error::PipelineError;
use crate::pipeline::state::Stage;
use serde::{Deserialize, Serialize};

/// Snapshot plus the five hypotheses, still without evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPayload {
    pub market_snapshot: MarketSnapshot,
    pub behavioral_hypotheses: Vec<BehavioralHypothesis>,
}

fn build_prompt(idea: &IdeaContext, language: Language, compacted: &CompactedIdea) -> String {
    let layers: Vec<&str> = Layer::ALL.iter().map(Layer::as_str).collect();
    let keywords = if compacted.keywords.is_empty() {
        "(none)".to_string()
    } else {
        compacted.keywords.join(", ")
    };
    let tags = if idea.tags.is_empty() {
        "(none)".to_string()
    } else {
        idea.tags.join(", ")
    };

    format!(
        r#"You are drafting the skeleton of a market validation report for a product idea.

Idea:
- Title: {title}
- Summary: {description}
- Tags: {tags}
- Keywords: {keywords}

Produce a market snapshot and exactly 5 behavioral hypotheses, one per funnel layer, in this exact order:
{layer_list}

Rules:
- Do NOT research or cite anything yet. Every hypothesis MUST have "supportingSources": [] and "contradictingSignals": [].
- "evidenceSummary" is an empty string at this stage.
- "confidence" is one of "low" | "medium" | "high" and reflects how plausible the hypothesis is before research.
- {language_rule}

Respond with JSON only:
{{
  "marketSnapshot": {{
    "customerSegment": "who has the problem",
    "marketContext": "the market the idea lives in",
    "geography": "where the first customers are",
    "timingContext": "why now"
  }},
  "behavioralHypotheses": [
    {{
      "layer": "{first_layer}",
      "title": "short hypothesis title",
      "description": "what customers would observably do if the hypothesis holds",
      "evidenceSummary": "",
      "confidence": "medium",
      "supportingSources": [],
      "contradictingSignals": []
    }}
  ]
}}
"#,
        title = idea.title,
        description = compacted.description,
        tags = tags,
        keywords = keywords,
        layer_list = layers
            .iter()
            .enumerate()
            .map(|(i, layer)| format!("{}. {}", i + 1, layer))
            .collect::<Vec<_>>()
            .join("\n"),
        language_rule = language_instruction(language),
        first_layer = layers[0],
    )
}

pub async fn execute(
    ctx: &StageContext<'_>,
    idea: &IdeaContext,
    language: Language,
    compacted: &CompactedIdea,
) -> Result<DraftPayload, PipelineError> {
    let prompt = build_prompt(idea, language, compacted);
    query_stage(ctx, Stage::Draft, prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockCompletionClient, MockResponse, ResponseFormat};
    use crate::pipeline::PipelineConfig;
    use serde_json::json;

    fn compacted() -> CompactedIdea {
        CompactedIdea {
            description: "Connect pet owners with trusted local sitters".to_string(),
            keywords: vec!["pets".to_string(), "marketplace".to_string()],
        }
    }

    fn draft_json() -> serde_json::Value {
        let hypotheses: Vec<_> = Layer::ALL
            .iter()
            .map(|layer| {
                json!({
                    "layer": layer.as_str(),
                    "title": format!("{} hypothesis", layer.as_str()),
                    "description": "Owners act on the need",
                    "evidenceSummary": "",
                    "confidence": "medium",
                    "supportingSources": [],
                    "contradictingSignals": []
                })
            })
            .collect();
        json!({
            "marketSnapshot": {
                "customerSegment": "Urban dog owners",
                "marketContext": "Pet care services",
                "geography": "US metros",
                "timingContext": "Travel rebound"
            },
            "behavioralHypotheses": hypotheses
        })
    }

    #[test]
    fn test_prompt_lists_layers_in_order() {
        let idea = IdeaContext::new("Pet-sitting marketplace").with_tags(["pets", "marketplace"]);
        let prompt = build_prompt(&idea, Language::En, &compacted());

        let positions: Vec<usize> = Layer::ALL
            .iter()
            .map(|layer| prompt.find(&format!(". {}", layer.as_str())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.contains("\"supportingSources\": []"));
        assert!(prompt.contains("Pet-sitting marketplace"));
        assert!(prompt.contains("pets, marketplace"));
        assert!(prompt.contains("English"));
    }

    #[tokio::test]
    async fn test_execute_returns_five_empty_hypotheses() {
        let client = MockCompletionClient::new();
        client.add_response(MockResponse::json(draft_json()));
        let config = PipelineConfig::default();
        let ctx = StageContext::new(&client, &config);
        let idea = IdeaContext::new("Pet-sitting marketplace");

        let draft = execute(&ctx, &idea, Language::Es, &compacted()).await.unwrap();

        let layers: Vec<Layer> = draft.behavioral_hypotheses.iter().map(|h| h.layer).collect();
        assert_eq!(layers, Layer::ALL.to_vec());
        assert!(draft
            .behavioral_hypotheses
            .iter()
            .all(|h| h.supporting_sources.is_empty()));
        assert_eq!(draft.market_snapshot.geography, "US metros");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].uses_tools());
        assert_eq!(requests[0].response_format, Some(ResponseFormat::JsonObject));
        assert_eq!(requests[0].max_output_tokens, config.draft_budget.max_output_tokens);
        assert!(requests[0].input.contains("Spanish"));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_json_parse_error() {
        let client = MockCompletionClient::new();
        client.add_response(MockResponse::json(json!({"marketSnapshot": "nope"})));
        let config = PipelineConfig::default();
        let ctx = StageContext::new(&client, &config);

        let err = execute(&ctx, &IdeaContext::new("x"), Language::En, &compacted())
            .await
            .unwrap_err();

        assert_eq!(err.failed_stage(), Some(Stage::Draft));
        assert_eq!(err.completion_error().map(|e| e.kind()), Some("json_parse"));
    }
}
