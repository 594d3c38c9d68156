//! Canned stage payloads shared by the integration tests

#![allow(dead_code)]

use ideacheck::model::{IdeaContext, Layer, SignalType};
use ideacheck::{MockCompletionClient, MockResponse};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn pet_sitting_idea() -> IdeaContext {
    IdeaContext::new("Pet-sitting marketplace").with_tags(["pets", "marketplace"])
}

pub fn draft_payload() -> Value {
    let hypotheses: Vec<Value> = Layer::ALL
        .iter()
        .map(|layer| {
            json!({
                "layer": layer.as_str(),
                "title": format!("Owners show {}", layer.as_str()),
                "description": "Pet owners act on the need for trusted sitters",
                "evidenceSummary": "",
                "confidence": "medium",
                "supportingSources": [],
                "contradictingSignals": []
            })
        })
        .collect();

    json!({
        "marketSnapshot": {
            "customerSegment": "Urban pet owners who travel",
            "marketContext": "Pet care services",
            "geography": "US metro areas",
            "timingContext": "Travel demand has recovered"
        },
        "behavioralHypotheses": hypotheses
    })
}

/// URL of source `source` of hypothesis `hypothesis`; every one is on its own
/// domain
pub fn hypothesis_source_url(hypothesis: usize, source: usize) -> String {
    format!("https://www.h{}-s{}.example.com/thread", hypothesis, source)
}

pub fn hypothesis_payload() -> Value {
    let hypotheses: Vec<Value> = Layer::ALL
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let sources: Vec<Value> = (0..5)
                .map(|j| {
                    json!({
                        "title": format!("Evidence {}-{}", i, j),
                        "url": hypothesis_source_url(i, j),
                        "evidenceType": if j < 3 { "behavioral" } else { "quantitative" },
                        "snippet": "Owners post weekly asking for a reliable sitter"
                    })
                })
                .collect();
            json!({
                "layer": layer.as_str(),
                "title": format!("Owners show {}", layer.as_str()),
                "description": "Pet owners act on the need for trusted sitters",
                "evidenceSummary": "Repeated requests across communities",
                "confidence": "high",
                "supportingSources": sources,
                "contradictingSignals": ["Many owners rely on family instead"]
            })
        })
        .collect();

    json!({ "behavioralHypotheses": hypotheses })
}

pub fn signal_payload() -> Value {
    let signals: Vec<Value> = SignalType::ALL
        .iter()
        .enumerate()
        .map(|(i, signal_type)| {
            json!({
                "type": signal_type.as_str(),
                "title": format!("Signal {}", signal_type.as_str()),
                "summary": "Observed in the market",
                "classification": "supporting",
                "evidenceSnippets": ["First observation", "Second observation"],
                "sources": [
                    {
                        "title": "First",
                        "url": format!("https://sig{}-a.example.org/post", i),
                        "evidenceType": "behavioral",
                        "snippet": "First observation"
                    },
                    {
                        "title": "Second",
                        "url": format!("https://sig{}-b.example.org/data", i),
                        "evidenceType": "quantitative",
                        "snippet": "Second observation"
                    }
                ],
                "strength": "medium"
            })
        })
        .collect();

    json!({ "marketSignals": signals })
}

pub fn synthesis_payload() -> Value {
    json!({
        "conflictsAndGaps": {
            "contradictions": [
                {"type": "trust", "description": "Owners want sitters but distrust strangers"}
            ],
            "missingSignals": [
                {"type": "pricing", "description": "No data on willingness to pay per night"}
            ],
            "riskFlags": [
                {"type": "incumbents", "description": "Established platforms dominate search"}
            ]
        },
        "synthesisAndNextSteps": {
            "strongPoints": ["Frequent, visible demand"],
            "weakPoints": ["Crowded market"],
            "keyUnknowns": ["Price sensitivity"],
            "suggestedNextSteps": ["Interview 15 frequent travellers with dogs"],
            "pivotGuidance": ["Focus on exotic pets"]
        }
    })
}

pub fn stage_responses() -> Vec<MockResponse> {
    vec![
        MockResponse::json(draft_payload()).with_response_id("resp_draft"),
        MockResponse::json(hypothesis_payload()).with_response_id("resp_hypotheses"),
        MockResponse::json(signal_payload()).with_response_id("resp_signals"),
        MockResponse::json(synthesis_payload()).with_response_id("resp_synthesis"),
    ]
}

/// Mock client answering the four stages successfully, in order
pub fn successful_client() -> Arc<MockCompletionClient> {
    let client = Arc::new(MockCompletionClient::new());
    client.add_responses(stage_responses());
    client
}
