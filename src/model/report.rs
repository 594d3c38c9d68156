//! Report sections produced by the pipeline stages
//!
//! Field names serialize in camelCase and enum values in snake_case, which is
//! the wire shape both the completion service is asked to produce and the
//! downstream consumer reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version stamped on every assembled result
pub const SCHEMA_VERSION: &str = "2.0";

/// Behavioral funnel stage a hypothesis maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Existence,
    Awareness,
    Consideration,
    Intent,
    PayIntention,
}

impl Layer {
    /// Every layer, in funnel order
    pub const ALL: [Layer; 5] = [
        Layer::Existence,
        Layer::Awareness,
        Layer::Consideration,
        Layer::Intent,
        Layer::PayIntention,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Existence => "existence",
            Layer::Awareness => "awareness",
            Layer::Consideration => "consideration",
            Layer::Intent => "intent",
            Layer::PayIntention => "pay_intention",
        }
    }
}

/// Fixed market-signal categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    ExistingWorkarounds,
    Competitors,
    SocialTrend,
    CostPerAttention,
    ChannelFit,
    ShareTriggers,
    MarketSophistication,
    ObjectionDensity,
}

impl SignalType {
    /// Every signal type, in report order
    pub const ALL: [SignalType; 8] = [
        SignalType::ExistingWorkarounds,
        SignalType::Competitors,
        SignalType::SocialTrend,
        SignalType::CostPerAttention,
        SignalType::ChannelFit,
        SignalType::ShareTriggers,
        SignalType::MarketSophistication,
        SignalType::ObjectionDensity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::ExistingWorkarounds => "existing_workarounds",
            SignalType::Competitors => "competitors",
            SignalType::SocialTrend => "social_trend",
            SignalType::CostPerAttention => "cost_per_attention",
            SignalType::ChannelFit => "channel_fit",
            SignalType::ShareTriggers => "share_triggers",
            SignalType::MarketSophistication => "market_sophistication",
            SignalType::ObjectionDensity => "objection_density",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Strength of a market signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Low,
    Medium,
    High,
}

impl Strength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::Low => "low",
            Strength::Medium => "medium",
            Strength::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceType {
    /// Observed behaviour: forum threads, reviews, community posts
    Behavioral,
    /// Numbers: market sizes, search volumes, pricing data
    Quantitative,
    /// Survey answers or stated preferences
    Stated,
    /// Weak, indirect evidence
    Directional,
}

/// A cited piece of evidence, owned by the hypothesis or signal citing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub title: String,
    pub url: String,
    pub evidence_type: EvidenceType,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub customer_segment: String,
    pub market_context: String,
    pub geography: String,
    pub timing_context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralHypothesis {
    pub layer: Layer,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub evidence_summary: String,
    pub confidence: Confidence,
    #[serde(default)]
    pub supporting_sources: Vec<Source>,
    #[serde(default)]
    pub contradicting_signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSignal {
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub classification: String,
    #[serde(default)]
    pub evidence_snippets: Vec<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
    pub strength: Strength,
}

/// A tagged finding inside `ConflictsAndGaps`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictsAndGaps {
    #[serde(default)]
    pub contradictions: Vec<Finding>,
    #[serde(default)]
    pub missing_signals: Vec<Finding>,
    #[serde(default)]
    pub risk_flags: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisAndNextSteps {
    #[serde(default)]
    pub strong_points: Vec<String>,
    #[serde(default)]
    pub weak_points: Vec<String>,
    #[serde(default)]
    pub key_unknowns: Vec<String>,
    #[serde(default)]
    pub suggested_next_steps: Vec<String>,
    #[serde(default)]
    pub pivot_guidance: Vec<String>,
}

impl SynthesisAndNextSteps {
    pub const MAX_STRONG_POINTS: usize = 5;
    pub const MAX_WEAK_POINTS: usize = 5;
    pub const MAX_KEY_UNKNOWNS: usize = 6;
    pub const MAX_NEXT_STEPS: usize = 7;
    pub const MAX_PIVOT_GUIDANCE: usize = 4;

    /// Cuts every list down to its documented bound. Returns how many items
    /// were dropped in total.
    pub fn truncate_to_bounds(&mut self) -> usize {
        let mut dropped = 0;
        for (list, max) in [
            (&mut self.strong_points, Self::MAX_STRONG_POINTS),
            (&mut self.weak_points, Self::MAX_WEAK_POINTS),
            (&mut self.key_unknowns, Self::MAX_KEY_UNKNOWNS),
            (&mut self.suggested_next_steps, Self::MAX_NEXT_STEPS),
            (&mut self.pivot_guidance, Self::MAX_PIVOT_GUIDANCE),
        ] {
            if list.len() > max {
                dropped += list.len() - max;
                list.truncate(max);
            }
        }
        dropped
    }
}

/// Keyword search-volume data. Not collected by this pipeline; the block is
/// kept so consumers see a stable shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    pub collected: bool,
    pub keywords: Vec<String>,
    pub note: String,
}

impl SearchData {
    pub fn placeholder(keywords: Vec<String>) -> Self {
        Self {
            collected: false,
            keywords,
            note: "Search volume data is not collected by this pipeline".to_string(),
        }
    }
}

/// The assembled report returned by a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketValidationResult {
    pub market_snapshot: MarketSnapshot,
    pub behavioral_hypotheses: Vec<BehavioralHypothesis>,
    pub market_signals: Vec<MarketSignal>,
    pub conflicts_and_gaps: ConflictsAndGaps,
    pub synthesis_and_next_steps: SynthesisAndNextSteps,
    pub search_data: SearchData,
    pub generated_at: DateTime<Utc>,
    pub schema_version: String,
}
