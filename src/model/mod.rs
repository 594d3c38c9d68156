//! Domain types for market validation runs

mod idea;
mod report;

pub use idea::{IdeaContext, Language};
pub use report::{
    BehavioralHypothesis, Confidence, ConflictsAndGaps, EvidenceType, Finding, Layer,
    MarketSignal, MarketSnapshot, MarketValidationResult, SearchData, SignalType, Source,
    Strength, SynthesisAndNextSteps, SCHEMA_VERSION,
};
