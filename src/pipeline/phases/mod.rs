// Stages of a market validation run
//
// Each stage is self-contained with its own prompt builder and typed payload.
// Stages only read earlier outputs; none of them mutates a prior result.

pub mod llm_helper;

#[path = "01_draft.rs"]
pub mod draft;
#[path = "02_hypothesis_evidence.rs"]
pub mod hypothesis_evidence;
#[path = "03_signal_evidence.rs"]
pub mod signal_evidence;
#[path = "04_synthesis.rs"]
pub mod synthesis;
#[path = "05_assemble.rs"]
pub mod assemble;

pub use llm_helper::StageContext;
