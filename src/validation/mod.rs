pub mod audit;
pub mod rules;
pub mod validator;

pub use audit::{audit_draft, audit_hypotheses, audit_signals, AuditFinding};
pub use rules::{ShapeError, ValidationRule};
pub use validator::ResultValidator;
