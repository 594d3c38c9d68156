use crate::model::MarketValidationResult;
use crate::validation::rules::{
    ArrayTypesRule, ObjectRule, RequiredKeysRule, ShapeError, ValidationRule,
};
use serde_json::Value;
use tracing::debug;

/// Shallow shape gate run on the assembled report before it is returned.
///
/// Checks only that the report is an object carrying the five sections and
/// that the two list sections are arrays. Lengths, enum membership and domain
/// uniqueness are outside its remit (see [`crate::validation::audit`]).
pub struct ResultValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ResultValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    pub fn validate(&self, result: &Value) -> Result<(), ShapeError> {
        for rule in &self.rules {
            if let Err(e) = rule.validate(result) {
                debug!(rule = rule.name(), "Shape validation failed: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Serializes the typed report and validates its wire shape
    pub fn validate_result(&self, result: &MarketValidationResult) -> Result<Value, ShapeError> {
        let value = serde_json::to_value(result).map_err(|_| ShapeError::NotAnObject)?;
        self.validate(&value)?;
        Ok(value)
    }
}

impl Default for ResultValidator {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(ObjectRule),
                Box::new(RequiredKeysRule),
                Box::new(ArrayTypesRule),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConflictsAndGaps, MarketSnapshot, SearchData, SynthesisAndNextSteps, SCHEMA_VERSION};
    use serde_json::json;

    fn create_minimal_valid_result() -> Value {
        json!({
            "marketSnapshot": {
                "customerSegment": "Urban pet owners",
                "marketContext": "Growing pet spend",
                "geography": "US",
                "timingContext": "Post-pandemic travel rebound"
            },
            "behavioralHypotheses": [],
            "marketSignals": [],
            "conflictsAndGaps": {"contradictions": [], "missingSignals": [], "riskFlags": []},
            "synthesisAndNextSteps": {}
        })
    }

    #[test]
    fn test_validator_valid_result() {
        let validator = ResultValidator::new();
        assert!(validator.validate(&create_minimal_valid_result()).is_ok());
    }

    #[test]
    fn test_validator_missing_market_snapshot() {
        let mut value = create_minimal_valid_result();
        value.as_object_mut().unwrap().remove("marketSnapshot");

        let result = ResultValidator::new().validate(&value);

        assert_eq!(
            result,
            Err(ShapeError::MissingKey("marketSnapshot".to_string()))
        );
    }

    #[test]
    fn test_validator_null_hypotheses() {
        let mut value = create_minimal_valid_result();
        value["behavioralHypotheses"] = Value::Null;

        let err = ResultValidator::new().validate(&value).unwrap_err();

        assert!(matches!(err, ShapeError::InvalidType { ref key, .. } if key == "behavioralHypotheses"));
    }

    #[test]
    fn test_validator_null_result() {
        assert_eq!(
            ResultValidator::new().validate(&Value::Null),
            Err(ShapeError::NotAnObject)
        );
    }

    #[test]
    fn test_validator_does_not_check_lengths() {
        let mut value = create_minimal_valid_result();
        value["marketSignals"] = json!([{"anything": true}]);
        assert!(ResultValidator::new().validate(&value).is_ok());
    }

    #[test]
    fn test_validate_typed_result() {
        let result = MarketValidationResult {
            market_snapshot: MarketSnapshot {
                customer_segment: "a".to_string(),
                market_context: "b".to_string(),
                geography: "c".to_string(),
                timing_context: "d".to_string(),
            },
            behavioral_hypotheses: vec![],
            market_signals: vec![],
            conflicts_and_gaps: ConflictsAndGaps::default(),
            synthesis_and_next_steps: SynthesisAndNextSteps::default(),
            search_data: SearchData::placeholder(vec![]),
            generated_at: chrono::Utc::now(),
            schema_version: SCHEMA_VERSION.to_string(),
        };

        let value = ResultValidator::new().validate_result(&result).unwrap();
        assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
    }

    #[test]
    fn test_custom_rules() {
        let validator = ResultValidator::with_rules(vec![Box::new(ObjectRule)]);
        assert!(validator.validate(&json!({})).is_ok());
    }
}
