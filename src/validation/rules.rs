use serde_json::Value;
use thiserror::Error;

/// Top-level sections every report must carry, in check order
pub const REQUIRED_KEYS: [&str; 5] = [
    "marketSnapshot",
    "behavioralHypotheses",
    "marketSignals",
    "conflictsAndGaps",
    "synthesisAndNextSteps",
];

/// Sections that must be JSON arrays
pub const ARRAY_KEYS: [&str; 2] = ["behavioralHypotheses", "marketSignals"];

/// First shape violation found in an assembled report
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("Result is not a JSON object")]
    NotAnObject,

    #[error("Missing required key '{0}'")]
    MissingKey(String),

    #[error("Invalid type for '{key}': expected {expected}")]
    InvalidType { key: String, expected: &'static str },
}

impl ShapeError {
    /// Name of the offending field, if the error concerns one
    pub fn field(&self) -> Option<&str> {
        match self {
            ShapeError::NotAnObject => None,
            ShapeError::MissingKey(key) | ShapeError::InvalidType { key, .. } => Some(key),
        }
    }
}

pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, result: &Value) -> Result<(), ShapeError>;
}

pub struct ObjectRule;

impl ValidationRule for ObjectRule {
    fn name(&self) -> &'static str {
        "Object"
    }

    fn validate(&self, result: &Value) -> Result<(), ShapeError> {
        if result.is_object() {
            Ok(())
        } else {
            Err(ShapeError::NotAnObject)
        }
    }
}

pub struct RequiredKeysRule;

impl ValidationRule for RequiredKeysRule {
    fn name(&self) -> &'static str {
        "RequiredKeys"
    }

    /// A key holding `null` counts as present; the type rules judge it
    fn validate(&self, result: &Value) -> Result<(), ShapeError> {
        let object = result.as_object().ok_or(ShapeError::NotAnObject)?;
        match REQUIRED_KEYS.iter().find(|key| !object.contains_key(**key)) {
            Some(key) => Err(ShapeError::MissingKey(key.to_string())),
            None => Ok(()),
        }
    }
}

pub struct ArrayTypesRule;

impl ValidationRule for ArrayTypesRule {
    fn name(&self) -> &'static str {
        "ArrayTypes"
    }

    fn validate(&self, result: &Value) -> Result<(), ShapeError> {
        for key in ARRAY_KEYS {
            if !result.get(key).map_or(false, Value::is_array) {
                return Err(ShapeError::InvalidType {
                    key: key.to_string(),
                    expected: "array",
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "marketSnapshot": {},
            "behavioralHypotheses": [],
            "marketSignals": [],
            "conflictsAndGaps": {},
            "synthesisAndNextSteps": {}
        })
    }

    #[test]
    fn test_object_rule() {
        assert!(ObjectRule.validate(&valid()).is_ok());
        assert_eq!(ObjectRule.validate(&Value::Null), Err(ShapeError::NotAnObject));
        assert_eq!(ObjectRule.validate(&json!([1])), Err(ShapeError::NotAnObject));
    }

    #[test]
    fn test_required_keys_reports_first_missing() {
        let mut value = valid();
        let object = value.as_object_mut().unwrap();
        object.remove("marketSignals");
        object.remove("synthesisAndNextSteps");

        assert_eq!(
            RequiredKeysRule.validate(&value),
            Err(ShapeError::MissingKey("marketSignals".to_string()))
        );
    }

    #[test]
    fn test_array_types_rule() {
        let mut value = valid();
        value["marketSignals"] = json!({"not": "an array"});

        let err = ArrayTypesRule.validate(&value).unwrap_err();
        assert_eq!(err.field(), Some("marketSignals"));
        assert!(err.to_string().contains("expected array"));
    }
}
