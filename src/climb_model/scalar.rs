use serde_json::{Number, Value};
use thiserror::Error;

/// A JSON scalar as stored in OpenBeta's variant-typed fields (`grades.*`,
/// `safety`). The upstream schema does not fix a concrete type for these, so
/// they are kept as a tagged union until rendered for flat output.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

/// A variant field held a JSON array or object where a scalar was expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a JSON scalar, found {kind}")]
pub struct NonScalarValue {
    pub kind: &'static str,
}

impl ScalarValue {
    /// Classify a raw JSON value. Arrays and objects are rejected; every
    /// scalar shape is accepted.
    pub fn from_json(value: &Value) -> Result<Self, NonScalarValue> {
        match value {
            Value::Null => Ok(ScalarValue::Null),
            Value::Bool(b) => Ok(ScalarValue::Bool(*b)),
            Value::Number(n) => Ok(ScalarValue::Number(n.clone())),
            Value::String(s) => Ok(ScalarValue::Text(s.clone())),
            Value::Array(_) => Err(NonScalarValue { kind: "array" }),
            Value::Object(_) => Err(NonScalarValue { kind: "object" }),
        }
    }

    /// Display form for tabular output. Null renders as absent, never as the
    /// text "null", so downstream readers can distinguish missing grades from
    /// a grade that happens to spell "null".
    pub fn render(&self) -> Option<String> {
        match self {
            ScalarValue::Null => None,
            ScalarValue::Bool(b) => Some(b.to_string()),
            ScalarValue::Number(n) => Some(n.to_string()),
            ScalarValue::Text(s) => Some(s.clone()),
        }
    }
}
