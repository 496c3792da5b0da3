//! Inputs and outcomes of instrumented JSON parsing.

use serde::Serialize;
use serde_json::Value;

/// Raw input to parse: text is parsed, structured values pass through.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonInput {
    /// JSON text.
    Text(String),
    /// Already-decoded value.
    Structured(Value),
}

impl JsonInput {
    /// Kind reported in the success line: `"string"` for text, otherwise the
    /// kind of the structured value.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) | Self::Structured(Value::String(_)) => "string",
            Self::Structured(Value::Number(_)) => "number",
            Self::Structured(Value::Bool(_)) => "boolean",
            Self::Structured(Value::Null | Value::Array(_) | Value::Object(_)) => "object",
        }
    }
}

impl From<&str> for JsonInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for JsonInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for JsonInput {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// Why a parse failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseFailure {
    /// Parser message.
    pub message: String,
    /// 1-based line of the failure.
    pub line: usize,
    /// 1-based column of the failure.
    pub column: usize,
    /// Leading characters of the raw input.
    pub preview: String,
}

/// Tagged result of [`crate::Diagnostics::log_json_parsing`]; failures are values, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Parsed (or passed-through) value.
    Success(Value),
    /// Parse failure with a truncated preview of the input.
    Failure(ParseFailure),
}

impl ParseOutcome {
    /// True for [`Self::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Parsed value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Consume into a `Result`.
    pub fn into_result(self) -> Result<Value, ParseFailure> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(failure) => Err(failure),
        }
    }
}
