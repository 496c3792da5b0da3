//! Structural validation of response-shaped values.

use serde::Serialize;
use serde_json::Value;

/// Message recorded when no response is supplied.
pub const MISSING_RESPONSE: &str = "Response is null or undefined";
/// Message recorded when the response carries no payload.
pub const MISSING_PAYLOAD: &str = "Response has no data property";

/// Anything that may carry a response payload.
pub trait ResponsePayload {
    /// The payload, if the response has one.
    fn payload(&self) -> Option<&Value>;
}

/// A bare JSON value is treated as a `{ "data": ... }` response envelope.
impl ResponsePayload for Value {
    fn payload(&self) -> Option<&Value> {
        self.get("data")
    }
}

/// Outcome of [`validate_response`]. `valid` is true exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationVerdict {
    fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    fn rejected(message: &str) -> Self {
        Self::from_findings(vec![message.to_string()], Vec::new())
    }

    /// True when no error was recorded.
    #[must_use]
    pub const fn valid(&self) -> bool {
        self.valid
    }

    /// Errors in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Warnings in the order they were found.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// True when at least one warning was recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Check a response against a list of required payload fields.
///
/// Checks run in three tiers and stop at the first failing one:
/// 1. no response → single error [`MISSING_RESPONSE`];
/// 2. no payload (absent, `null`, `false`, `0` or `""`) → single error [`MISSING_PAYLOAD`];
/// 3. per field, in order: absent → `Missing required field: <name>` error,
///    present but `null` → `Field <name> is null or undefined` warning.
///
/// A payload that is not a JSON object has no fields, so every required field is missing.
pub fn validate_response<R, F>(response: Option<&R>, required_fields: &[F]) -> ValidationVerdict
where
    R: ResponsePayload + ?Sized,
    F: AsRef<str>,
{
    let Some(response) = response else {
        return ValidationVerdict::rejected(MISSING_RESPONSE);
    };

    let Some(payload) = response.payload().filter(|payload| !is_blank_payload(payload)) else {
        return ValidationVerdict::rejected(MISSING_PAYLOAD);
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for field in required_fields {
        let field = field.as_ref();
        match payload.as_object().and_then(|object| object.get(field)) {
            None => errors.push(format!("Missing required field: {field}")),
            Some(Value::Null) => warnings.push(format!("Field {field} is null or undefined")),
            Some(_) => {},
        }
    }

    ValidationVerdict::from_findings(errors, warnings)
}

/// Scalars that count as "no payload": `null`, `false`, zero and the empty string.
fn is_blank_payload(payload: &Value) -> bool {
    match payload {
        Value::Null | Value::Bool(false) => true,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Bool(true) | Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const NO_FIELDS: &[&str] = &[];

    #[test]
    fn absent_response_short_circuits() {
        let verdict = validate_response::<Value, _>(None, &["a", "b"]);
        assert!(!verdict.valid());
        assert_eq!(verdict.errors(), [MISSING_RESPONSE]);
        assert!(verdict.warnings().is_empty());
    }

    #[test]
    fn absent_or_null_payload_short_circuits() {
        for response in [json!({"status": 200}), json!({"data": null})] {
            let verdict = validate_response(Some(&response), &["a"]);
            assert!(!verdict.valid());
            assert_eq!(verdict.errors(), [MISSING_PAYLOAD]);
            assert!(verdict.warnings().is_empty());
        }
    }

    #[test]
    fn blank_scalar_payload_short_circuits() {
        for response in [json!({"data": 0}), json!({"data": ""}), json!({"data": false})] {
            let verdict = validate_response(Some(&response), &["a"]);
            assert!(!verdict.valid());
            assert_eq!(verdict.errors(), [MISSING_PAYLOAD]);
            assert!(verdict.warnings().is_empty());
        }

        let verdict = validate_response(Some(&json!({"data": true})), &["a"]);
        assert_eq!(verdict.errors(), ["Missing required field: a"]);
    }

    #[test]
    fn missing_field_is_an_error() {
        let response = json!({"data": {"a": 1}});
        let verdict = validate_response(Some(&response), &["a", "b"]);
        assert!(!verdict.valid());
        assert_eq!(verdict.errors(), ["Missing required field: b"]);
        assert!(verdict.warnings().is_empty());
    }

    #[test]
    fn null_field_is_a_warning() {
        let response = json!({"data": {"a": 1, "b": null}});
        let verdict = validate_response(Some(&response), &["a", "b"]);
        assert!(verdict.valid());
        assert!(verdict.errors().is_empty());
        assert_eq!(verdict.warnings(), ["Field b is null or undefined"]);
        assert!(verdict.has_warnings());
    }

    #[test]
    fn findings_keep_field_order() {
        let response = json!({"data": {"b": null, "d": null}});
        let verdict = validate_response(Some(&response), &["d", "c", "b", "a"]);
        assert_eq!(
            verdict.errors(),
            ["Missing required field: c", "Missing required field: a"]
        );
        assert_eq!(
            verdict.warnings(),
            ["Field d is null or undefined", "Field b is null or undefined"]
        );
    }

    #[test]
    fn falsy_but_present_values_pass() {
        let response = json!({"data": {"count": 0, "title": "", "done": false}});
        let verdict = validate_response(Some(&response), &["count", "title", "done"]);
        assert!(verdict.valid());
        assert!(!verdict.has_warnings());
    }

    #[test]
    fn non_object_payload_has_no_fields() {
        let response = json!({"data": [1, 2, 3]});
        assert!(validate_response(Some(&response), NO_FIELDS).valid());
        let verdict = validate_response(Some(&response), &["0"]);
        assert_eq!(verdict.errors(), ["Missing required field: 0"]);
    }

    #[test]
    fn verdict_serializes_all_fields() -> Result<(), serde_json::Error> {
        let response = json!({"data": {"a": null}});
        let verdict = validate_response(Some(&response), &["a"]);
        assert_eq!(
            serde_json::to_value(&verdict)?,
            json!({"valid": true, "errors": [], "warnings": ["Field a is null or undefined"]})
        );
        Ok(())
    }

    proptest! {
        #[test]
        fn absent_response_ignores_required_fields(fields in prop::collection::vec("[a-z]{1,8}", 0..8)) {
            let verdict = validate_response::<Value, _>(None, fields.as_slice());
            prop_assert!(!verdict.valid());
            prop_assert_eq!(verdict.errors(), [MISSING_RESPONSE.to_string()]);
            prop_assert!(verdict.warnings().is_empty());
        }

        #[test]
        fn valid_iff_no_errors(
            present in prop::collection::btree_set("[a-z]{1,4}", 0..6),
            required in prop::collection::vec("[a-z]{1,4}", 0..6),
        ) {
            let data: serde_json::Map<String, Value> =
                present.iter().map(|key| (key.clone(), json!(1))).collect();
            let response = json!({ "data": data });
            let verdict = validate_response(Some(&response), required.as_slice());
            prop_assert_eq!(verdict.valid(), verdict.errors().is_empty());
            let missing = required.iter().filter(|field| !present.contains(*field)).count();
            prop_assert_eq!(verdict.errors().len(), missing);
        }
    }
}
