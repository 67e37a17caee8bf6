//! Field rules for the product schema.
//!
//! Every rule is plain data plus a pure check function. Checks return the
//! normalized value (trimmed text, finite price) or a [`FieldViolation`]
//! carrying the caller-facing message. Raw JSON values go through the same
//! casting a document mapper would apply: numbers and booleans become text
//! for text fields, numeric strings become prices.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum length of a product name, in characters, after trimming.
pub const NAME_MAX_CHARS: usize = 100;

/// Maximum length of a product description, in characters, after trimming.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// A single field-level rule failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// One or more field constraints were violated.
///
/// Violations are kept in schema declaration order with at most one entry
/// per field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", summarize(.violations))]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldViolation::new(field, message)])
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.violations
    }

    /// Returns true if any violation refers to `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rule for a required, trimmed, length-bounded text field.
#[derive(Debug, Clone, Copy)]
pub struct TextRule {
    pub field: &'static str,
    pub max_chars: usize,
    pub required: &'static str,
    pub too_long: &'static str,
    pub not_text: &'static str,
}

pub const NAME_RULE: TextRule = TextRule {
    field: "name",
    max_chars: NAME_MAX_CHARS,
    required: "Product name is required",
    too_long: "Product name cannot exceed 100 characters",
    not_text: "Product name must be a string",
};

pub const DESCRIPTION_RULE: TextRule = TextRule {
    field: "description",
    max_chars: DESCRIPTION_MAX_CHARS,
    required: "Product description is required",
    too_long: "Description cannot exceed 500 characters",
    not_text: "Product description must be a string",
};

impl TextRule {
    fn violation(&self, message: &str) -> FieldViolation {
        FieldViolation::new(self.field, message)
    }

    /// Trim and bound-check a text value.
    pub fn check(&self, raw: &str) -> Result<String, FieldViolation> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(self.violation(self.required));
        }
        if trimmed.chars().count() > self.max_chars {
            return Err(self.violation(self.too_long));
        }
        Ok(trimmed.to_string())
    }

    /// Check a raw JSON value supplied for this field.
    pub fn check_json(&self, value: &Value) -> Result<String, FieldViolation> {
        match value {
            Value::String(s) => self.check(s),
            Value::Number(n) => self.check(&n.to_string()),
            Value::Bool(b) => self.check(&b.to_string()),
            Value::Null => Err(self.violation(self.required)),
            Value::Array(_) | Value::Object(_) => Err(self.violation(self.not_text)),
        }
    }
}

/// Rule for the non-negative price field.
#[derive(Debug, Clone, Copy)]
pub struct PriceRule {
    pub field: &'static str,
    pub required: &'static str,
    pub negative: &'static str,
    pub not_numeric: &'static str,
}

pub const PRICE_RULE: PriceRule = PriceRule {
    field: "price",
    required: "Product price is required",
    negative: "Price cannot be negative",
    not_numeric: "Product price must be a number",
};

impl PriceRule {
    fn violation(&self, message: &str) -> FieldViolation {
        FieldViolation::new(self.field, message)
    }

    pub fn check(&self, price: f64) -> Result<f64, FieldViolation> {
        if !price.is_finite() {
            return Err(self.violation(self.not_numeric));
        }
        if price < 0.0 {
            return Err(self.violation(self.negative));
        }
        Ok(price)
    }

    pub fn check_json(&self, value: &Value) -> Result<f64, FieldViolation> {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(price) => self.check(price),
                None => Err(self.violation(self.not_numeric)),
            },
            Value::String(s) if s.trim().is_empty() => Err(self.violation(self.required)),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(price) => self.check(price),
                Err(_) => Err(self.violation(self.not_numeric)),
            },
            Value::Null => Err(self.violation(self.required)),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
                Err(self.violation(self.not_numeric))
            }
        }
    }
}

/// Field of the request body that reports a non-object payload.
pub const BODY_FIELD: &str = "body";

/// Unwrap the top-level JSON object of a request body.
pub fn body_fields(body: &Value) -> Result<&serde_json::Map<String, Value>, ValidationError> {
    body.as_object().ok_or_else(|| {
        ValidationError::single(BODY_FIELD, "Request body must be a JSON object")
    })
}
