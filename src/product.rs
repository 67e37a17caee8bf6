use crate::schema::{
    body_fields, FieldViolation, ValidationError, DESCRIPTION_RULE, NAME_RULE, PRICE_RULE,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

static NULL: Value = Value::Null;

/// Opaque product identifier, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// The supplied text is not a well-formed product identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed product id: {0:?}")]
pub struct ProductIdError(pub String);

impl FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ProductIdError(s.to_string()))
    }
}

/// A persisted product record.
///
/// Serialized with camelCase keys:
/// `{id, name, price, description, createdAt, updatedAt}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Materialize a validated draft under a freshly generated id.
    pub fn create(draft: NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id: ProductId::generate(),
            name: draft.name,
            price: draft.price,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated patch and advance `updated_at`.
    ///
    /// `updated_at` always moves strictly forward, even when the clock has
    /// not ticked since the previous write.
    pub fn apply(&mut self, patch: ProductPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// A complete, validated create payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    name: String,
    price: f64,
    description: String,
}

impl NewProduct {
    /// Validate typed fields.
    pub fn new(
        name: impl AsRef<str>,
        price: f64,
        description: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        Self::assemble(
            NAME_RULE.check(name.as_ref()),
            PRICE_RULE.check(price),
            DESCRIPTION_RULE.check(description.as_ref()),
        )
    }

    /// Validate a raw JSON request body. Every field is required.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let fields = body_fields(body)?;
        let field = |key: &str| fields.get(key).unwrap_or(&NULL);

        Self::assemble(
            NAME_RULE.check_json(field(NAME_RULE.field)),
            PRICE_RULE.check_json(field(PRICE_RULE.field)),
            DESCRIPTION_RULE.check_json(field(DESCRIPTION_RULE.field)),
        )
    }

    fn assemble(
        name: Result<String, FieldViolation>,
        price: Result<f64, FieldViolation>,
        description: Result<String, FieldViolation>,
    ) -> Result<Self, ValidationError> {
        match (name, price, description) {
            (Ok(name), Ok(price), Ok(description)) => Ok(Self {
                name,
                price,
                description,
            }),
            (name, price, description) => Err(ValidationError::new(
                [name.err(), price.err(), description.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            )),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A validated partial update. Absent fields leave the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    name: Option<String>,
    price: Option<f64>,
    description: Option<String>,
}

impl ProductPatch {
    /// Validate whichever typed fields are supplied.
    pub fn new(
        name: Option<&str>,
        price: Option<f64>,
        description: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Self::assemble(
            name.map(|n| NAME_RULE.check(n)).transpose(),
            price.map(|p| PRICE_RULE.check(p)).transpose(),
            description.map(|d| DESCRIPTION_RULE.check(d)).transpose(),
        )
    }

    /// Validate a raw JSON request body. An explicit `null` counts as
    /// supplied and fails the required rule.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let fields = body_fields(body)?;

        Self::assemble(
            fields
                .get(NAME_RULE.field)
                .map(|v| NAME_RULE.check_json(v))
                .transpose(),
            fields
                .get(PRICE_RULE.field)
                .map(|v| PRICE_RULE.check_json(v))
                .transpose(),
            fields
                .get(DESCRIPTION_RULE.field)
                .map(|v| DESCRIPTION_RULE.check_json(v))
                .transpose(),
        )
    }

    fn assemble(
        name: Result<Option<String>, FieldViolation>,
        price: Result<Option<f64>, FieldViolation>,
        description: Result<Option<String>, FieldViolation>,
    ) -> Result<Self, ValidationError> {
        match (name, price, description) {
            (Ok(name), Ok(price), Ok(description)) => Ok(Self {
                name,
                price,
                description,
            }),
            (name, price, description) => Err(ValidationError::new(
                [name.err(), price.err(), description.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            )),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.description.is_none()
    }
}
