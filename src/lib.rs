//! Domain crate for the product catalog service.
//!
//! This crate owns the single `Product` entity: its wire shape, its
//! identifier, and the schema rules every stored record satisfies. The
//! storage crate (`product-store`) and the HTTP crate (`product-server`)
//! both build on these types.
//!
//! Validated inputs are distinct types. [`NewProduct`] and [`ProductPatch`]
//! can only be obtained through the validator, so anything that reaches the
//! store has already passed the field rules.
//!
//! ```
//! use product_crud::{NewProduct, ProductPatch};
//! use serde_json::json;
//!
//! let draft = NewProduct::from_json(&json!({
//!     "name": " Pen ",
//!     "price": 1.5,
//!     "description": "Blue ink pen",
//! }))
//! .unwrap();
//! assert_eq!(draft.name(), "Pen");
//!
//! let err = ProductPatch::from_json(&json!({ "price": -3 })).unwrap_err();
//! assert!(err.has_field("price"));
//! ```

pub mod product;
pub mod schema;

pub use product::{NewProduct, Product, ProductId, ProductIdError, ProductPatch};
pub use schema::{
    FieldViolation, ValidationError, DESCRIPTION_MAX_CHARS, NAME_MAX_CHARS,
};
