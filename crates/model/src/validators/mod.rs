//! Built-in validators
//!
//! Every validator checks nullability first, then the value's type, then its
//! own constraints. A nested model value is validated through its own field
//! validators, so validation recurses through object graphs and collections
//! with the path extended at each level.
//!
//! # Categories
//!
//! - **Type**: [`TypeValidator`] for any, bool, dict, date, datetime, models and unions
//! - **Numeric**: [`NumericValidator`] with inclusive bounds
//! - **String**: [`StringValidator`] (lengths, regex) and [`EmailValidator`]
//! - **Collection**: [`IterableValidator`] for lists, sets and tuples
//! - **Deferred**: [`ForwardRefValidator`] for models named before they exist
//!
//! # Examples
//!
//! ```
//! use modelio::validators::{NumericValidator, Validator};
//! use modelio::Value;
//!
//! let age = NumericValidator::int().min(0).max(150);
//! assert!(age.validate(&Value::from(70), "Person.age").is_ok());
//!
//! let err = age.validate(&Value::from(-1), "Person.age").unwrap_err();
//! assert_eq!(err.to_string(), "Person.age is lower than 0");
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::ValidationError;
use crate::value::Value;

mod base;
mod forward_ref;
mod iterable;
mod numeric;
mod string;

pub use base::{TypeCheck, TypeValidator};
pub use forward_ref::ForwardRefValidator;
pub use iterable::IterableValidator;
pub use numeric::{Number, NumericValidator};
pub use string::{EmailValidator, StringValidator};

// ============================================================================
// VALIDATOR TRAIT
// ============================================================================

/// A rule applied to a single field value.
///
/// Validators never transform the value; they either accept it or return a
/// [`ValidationError`] carrying `path`.
pub trait Validator: Debug + Send + Sync {
    /// Validates `value`, reporting failures under `path`.
    fn validate(&self, value: &Value, path: &str) -> Result<(), ValidationError>;

    /// Checks that every model this validator names is known.
    ///
    /// Called once by the registry after all models are declared. Returns
    /// the first unknown model name.
    fn resolve(&self, is_known: &dyn Fn(&str) -> bool) -> Result<(), String> {
        let _ = is_known;
        Ok(())
    }
}

/// A validator shared between attribute declarations.
pub type SharedValidator = Arc<dyn Validator>;

impl<V: Validator + ?Sized> Validator for Arc<V> {
    fn validate(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        (**self).validate(value, path)
    }

    fn resolve(&self, is_known: &dyn Fn(&str) -> bool) -> Result<(), String> {
        (**self).resolve(is_known)
    }
}
