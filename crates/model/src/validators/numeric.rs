//! Numeric range validators

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use super::{TypeCheck, Validator};
use crate::error::ValidationError;
use crate::types::TypeTag;
use crate::value::{Value, ValueKind};

/// A numeric bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(Self::Int(*i)),
            Value::Float(f) => Some(Self::Float(*f)),
            _ => None,
        }
    }

    fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
        }
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

// ============================================================================
// NUMERIC VALIDATOR
// ============================================================================

/// Validates an int or float against inclusive bounds.
///
/// # Examples
///
/// ```
/// use modelio::validators::{NumericValidator, Validator};
/// use modelio::Value;
///
/// let ratio = NumericValidator::float().min(0.0).max(1.0);
/// assert!(ratio.validate(&Value::from(0.5), "A.ratio").is_ok());
/// assert!(ratio.validate(&Value::from(1), "A.ratio").is_err()); // int is not float
///
/// let err = ratio.validate(&Value::from(1.5), "A.ratio").unwrap_err();
/// assert_eq!(err.to_string(), "A.ratio is greater than 1.0");
/// ```
#[derive(Debug, Clone)]
pub struct NumericValidator {
    check: TypeCheck,
    min_value: Option<Number>,
    max_value: Option<Number>,
}

impl NumericValidator {
    fn with_kinds(kinds: &[ValueKind]) -> Self {
        Self {
            check: TypeCheck::of(kinds.iter().copied().map(TypeTag::from)),
            min_value: None,
            max_value: None,
        }
    }

    /// Accepts integers only.
    pub fn int() -> Self {
        Self::with_kinds(&[ValueKind::Int])
    }

    /// Accepts floats only.
    pub fn float() -> Self {
        Self::with_kinds(&[ValueKind::Float])
    }

    /// Accepts integers and floats.
    pub fn number() -> Self {
        Self::with_kinds(&[ValueKind::Int, ValueKind::Float])
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn min(mut self, min: impl Into<Number>) -> Self {
        self.min_value = Some(min.into());
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn max(mut self, max: impl Into<Number>) -> Self {
        self.max_value = Some(max.into());
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.check.set_nullable(nullable);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.check.set_message(message.into());
        self
    }
}

impl Validator for NumericValidator {
    fn validate(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        if !self.check.check(value, path)? {
            return Ok(());
        }
        let Some(actual) = Number::of(value) else {
            return Ok(());
        };
        if let Some(min) = self.min_value {
            if actual.compare(min) == Some(Ordering::Less) {
                return Err(self
                    .check
                    .error("min_value", path, format!("is lower than {min}"))
                    .with_param("min", min.to_string())
                    .with_param("actual", actual.to_string()));
            }
        }
        if let Some(max) = self.max_value {
            if actual.compare(max) == Some(Ordering::Greater) {
                return Err(self
                    .check
                    .error("max_value", path, format!("is greater than {max}"))
                    .with_param("max", max.to_string())
                    .with_param("actual", actual.to_string()));
            }
        }
        Ok(())
    }
}
