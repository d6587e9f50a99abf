//! Type and nullability checks shared by every validator.

use std::borrow::Cow;

use smallvec::SmallVec;

use super::Validator;
use crate::error::ValidationError;
use crate::types::{TypeTag, describe};
use crate::value::{Value, ValueKind};

// ============================================================================
// TYPE CHECK
// ============================================================================

/// Nullability, expected types and message override.
///
/// The building block every other validator starts from.
#[derive(Debug, Clone, Default)]
pub struct TypeCheck {
    expected: Option<SmallVec<[TypeTag; 2]>>,
    nullable: bool,
    message: Option<Cow<'static, str>>,
}

impl TypeCheck {
    /// A check with no expected type.
    pub fn any() -> Self {
        Self::default()
    }

    /// A check accepting any of `tags`.
    pub fn of(tags: impl IntoIterator<Item = TypeTag>) -> Self {
        Self {
            expected: Some(tags.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn expected(&self) -> Option<&[TypeTag]> {
        self.expected.as_deref()
    }

    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn set_nullable(&mut self, nullable: bool) {
        self.nullable = nullable;
    }

    pub fn set_message(&mut self, message: Cow<'static, str>) {
        self.message = Some(message);
    }

    /// Runs the shared checks.
    ///
    /// Returns `Ok(false)` for an accepted `None`, in which case no other
    /// constraint applies. Nested models are validated under `path`.
    pub fn check(&self, value: &Value, path: &str) -> Result<bool, ValidationError> {
        if value.is_null() {
            if self.nullable {
                return Ok(false);
            }
            return Err(self.error("not_nullable", path, "must not be None"));
        }
        if let Some(tags) = &self.expected {
            if !tags.iter().any(|tag| tag.matches(value)) {
                let expected = describe(tags);
                return Err(self
                    .error("type_mismatch", path, format!("is not instance of {expected}"))
                    .with_param("expected", expected)
                    .with_param("actual", value.type_name().to_string()));
            }
        }
        if let Value::Model(model) = value {
            model.validate(Some(path))?;
        }
        Ok(true)
    }

    /// Builds an error, honoring the message override.
    pub fn error(
        &self,
        code: &'static str,
        path: &str,
        default_message: impl Into<Cow<'static, str>>,
    ) -> ValidationError {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| default_message.into());
        ValidationError::new(code, path, message)
    }

    /// Checks that every expected model type is known.
    pub fn resolve(&self, is_known: &dyn Fn(&str) -> bool) -> Result<(), String> {
        resolve_tags(self.expected.as_deref().unwrap_or_default(), is_known)
    }
}

pub(super) fn resolve_tags(
    tags: &[TypeTag],
    is_known: &dyn Fn(&str) -> bool,
) -> Result<(), String> {
    match tags.iter().find_map(|tag| match tag {
        TypeTag::Model(name) if !is_known(name) => Some(name),
        _ => None,
    }) {
        Some(unknown) => Err(unknown.clone()),
        None => Ok(()),
    }
}

// ============================================================================
// TYPE VALIDATOR
// ============================================================================

/// Validates nullability and runtime type only.
///
/// # Examples
///
/// ```
/// use modelio::validators::{TypeValidator, Validator};
/// use modelio::Value;
///
/// let flag = TypeValidator::bool().nullable(true);
/// assert!(flag.validate(&Value::Null, "A.flag").is_ok());
/// assert!(flag.validate(&Value::from(1), "A.flag").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeValidator {
    check: TypeCheck,
}

impl TypeValidator {
    /// Accepts any non-null value.
    pub fn any() -> Self {
        Self::default()
    }

    /// Accepts values matching `tag`.
    pub fn of(tag: impl Into<TypeTag>) -> Self {
        Self {
            check: TypeCheck::of([tag.into()]),
        }
    }

    /// Accepts values matching any of `tags`.
    pub fn any_of(tags: impl IntoIterator<Item = TypeTag>) -> Self {
        Self {
            check: TypeCheck::of(tags),
        }
    }

    pub fn bool() -> Self {
        Self::of(ValueKind::Bool)
    }

    pub fn dict() -> Self {
        Self::of(ValueKind::Dict)
    }

    pub fn date() -> Self {
        Self::of(ValueKind::Date)
    }

    pub fn datetime() -> Self {
        Self::of(ValueKind::DateTime)
    }

    /// Accepts instances of the named model or its subtypes.
    pub fn model(name: impl Into<String>) -> Self {
        Self::of(TypeTag::model(name))
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

impl Validator for TypeValidator {
    fn validate(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        self.check.check(value, path).map(|_| ())
    }

    fn resolve(&self, is_known: &dyn Fn(&str) -> bool) -> Result<(), String> {
        self.check.resolve(is_known)
    }
}
