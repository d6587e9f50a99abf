//! String validators
//!
//! Length constraints count characters, not bytes. A regex must match at the
//! start of the string but may leave a suffix unmatched.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::{TypeCheck, Validator};
use crate::error::{ModelError, ValidationError};
use crate::value::{Value, ValueKind};

const EMAIL_PATTERN: &str = r"^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$";

static EMAIL_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

// ============================================================================
// STRING VALIDATOR
// ============================================================================

/// Validates a `str` value.
///
/// # Examples
///
/// ```
/// use modelio::validators::{StringValidator, Validator};
/// use modelio::Value;
///
/// let code = StringValidator::new().fixed_len(3);
/// assert!(code.validate(&Value::from("abc"), "A.code").is_ok());
///
/// let err = code.validate(&Value::from("ab"), "A.code").unwrap_err();
/// assert_eq!(err.to_string(), "A.code length is different than 3");
/// ```
#[derive(Debug, Clone)]
pub struct StringValidator {
    check: TypeCheck,
    min_len: Option<usize>,
    max_len: Option<usize>,
    fixed_len: Option<usize>,
    regex: Option<Regex>,
}

impl Default for StringValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl StringValidator {
    pub fn new() -> Self {
        Self {
            check: TypeCheck::of([ValueKind::Str.into()]),
            min_len: None,
            max_len: None,
            fixed_len: None,
            regex: None,
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn fixed_len(mut self, len: usize) -> Self {
        self.fixed_len = Some(len);
        self
    }

    /// Requires the value to match `pattern` from its first character.
    pub fn regex(mut self, pattern: &str) -> Result<Self, ModelError> {
        let compiled = Regex::new(pattern).map_err(|e| ModelError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.regex = Some(compiled);
        Ok(self)
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

    /// Runs every check; returns the string when further checks apply.
    fn check_str<'v>(&self, value: &'v Value, path: &str) -> Result<Option<&'v str>, ValidationError> {
        if !self.check.check(value, path)? {
            return Ok(None);
        }
        let Some(s) = value.as_str() else {
            return Ok(None);
        };
        let len = s.chars().count();
        if let Some(min) = self.min_len {
            if len < min {
                return Err(self
                    .check
                    .error("min_length", path, format!("is shorter than {min}"))
                    .with_param("min", min.to_string())
                    .with_param("actual", len.to_string()));
            }
        }
        if let Some(max) = self.max_len {
            if len > max {
                return Err(self
                    .check
                    .error("max_length", path, format!("is longer than {max}"))
                    .with_param("max", max.to_string())
                    .with_param("actual", len.to_string()));
            }
        }
        if let Some(fixed) = self.fixed_len {
            if len != fixed {
                return Err(self
                    .check
                    .error("fixed_length", path, format!("length is different than {fixed}"))
                    .with_param("expected", fixed.to_string())
                    .with_param("actual", len.to_string()));
            }
        }
        if let Some(regex) = &self.regex {
            if !matches_from_start(regex, s) {
                return Err(self
                    .check
                    .error("pattern", path, "does not match configured regex")
                    .with_param("pattern", regex.as_str().to_string()));
            }
        }
        Ok(Some(s))
    }
}

fn matches_from_start(regex: &Regex, s: &str) -> bool {
    regex.find(s).is_some_and(|m| m.start() == 0)
}

impl Validator for StringValidator {
    fn validate(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        self.check_str(value, path).map(|_| ())
    }
}

// ============================================================================
// EMAIL VALIDATOR
// ============================================================================

/// Validates an email address; matching is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct EmailValidator {
    inner: StringValidator,
}

impl EmailValidator {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.inner = self.inner.nullable(nullable);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.inner = self.inner.message(message);
        self
    }
}

impl Validator for EmailValidator {
    fn validate(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        let Some(s) = self.inner.check_str(value, path)? else {
            return Ok(());
        };
        let lower = s.to_lowercase();
        let valid = EMAIL_REGEX.as_ref().is_some_and(|re| re.is_match(&lower));
        if valid {
            Ok(())
        } else {
            Err(self
                .inner
                .check
                .error("email", path, "is not a valid email address"))
        }
    }
}
