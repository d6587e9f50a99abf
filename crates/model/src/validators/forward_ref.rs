//! Validator for model types referenced by name before they are declared.

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use super::{TypeCheck, Validator};
use crate::error::ValidationError;
use crate::types::TypeTag;
use crate::value::Value;

/// Checks that a value is an instance of a model named by `reference`.
///
/// The reference is resolved once by the registry. Until then validation is
/// skipped with a warning.
#[derive(Debug)]
pub struct ForwardRefValidator {
    reference: String,
    check: TypeCheck,
    resolved: AtomicBool,
}

impl ForwardRefValidator {
    pub fn new(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        Self {
            check: TypeCheck::of([TypeTag::model(reference.clone())]),
            reference,
            resolved: AtomicBool::new(false),
        }
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

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }
}

impl Validator for ForwardRefValidator {
    fn validate(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        if !self.is_resolved() {
            warn!(
                reference = %self.reference,
                path,
                "forward reference was not resolved, skipping validation"
            );
            return Ok(());
        }
        self.check.check(value, path).map(|_| ())
    }

    fn resolve(&self, is_known: &dyn Fn(&str) -> bool) -> Result<(), String> {
        if is_known(&self.reference) {
            self.resolved.store(true, Ordering::Release);
            Ok(())
        } else {
            Err(self.reference.clone())
        }
    }
}
