//! List, set and tuple validators

use std::borrow::Cow;

use smallvec::SmallVec;

use super::base::resolve_tags;
use super::{TypeCheck, Validator};
use crate::error::ValidationError;
use crate::types::{TypeTag, describe};
use crate::value::{Value, ValueKind};

/// Validates a collection and, optionally, the type of each element.
///
/// Element failures are reported under an indexed path such as
/// `Computer.disks[1]`; model elements are validated under that path too.
///
/// # Examples
///
/// ```
/// use modelio::validators::{IterableValidator, Validator};
/// use modelio::{Value, ValueKind};
///
/// let tags = IterableValidator::list().element(ValueKind::Str).allow_empty(false);
/// assert!(tags.validate(&Value::list([Value::from("a")]), "Post.tags").is_ok());
///
/// let err = tags.validate(&Value::list([Value::from("a"), Value::from(1)]), "Post.tags").unwrap_err();
/// assert_eq!(err.to_string(), "Post.tags[1] is not instance of str");
/// ```
#[derive(Debug, Clone)]
pub struct IterableValidator {
    check: TypeCheck,
    elements: Option<SmallVec<[TypeTag; 2]>>,
    allow_empty: bool,
}

impl IterableValidator {
    fn of(kind: ValueKind) -> Self {
        Self {
            check: TypeCheck::of([kind.into()]),
            elements: None,
            allow_empty: true,
        }
    }

    pub fn list() -> Self {
        Self::of(ValueKind::List)
    }

    pub fn set() -> Self {
        Self::of(ValueKind::Set)
    }

    pub fn tuple() -> Self {
        Self::of(ValueKind::Tuple)
    }

    /// Requires every element to match `tag`.
    #[must_use = "builder methods must be chained or built"]
    pub fn element(self, tag: impl Into<TypeTag>) -> Self {
        self.elements([tag.into()])
    }

    /// Requires every element to match one of `tags`.
    #[must_use = "builder methods must be chained or built"]
    pub fn elements(mut self, tags: impl IntoIterator<Item = TypeTag>) -> Self {
        self.elements = Some(tags.into_iter().collect());
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
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

impl Validator for IterableValidator {
    fn validate(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        if !self.check.check(value, path)? {
            return Ok(());
        }
        let Some(items) = value.as_items() else {
            return Ok(());
        };
        if items.is_empty() && !self.allow_empty {
            return Err(self.check.error("empty", path, "must not be empty"));
        }
        for (i, item) in items.iter().enumerate() {
            if let Some(tags) = &self.elements {
                if !tags.iter().any(|tag| tag.matches(item)) {
                    let expected = describe(tags);
                    return Err(self
                        .check
                        .error(
                            "type_mismatch",
                            &format!("{path}[{i}]"),
                            format!("is not instance of {expected}"),
                        )
                        .with_param("expected", expected)
                        .with_param("actual", item.type_name().to_string()));
                }
            }
            if let Value::Model(model) = item {
                model.validate(Some(&format!("{path}[{i}]")))?;
            }
        }
        Ok(())
    }

    fn resolve(&self, is_known: &dyn Fn(&str) -> bool) -> Result<(), String> {
        self.check.resolve(is_known)?;
        resolve_tags(self.elements.as_deref().unwrap_or_default(), is_known)
    }
}
