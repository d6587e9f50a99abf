//! Infers a validator from a declared type.
//!
//! The declared type is destructured into its outer shape, nullability and
//! element types, then the matching validator is instantiated:
//!
//! | Declared                | Validator                                  |
//! |-------------------------|--------------------------------------------|
//! | `str`                   | [`StringValidator`]                        |
//! | `int` / `float`         | [`NumericValidator`]                       |
//! | `bool`, `dict`, dates   | [`TypeValidator`]                          |
//! | model                   | [`TypeValidator::model`]                   |
//! | `'Name'`                | [`ForwardRefValidator`]                    |
//! | `Optional[T]`           | validator of `T`, nullable                 |
//! | `Union[A, B]`           | [`TypeValidator::any_of`]                  |
//! | `List/Set/Tuple[T]`     | [`IterableValidator`] with element types   |
//! | `Dict[K, V]`            | [`TypeValidator::dict`]                    |
//! | `Any`                   | [`TypeValidator::any`]                     |

use std::sync::Arc;

use crate::types::{DeclaredType, Primitive, TypeTag};
use crate::validators::{
    ForwardRefValidator, IterableValidator, NumericValidator, SharedValidator, StringValidator,
    TypeValidator,
};
use crate::value::ValueKind;

/// A declared type too ambiguous to infer a validator for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("can not automatically instantiate a validator for type {declared}: {reason}")]
pub struct AutoValidatorError {
    pub declared: String,
    pub reason: String,
}

/// Builds the default validator for `declared`.
///
/// # Examples
///
/// ```
/// use modelio::builder::build_default_validator;
/// use modelio::validators::Validator;
/// use modelio::{DeclaredType, Value};
///
/// let v = build_default_validator(&DeclaredType::optional(DeclaredType::INT)).unwrap();
/// assert!(v.validate(&Value::Null, "A.n").is_ok());
/// assert!(v.validate(&Value::from("1"), "A.n").is_err());
///
/// let ambiguous = DeclaredType::list_of(DeclaredType::Optional(None));
/// assert!(build_default_validator(&ambiguous).is_err());
/// ```
pub fn build_default_validator(
    declared: &DeclaredType,
) -> Result<SharedValidator, AutoValidatorError> {
    instantiate(declared, false).map_err(|reason| AutoValidatorError {
        declared: declared.to_string(),
        reason,
    })
}

fn instantiate(declared: &DeclaredType, nullable: bool) -> Result<SharedValidator, String> {
    let validator: SharedValidator = match declared {
        DeclaredType::Any => Arc::new(TypeValidator::any().nullable(nullable)),
        DeclaredType::NoneType => Arc::new(TypeValidator::of(ValueKind::Null).nullable(true)),
        DeclaredType::Plain(primitive) => primitive_validator(*primitive, nullable),
        DeclaredType::Model(name) => Arc::new(TypeValidator::model(name.clone()).nullable(nullable)),
        DeclaredType::ForwardRef(name) => {
            Arc::new(ForwardRefValidator::new(name.clone()).nullable(nullable))
        }
        DeclaredType::Optional(None) => Arc::new(TypeValidator::any().nullable(true)),
        DeclaredType::Optional(Some(inner)) => return instantiate(inner, true),
        DeclaredType::Union(arms) => union_validator(arms, nullable)?,
        DeclaredType::List(element) => {
            iterable_validator(IterableValidator::list(), element, nullable)?
        }
        DeclaredType::Set(element) => {
            iterable_validator(IterableValidator::set(), element, nullable)?
        }
        DeclaredType::Tuple(element) => {
            iterable_validator(IterableValidator::tuple(), element, nullable)?
        }
        DeclaredType::Dict(..) => Arc::new(TypeValidator::dict().nullable(nullable)),
    };
    Ok(validator)
}

fn primitive_validator(primitive: Primitive, nullable: bool) -> SharedValidator {
    match primitive {
        Primitive::Str => Arc::new(StringValidator::new().nullable(nullable)),
        Primitive::Int => Arc::new(NumericValidator::int().nullable(nullable)),
        Primitive::Float => Arc::new(NumericValidator::float().nullable(nullable)),
        Primitive::Bool => Arc::new(TypeValidator::bool().nullable(nullable)),
        Primitive::Dict => Arc::new(TypeValidator::dict().nullable(nullable)),
        Primitive::Date => Arc::new(TypeValidator::date().nullable(nullable)),
        Primitive::DateTime => Arc::new(TypeValidator::datetime().nullable(nullable)),
        Primitive::List => Arc::new(IterableValidator::list().nullable(nullable)),
        Primitive::Set => Arc::new(IterableValidator::set().nullable(nullable)),
        Primitive::Tuple => Arc::new(IterableValidator::tuple().nullable(nullable)),
    }
}

fn union_validator(arms: &[DeclaredType], nullable: bool) -> Result<SharedValidator, String> {
    let mut arms_seen = UnionArms {
        nullable,
        ..UnionArms::default()
    };
    arms_seen.flatten(arms)?;
    let UnionArms {
        nullable,
        tags,
        untyped,
    } = arms_seen;
    let validator = if untyped || tags.is_empty() {
        TypeValidator::any()
    } else {
        TypeValidator::any_of(tags)
    };
    Ok(Arc::new(validator.nullable(nullable)))
}

/// Arms of a union with nested unions and optionals flattened in.
#[derive(Default)]
struct UnionArms {
    nullable: bool,
    tags: Vec<TypeTag>,
    untyped: bool,
}

impl UnionArms {
    fn flatten(&mut self, arms: &[DeclaredType]) -> Result<(), String> {
        for arm in arms {
            match arm {
                DeclaredType::NoneType => self.nullable = true,
                DeclaredType::Optional(None) => {
                    self.nullable = true;
                    self.untyped = true;
                }
                DeclaredType::Optional(Some(inner)) => {
                    self.nullable = true;
                    self.flatten(std::slice::from_ref(&**inner))?;
                }
                DeclaredType::Union(nested) => self.flatten(nested)?,
                other => match tags_of(other)? {
                    Some(arm_tags) => self.tags.extend(arm_tags),
                    None => self.untyped = true,
                },
            }
        }
        Ok(())
    }
}

fn iterable_validator(
    base: IterableValidator,
    element: &DeclaredType,
    nullable: bool,
) -> Result<SharedValidator, String> {
    let validator = match element {
        DeclaredType::Optional(_) => {
            return Err(format!("its elements type contains {element}"));
        }
        other => match tags_of(other)? {
            Some(tags) => base.elements(tags),
            None => base,
        },
    };
    Ok(Arc::new(validator.nullable(nullable)))
}

/// Runtime type tags accepted for `declared`; `None` accepts anything.
fn tags_of(declared: &DeclaredType) -> Result<Option<Vec<TypeTag>>, String> {
    let tags = match declared {
        DeclaredType::Any => return Ok(None),
        DeclaredType::NoneType => vec![TypeTag::Kind(ValueKind::Null)],
        DeclaredType::Plain(primitive) => vec![TypeTag::from(*primitive)],
        DeclaredType::Model(name) | DeclaredType::ForwardRef(name) => {
            vec![TypeTag::model(name.clone())]
        }
        DeclaredType::List(_) => vec![TypeTag::Kind(ValueKind::List)],
        DeclaredType::Set(_) => vec![TypeTag::Kind(ValueKind::Set)],
        DeclaredType::Tuple(_) => vec![TypeTag::Kind(ValueKind::Tuple)],
        DeclaredType::Dict(..) => vec![TypeTag::Kind(ValueKind::Dict)],
        DeclaredType::Union(arms) => {
            let mut tags = Vec::new();
            for arm in arms {
                match tags_of(arm)? {
                    Some(arm_tags) => tags.extend(arm_tags),
                    None => return Ok(None),
                }
            }
            tags
        }
        DeclaredType::Optional(_) => {
            return Err(format!("{declared} can not be used as an element type"));
        }
    };
    Ok(Some(tags))
}
