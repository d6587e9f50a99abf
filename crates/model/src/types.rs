//! Declared attribute types.
//!
//! [`DeclaredType`] is the closed description of what a field must hold:
//! a primitive, a nested model, a parameterized container, an optional or
//! union, or a forward reference resolved once every model is registered.

use std::fmt::{self, Display, Formatter};

use crate::value::{Value, ValueKind};

// ============================================================================
// PRIMITIVES
// ============================================================================

/// Built-in value shapes that map directly onto a validator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Primitive {
    Str,
    Bool,
    Int,
    Float,
    Dict,
    List,
    Set,
    Tuple,
    Date,
    DateTime,
}

impl Primitive {
    /// The value kind a value of this primitive has.
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::Str => ValueKind::Str,
            Self::Bool => ValueKind::Bool,
            Self::Int => ValueKind::Int,
            Self::Float => ValueKind::Float,
            Self::Dict => ValueKind::Dict,
            Self::List => ValueKind::List,
            Self::Set => ValueKind::Set,
            Self::Tuple => ValueKind::Tuple,
            Self::Date => ValueKind::Date,
            Self::DateTime => ValueKind::DateTime,
        }
    }

    pub const fn name(self) -> &'static str {
        self.kind().name()
    }
}

// ============================================================================
// DECLARED TYPE
// ============================================================================

/// Shape of a declared attribute type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclaredType {
    /// Accepts any value.
    Any,
    /// The `None` type; only meaningful as a union arm.
    NoneType,
    Plain(Primitive),
    /// A registered model type, by name.
    Model(String),
    /// A model type named before it is declared.
    ForwardRef(String),
    /// `Optional[T]`; a bare `Optional` carries no inner type.
    Optional(Option<Box<DeclaredType>>),
    Union(Vec<DeclaredType>),
    List(Box<DeclaredType>),
    Set(Box<DeclaredType>),
    Tuple(Box<DeclaredType>),
    /// `Dict[K, V]`; key and value types are not validated.
    Dict(Box<DeclaredType>, Box<DeclaredType>),
}

impl DeclaredType {
    pub const STR: Self = Self::Plain(Primitive::Str);
    pub const BOOL: Self = Self::Plain(Primitive::Bool);
    pub const INT: Self = Self::Plain(Primitive::Int);
    pub const FLOAT: Self = Self::Plain(Primitive::Float);
    pub const DICT: Self = Self::Plain(Primitive::Dict);
    pub const LIST: Self = Self::Plain(Primitive::List);
    pub const SET: Self = Self::Plain(Primitive::Set);
    pub const TUPLE: Self = Self::Plain(Primitive::Tuple);
    pub const DATE: Self = Self::Plain(Primitive::Date);
    pub const DATETIME: Self = Self::Plain(Primitive::DateTime);

    pub fn model(name: impl Into<String>) -> Self {
        Self::Model(name.into())
    }

    pub fn forward_ref(name: impl Into<String>) -> Self {
        Self::ForwardRef(name.into())
    }

    pub fn optional(inner: Self) -> Self {
        Self::Optional(Some(Box::new(inner)))
    }

    pub fn list_of(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn set_of(inner: Self) -> Self {
        Self::Set(Box::new(inner))
    }

    pub fn tuple_of(inner: Self) -> Self {
        Self::Tuple(Box::new(inner))
    }

    pub fn dict_of(key: Self, value: Self) -> Self {
        Self::Dict(Box::new(key), Box::new(value))
    }

    pub fn union(arms: impl IntoIterator<Item = Self>) -> Self {
        Self::Union(arms.into_iter().collect())
    }

    /// Strips any number of `Optional` layers.
    pub fn unwrap_optional(&self) -> &Self {
        match self {
            Self::Optional(Some(inner)) => inner.unwrap_optional(),
            other => other,
        }
    }

    /// Every model name mentioned anywhere in this type.
    pub fn referenced_models(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_models(&mut names);
        names
    }

    fn collect_models<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Model(name) | Self::ForwardRef(name) => out.push(name),
            Self::Optional(Some(inner))
            | Self::List(inner)
            | Self::Set(inner)
            | Self::Tuple(inner) => inner.collect_models(out),
            Self::Union(arms) => arms.iter().for_each(|arm| arm.collect_models(out)),
            Self::Dict(key, value) => {
                key.collect_models(out);
                value.collect_models(out);
            }
            _ => {}
        }
    }
}

impl From<Primitive> for DeclaredType {
    fn from(p: Primitive) -> Self {
        Self::Plain(p)
    }
}

impl Display for DeclaredType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::NoneType => f.write_str("None"),
            Self::Plain(p) => f.write_str(p.name()),
            Self::Model(name) => f.write_str(name),
            Self::ForwardRef(name) => write!(f, "'{name}'"),
            Self::Optional(None) => f.write_str("Optional"),
            Self::Optional(Some(inner)) => write!(f, "Optional[{inner}]"),
            Self::Union(arms) => {
                f.write_str("Union[")?;
                for (i, arm) in arms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arm}")?;
                }
                f.write_str("]")
            }
            Self::List(inner) => write!(f, "List[{inner}]"),
            Self::Set(inner) => write!(f, "Set[{inner}]"),
            Self::Tuple(inner) => write!(f, "Tuple[{inner}]"),
            Self::Dict(key, value) => write!(f, "Dict[{key}, {value}]"),
        }
    }
}

// ============================================================================
// TYPE TAGS
// ============================================================================

/// A runtime type check: a value kind or a model type (subtypes included).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Kind(ValueKind),
    Model(String),
}

impl TypeTag {
    pub fn model(name: impl Into<String>) -> Self {
        Self::Model(name.into())
    }

    /// Whether `value` is an instance of this tag.
    ///
    /// Kinds are strict: a bool is not an int and an int is not a float.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Kind(kind) => value.kind() == *kind,
            Self::Model(name) => value.as_model().is_some_and(|m| m.is_instance_of(name)),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Kind(kind) => kind.name(),
            Self::Model(name) => name,
        }
    }
}

impl From<ValueKind> for TypeTag {
    fn from(kind: ValueKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<Primitive> for TypeTag {
    fn from(p: Primitive) -> Self {
        Self::Kind(p.kind())
    }
}

/// Joins tag names as `X or Y`.
pub(crate) fn describe(tags: &[TypeTag]) -> String {
    tags.iter().map(TypeTag::name).collect::<Vec<_>>().join(" or ")
}
