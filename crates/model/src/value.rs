//! Dynamic values held by model fields and exchanged through mappings.
//!
//! [`Value`] is the closed set of shapes a field can hold. Nested models are
//! values too, which is what lets validation and serialization recurse into
//! object graphs without knowing their shape up front.
//!
//! ```
//! use modelio::{Value, ValueKind, dict};
//!
//! let v = Value::from(3.5);
//! assert_eq!(v.kind(), ValueKind::Float);
//! assert_eq!(v.kind().name(), "float");
//!
//! let input = dict! { "name" => "Rick", "age" => 70 };
//! assert_eq!(input["age"], Value::Int(70));
//! ```

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::{Deserialize, Deserializer};

use crate::model::Model;
use crate::temporal;

/// Ordered mapping used for keyword input and serialized output.
pub type Dict = IndexMap<String, Value>;

/// The "no value supplied" marker, distinct from [`Value::Null`].
pub const UNDEFINED: Value = Value::Undefined;

// ============================================================================
// VALUE
// ============================================================================

/// A dynamically-typed field value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absence of a value (`None`).
    #[default]
    Null,
    /// No value supplied. Triggers the field's default factory.
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    /// A datetime without timezone information.
    ///
    /// `From` conversions truncate to microseconds.
    NaiveDateTime(NaiveDateTime),
    /// A timezone-aware datetime, truncated to microseconds like
    /// [`Value::NaiveDateTime`].
    DateTime(DateTime<FixedOffset>),
    List(Vec<Value>),
    /// Unordered collection; equality ignores element order.
    Set(Vec<Value>),
    Tuple(Vec<Value>),
    Dict(Dict),
    Model(Box<Model>),
}

impl Value {
    /// Builds a set, dropping duplicate elements.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        let mut unique: Vec<Value> = Vec::new();
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Self::Set(unique)
    }

    /// Builds a tuple.
    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Tuple(items.into_iter().collect())
    }

    /// Builds a list.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        ValueKind::from_value(self)
    }

    /// Python-facing type name: the model name for models, the kind name otherwise.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Model(model) => model.type_name(),
            other => other.kind().name(),
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list, set or tuple.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) | Self::Set(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Converts into plain JSON.
    ///
    /// Dates become ISO-8601 strings, sets and tuples become arrays, models
    /// go through their serializable view and non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Null | Self::Undefined => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::Str(s) => Json::String(s.clone()),
            Self::Date(_) | Self::NaiveDateTime(_) | Self::DateTime(_) => {
                Json::String(temporal::iso_format(self).unwrap_or_default())
            }
            Self::List(items) | Self::Set(items) | Self::Tuple(items) => {
                Json::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Dict(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Model(model) => Self::Dict(model.to_dict()).to_json(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) | (Self::Undefined, Self::Undefined) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::NaiveDateTime(a), Self::NaiveDateTime(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => {
                a.len() == b.len() && a.iter().all(|x| b.contains(x))
            }
            (Self::Dict(a), Self::Dict(b)) => a == b,
            (Self::Model(a), Self::Model(b)) => a == b,
            _ => false,
        }
    }
}

impl Display for Value {
    /// Renders the Python-style representation, e.g. `'Rick'` or `[1, 2]`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        crate::repr::write_value(f, self)
    }
}

// ============================================================================
// VALUE KIND
// ============================================================================

/// Lightweight classification of a [`Value`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueKind {
    Null,
    Undefined,
    Bool,
    Int,
    Float,
    Str,
    Date,
    DateTime,
    List,
    Set,
    Tuple,
    Dict,
    Model,
}

impl ValueKind {
    /// Get the kind from a Value
    pub const fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Undefined => Self::Undefined,
            Value::Bool(_) => Self::Bool,
            Value::Int(_) => Self::Int,
            Value::Float(_) => Self::Float,
            Value::Str(_) => Self::Str,
            Value::Date(_) => Self::Date,
            Value::NaiveDateTime(_) | Value::DateTime(_) => Self::DateTime,
            Value::List(_) => Self::List,
            Value::Set(_) => Self::Set,
            Value::Tuple(_) => Self::Tuple,
            Value::Dict(_) => Self::Dict,
            Value::Model(_) => Self::Model,
        }
    }

    /// Type name as it appears in validation messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Null => "NoneType",
            Self::Undefined => "Undefined",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::List => "list",
            Self::Set => "set",
            Self::Tuple => "tuple",
            Self::Dict => "dict",
            Self::Model => "model",
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i64 => Int,
    i32 => Int,
    u32 => Int,
    u8 => Int,
    f64 => Float,
    f32 => Float,
    String => Str,
    &str => Str,
    NaiveDate => Date,
    Vec<Value> => List,
    Dict => Dict,
}

// Datetimes keep microsecond precision, the finest `isoformat` prints.
impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::NaiveDateTime(v.trunc_subsecs(6))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::DateTime(v.trunc_subsecs(6))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::from(v.fixed_offset())
    }
}

impl From<Model> for Value {
    fn from(model: Model) -> Self {
        Self::Model(Box::new(model))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            Json::String(s) => Self::Str(s),
            Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => {
                Self::Dict(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        value.to_json()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null | Self::Undefined => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Date(_) | Self::NaiveDateTime(_) | Self::DateTime(_) => {
                serializer.serialize_str(&temporal::iso_format(self).unwrap_or_default())
            }
            Self::List(items) | Self::Set(items) | Self::Tuple(items) => {
                serializer.collect_seq(items)
            }
            Self::Dict(map) => serialize_dict(map, serializer),
            Self::Model(model) => serialize_dict(&model.to_dict(), serializer),
        }
    }
}

fn serialize_dict<S: Serializer>(map: &Dict, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_map(Some(map.len()))?;
    for (k, v) in map {
        state.serialize_entry(k, v)?;
    }
    state.end()
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

// ============================================================================
// DICT MACRO
// ============================================================================

/// Builds a [`Dict`] from `key => value` pairs.
///
/// ```
/// use modelio::{dict, Value};
///
/// let kwargs = dict! { "name" => "Morty", "age" => 14 };
/// assert_eq!(kwargs.len(), 2);
/// assert_eq!(kwargs["name"], Value::from("Morty"));
/// ```
#[macro_export]
macro_rules! dict {
    () => {
        $crate::Dict::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Dict::new();
        $(
            map.insert(::std::string::String::from($key), $crate::Value::from($value));
        )+
        map
    }};
}
