//! Conversion of models into plain mappings.

use crate::model::Model;
use crate::temporal;
use crate::value::{Dict, Value};

impl Model {
    /// Converts the serializable view into a mapping.
    ///
    /// Nested models become mappings, lists, sets and tuples become lists,
    /// dates become ISO-8601 strings. A serializer registered for a name
    /// replaces the default conversion of that value.
    ///
    /// ```
    /// use modelio::{Attr, DeclaredType, ModelDef, RegistryBuilder, Settings, Value, dict};
    ///
    /// let registry = RegistryBuilder::new(Settings::default())
    ///     .register(
    ///         ModelDef::new("Person")
    ///             .attr(Attr::new("name", DeclaredType::STR))
    ///             .attr(Attr::new("age", DeclaredType::INT)),
    ///     )
    ///     .build()
    ///     .unwrap();
    /// let rick = registry.create("Person", dict! { "name" => "Rick", "age" => 70 }).unwrap();
    /// assert_eq!(rick.to_dict(), dict! { "age" => 70, "name" => "Rick" });
    /// ```
    pub fn to_dict(&self) -> Dict {
        let serializers = &self.model_type().serializers;
        self.serializable_values()
            .into_iter()
            .map(|(name, value)| {
                let converted = match serializers.get(&name) {
                    Some(convert) => convert(&value),
                    None => serialize_value(&value),
                };
                (name, converted)
            })
            .collect()
    }

    /// Converts the serializable view into JSON.
    pub fn to_json(&self) -> serde_json::Value {
        Value::Dict(self.to_dict()).to_json()
    }
}

/// Default conversion of a single value.
pub fn serialize_value(value: &Value) -> Value {
    match value {
        Value::Model(model) => Value::Dict(model.to_dict()),
        Value::List(items) | Value::Set(items) | Value::Tuple(items) => {
            Value::List(items.iter().map(serialize_value).collect())
        }
        Value::Dict(map) => Value::Dict(
            map.iter()
                .map(|(k, v)| (k.clone(), serialize_value(v)))
                .collect(),
        ),
        Value::Date(_) | Value::NaiveDateTime(_) | Value::DateTime(_) => {
            temporal::iso_format(value).map_or_else(|| value.clone(), Value::Str)
        }
        other => other.clone(),
    }
}
