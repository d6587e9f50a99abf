//! Construction of models from plain mappings.
//!
//! For every attribute that accepts input, the first exposed name present in
//! the mapping supplies the raw value. A deserializer registered for that
//! name converts it; otherwise the raw value is converted by declared type:
//!
//! - a mapping for a model-typed attribute becomes that model, unvalidated
//! - list, set and tuple attributes convert each element and take the
//!   declared container kind
//! - strings for date and datetime attributes are parsed, falling back to
//!   the raw string when parsing fails
//!
//! Everything else passes through unchanged. The converted mapping is then
//! constructed like keyword input.

use tracing::{trace, warn};

use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::registry::Registry;
use crate::temporal;
use crate::types::{DeclaredType, Primitive};
use crate::value::{Dict, Value};

impl Registry {
    /// Builds and validates an instance of `name` from a mapping.
    pub fn from_dict(&self, name: &str, data: &Dict) -> ModelResult<Model> {
        self.from_dict_with(name, data, true)
    }

    /// Builds an instance of `name` from a mapping, validating it only when
    /// `auto_validate` is set.
    ///
    /// ```
    /// use modelio::{Attr, DeclaredType, ModelDef, RegistryBuilder, Settings, Value, dict};
    ///
    /// let registry = RegistryBuilder::new(Settings::default())
    ///     .register(ModelDef::new("Event").attr(Attr::new("at", DeclaredType::DATE)))
    ///     .build()
    ///     .unwrap();
    ///
    /// let event = registry.from_dict("Event", &dict! { "at" => "2023-04-15" }).unwrap();
    /// assert_eq!(event.to_dict(), dict! { "at" => "2023-04-15" });
    ///
    /// let raw = registry.from_dict_with("Event", &dict! { "at" => "soon" }, false).unwrap();
    /// assert_eq!(raw.get("at"), Some(&Value::from("soon")));
    /// ```
    pub fn from_dict_with(&self, name: &str, data: &Dict, auto_validate: bool) -> ModelResult<Model> {
        let ty = self.model_type(name)?;
        trace!(model = name, keys = data.len(), auto_validate, "deserializing");

        let mut input = Dict::with_capacity(ty.specs().len());
        for spec in ty.specs().iter().filter(|spec| spec.accepts_input()) {
            let found = spec
                .exposed_names()
                .iter()
                .find_map(|exposed| data.get(exposed.as_str()).map(|raw| (exposed, raw)));
            let Some((exposed, raw)) = found else {
                continue;
            };
            let value = match ty.deserializers.get(exposed.as_str()) {
                Some(convert) => convert(raw)?,
                None => self.convert(spec.declared_type(), raw)?,
            };
            input.insert(exposed.clone(), value);
        }

        if auto_validate {
            ty.create(input)
        } else {
            ty.create_unvalidated(input)
        }
    }

    /// Parses `json` as an object and builds a validated instance of `name`.
    pub fn from_json(&self, name: &str, json: &str) -> ModelResult<Model> {
        let parsed: serde_json::Value = serde_json::from_str(json).map_err(ModelError::conversion)?;
        match Value::from(parsed) {
            Value::Dict(data) => self.from_dict(name, &data),
            other => Err(ModelError::conversion(format!(
                "expected a JSON object for {name}, found {}",
                other.type_name()
            ))),
        }
    }

    fn convert(&self, declared: &DeclaredType, raw: &Value) -> ModelResult<Value> {
        let declared = declared.unwrap_optional();
        let value = match (declared, raw) {
            (DeclaredType::Model(name) | DeclaredType::ForwardRef(name), Value::Dict(data)) => {
                Value::from(self.from_dict_with(name, data, false)?)
            }
            (
                DeclaredType::List(element) | DeclaredType::Set(element) | DeclaredType::Tuple(element),
                Value::List(items) | Value::Set(items) | Value::Tuple(items),
            ) => {
                let items = self.convert_elements(element, items)?;
                rebuild(declared, items)
            }
            (
                DeclaredType::Plain(Primitive::Set | Primitive::Tuple),
                Value::List(items) | Value::Set(items) | Value::Tuple(items),
            ) => rebuild(declared, items.clone()),
            (DeclaredType::Dict(_, element), Value::Dict(map)) => {
                let mut converted = Dict::with_capacity(map.len());
                for (key, item) in map {
                    converted.insert(key.clone(), self.convert(element, item)?);
                }
                Value::Dict(converted)
            }
            (DeclaredType::Plain(Primitive::DateTime), Value::Str(text)) => {
                temporal::parse_datetime(text, self.settings().parse_dates_as_utc)
                    .unwrap_or_else(|| raw.clone())
            }
            (DeclaredType::Plain(Primitive::Date), Value::Str(text)) => {
                temporal::parse_date(text).map_or_else(|| raw.clone(), Value::Date)
            }
            _ => raw.clone(),
        };
        Ok(value)
    }

    fn convert_elements(&self, element: &DeclaredType, items: &[Value]) -> ModelResult<Vec<Value>> {
        if matches!(element, DeclaredType::Union(_)) {
            warn!(
                element = %element,
                "multi-typed collections are not converted, passing elements through"
            );
            return Ok(items.to_vec());
        }
        items.iter().map(|item| self.convert(element, item)).collect()
    }
}

/// Wraps `items` in the container kind `declared` names.
fn rebuild(declared: &DeclaredType, items: Vec<Value>) -> Value {
    match declared {
        DeclaredType::Set(_) | DeclaredType::Plain(Primitive::Set) => Value::set(items),
        DeclaredType::Tuple(_) | DeclaredType::Plain(Primitive::Tuple) => Value::Tuple(items),
        _ => Value::List(items),
    }
}
