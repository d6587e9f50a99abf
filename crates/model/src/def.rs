//! Model declarations.
//!
//! A [`ModelDef`] is the explicit field-metadata table of one model type:
//! its attributes, optional parent, lifecycle hooks and conversion
//! overrides. Declarations are collected by a
//! [`RegistryBuilder`](crate::RegistryBuilder) and compiled once.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::attr::{Attr, AttrSpec};
use crate::error::{ModelError, ValidationError};
use crate::model::Model;
use crate::value::{Dict, Value};

/// Rewrites the raw construction input.
pub type BeforeInitHook = Arc<dyn Fn(Dict) -> Result<Dict, ModelError> + Send + Sync>;

/// Runs on a constructed instance.
pub type ModelHook = Arc<dyn Fn(&mut Model) -> Result<(), ModelError> + Send + Sync>;

/// Extra per-attribute check, run after the attribute's validator.
pub type AttrHook =
    Arc<dyn Fn(&Model, &AttrValidation<'_>) -> Result<(), ValidationError> + Send + Sync>;

/// Computes a serializable property.
pub type PropertyFn = Arc<dyn Fn(&Model) -> Value + Send + Sync>;

/// Replaces the default conversion of a value in `to_dict`.
pub type SerializerFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Converts a raw mapping value into the stored value in `from_dict`.
pub type DeserializerFn = Arc<dyn Fn(&Value) -> Result<Value, ModelError> + Send + Sync>;

/// What a [`ModelDef::when_validating_attr`] hook is told about the attribute
/// being validated.
#[derive(Debug, Clone, Copy)]
pub struct AttrValidation<'a> {
    /// Storage name.
    pub internal_name: &'a str,
    /// Name used in the path.
    pub exposed_name: &'a str,
    pub value: &'a Value,
    /// Full path of the attribute, e.g. `Person.age`.
    pub path: &'a str,
    /// Path of the model holding the attribute, e.g. `Person`.
    pub parent_path: &'a str,
    pub spec: &'a AttrSpec,
}

impl AttrValidation<'_> {
    /// A custom error located at this attribute.
    pub fn error(&self, message: impl Into<std::borrow::Cow<'static, str>>) -> ValidationError {
        ValidationError::custom(self.path, message)
    }
}

// ============================================================================
// HOOKS
// ============================================================================

/// Lifecycle hooks of a model type. Every hook defaults to a no-op.
#[derive(Clone, Default)]
pub(crate) struct Hooks {
    pub before_init: Option<BeforeInitHook>,
    pub before_validate: Option<ModelHook>,
    pub once_validated: Option<ModelHook>,
    pub when_validating_attr: Option<AttrHook>,
}

impl Hooks {
    /// Fills hooks this set does not define from `parent`.
    pub fn inherit(&mut self, parent: &Self) {
        fn fill<T: Clone>(slot: &mut Option<T>, parent: Option<&T>) {
            if slot.is_none() {
                *slot = parent.cloned();
            }
        }
        fill(&mut self.before_init, parent.before_init.as_ref());
        fill(&mut self.before_validate, parent.before_validate.as_ref());
        fill(&mut self.once_validated, parent.once_validated.as_ref());
        fill(&mut self.when_validating_attr, parent.when_validating_attr.as_ref());
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_init", &self.before_init.is_some())
            .field("before_validate", &self.before_validate.is_some())
            .field("once_validated", &self.once_validated.is_some())
            .field("when_validating_attr", &self.when_validating_attr.is_some())
            .finish()
    }
}

// ============================================================================
// MODEL DEFINITION
// ============================================================================

/// Declaration of a model type.
///
/// # Examples
///
/// ```
/// use modelio::{Attr, DeclaredType, ModelDef, Value};
///
/// let person = ModelDef::new("Person")
///     .attr(Attr::new("name", DeclaredType::STR))
///     .attr(Attr::new("age", DeclaredType::INT))
///     .property("is_adult", |m| Value::from(m.get("age").and_then(Value::as_int) >= Some(18)));
///
/// let admin = ModelDef::new("Admin")
///     .extends("Person")
///     .attr(Attr::new("level", DeclaredType::INT).default_value(1));
/// # let _ = (person, admin);
/// ```
#[derive(Clone)]
pub struct ModelDef {
    pub(crate) name: String,
    pub(crate) parent: Option<String>,
    pub(crate) attrs: Vec<Attr>,
    pub(crate) hooks: Hooks,
    pub(crate) properties: IndexMap<String, PropertyFn>,
    pub(crate) excluded: Vec<String>,
    pub(crate) deserializers: IndexMap<String, DeserializerFn>,
    pub(crate) serializers: IndexMap<String, SerializerFn>,
}

impl ModelDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            attrs: Vec::new(),
            hooks: Hooks::default(),
            properties: IndexMap::new(),
            excluded: Vec::new(),
            deserializers: IndexMap::new(),
            serializers: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// Inherits attributes, hooks and conversions from `parent`.
    #[must_use = "builder methods must be chained or built"]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Receives the raw input mapping and returns the one assignment reads.
    #[must_use = "builder methods must be chained or built"]
    pub fn before_init(
        mut self,
        hook: impl Fn(Dict) -> Result<Dict, ModelError> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.before_init = Some(Arc::new(hook));
        self
    }

    /// Runs after assignment, before validation.
    #[must_use = "builder methods must be chained or built"]
    pub fn before_validate(
        mut self,
        hook: impl Fn(&mut Model) -> Result<(), ModelError> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.before_validate = Some(Arc::new(hook));
        self
    }

    /// Runs last during construction, whether or not validation ran.
    #[must_use = "builder methods must be chained or built"]
    pub fn once_validated(
        mut self,
        hook: impl Fn(&mut Model) -> Result<(), ModelError> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.once_validated = Some(Arc::new(hook));
        self
    }

    /// Runs for every attribute, after its validator passed.
    #[must_use = "builder methods must be chained or built"]
    pub fn when_validating_attr(
        mut self,
        hook: impl Fn(&Model, &AttrValidation<'_>) -> Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.hooks.when_validating_attr = Some(Arc::new(hook));
        self
    }

    /// Adds a computed property, serialized under `name`.
    #[must_use = "builder methods must be chained or built"]
    pub fn property(
        mut self,
        name: impl Into<String>,
        compute: impl Fn(&Model) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.properties.insert(name.into(), Arc::new(compute));
        self
    }

    /// Exposes the attribute `attr` as the serializable property `name`.
    ///
    /// This is how a protected or private attribute is made part of the
    /// output.
    #[must_use = "builder methods must be chained or built"]
    pub fn getter(self, name: impl Into<String>, attr: impl Into<String>) -> Self {
        let attr = attr.into();
        self.property(name, move |model| model.get(&attr).cloned().unwrap_or_default())
    }

    /// Keeps `name` out of `to_dict` and the representation.
    #[must_use = "builder methods must be chained or built"]
    pub fn do_not_serialize(mut self, name: impl Into<String>) -> Self {
        self.excluded.push(name.into());
        self
    }

    /// Converts the raw value found under any of `names` in `from_dict`.
    #[must_use = "builder methods must be chained or built"]
    pub fn deserializer<I, S>(
        mut self,
        names: I,
        convert: impl Fn(&Value) -> Result<Value, ModelError> + Send + Sync + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let convert: DeserializerFn = Arc::new(convert);
        for name in names {
            self.deserializers.insert(name.into(), Arc::clone(&convert));
        }
        self
    }

    /// Converts the value serialized under `name` in `to_dict`.
    #[must_use = "builder methods must be chained or built"]
    pub fn serializer(
        mut self,
        name: impl Into<String>,
        convert: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.serializers.insert(name.into(), Arc::new(convert));
        self
    }
}

impl fmt::Debug for ModelDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDef")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("attrs", &self.attrs)
            .field("hooks", &self.hooks)
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .field("excluded", &self.excluded)
            .field("deserializers", &self.deserializers.keys().collect::<Vec<_>>())
            .field("serializers", &self.serializers.keys().collect::<Vec<_>>())
            .finish()
    }
}
