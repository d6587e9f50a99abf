//! Model instances and the construction lifecycle.
//!
//! Construction runs in a fixed order:
//!
//! 1. `before_init` rewrites the raw input
//! 2. every attribute is assigned from its first present exposed name, or
//!    from its default factory
//! 3. `before_validate`
//! 4. validation, unless skipped
//! 5. `once_validated`
//!
//! Any error aborts construction.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::attr::AttrSpec;
use crate::cache::Names;
use crate::def::AttrValidation;
use crate::error::{ModelError, ModelResult, ValidationError};
use crate::naming::Visibility;
use crate::registry::ModelType;
use crate::repr;
use crate::value::{Dict, Value};

/// Lifecycle position of a [`Model`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelState {
    Uninitialized,
    AttrsAssigned,
    PreValidated,
    Validated,
    ValidationSkipped,
    Ready,
}

/// An instance of a compiled [`ModelType`].
///
/// Holds one value per attribute spec. The field set is fixed by the type;
/// values can be changed with [`Model::set`].
#[derive(Clone)]
pub struct Model {
    ty: Arc<ModelType>,
    values: Vec<Value>,
    state: ModelState,
}

impl Model {
    pub(crate) fn construct(
        ty: Arc<ModelType>,
        input: Dict,
        auto_validate: bool,
    ) -> ModelResult<Self> {
        let mut model = Self {
            values: Vec::with_capacity(ty.specs().len()),
            ty,
            state: ModelState::Uninitialized,
        };
        trace!(model = %model.type_name(), "constructing");

        let input = match model.ty.hooks.before_init.clone() {
            Some(hook) => hook(input)?,
            None => input,
        };
        let values = model
            .ty
            .specs()
            .iter()
            .map(|spec| model.assign(spec, &input))
            .collect::<ModelResult<Vec<_>>>()?;
        model.values = values;
        model.state = ModelState::AttrsAssigned;
        trace!(model = %model.type_name(), "attributes assigned");

        if let Some(hook) = model.ty.hooks.before_validate.clone() {
            hook(&mut model)?;
        }
        model.state = ModelState::PreValidated;

        if auto_validate {
            model.validate(None)?;
            model.state = ModelState::Validated;
        } else {
            model.state = ModelState::ValidationSkipped;
        }
        trace!(model = %model.type_name(), state = ?model.state, "validation phase done");

        if let Some(hook) = model.ty.hooks.once_validated.clone() {
            hook(&mut model)?;
        }
        model.state = ModelState::Ready;
        Ok(model)
    }

    fn assign(&self, spec: &AttrSpec, input: &Dict) -> ModelResult<Value> {
        let supplied = spec
            .exposed_names()
            .iter()
            .find_map(|name| input.get(name.as_str()));
        match supplied {
            Some(_) if !spec.accepts_input() => Err(ModelError::NonInitableAttribute {
                attr: spec.internal_name().to_string(),
                model: self.type_name().to_string(),
            }),
            Some(value) if !value.is_undefined() => Ok(value.clone()),
            _ => Ok(spec.default_value()),
        }
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    pub fn model_type(&self) -> &Arc<ModelType> {
        &self.ty
    }

    /// Whether this instance's type is `name` or inherits from it.
    pub fn is_instance_of(&self, name: &str) -> bool {
        self.ty.is_subtype_of(name)
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Value of the attribute with the given internal, base or exposed name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.ty.position(name).map(|i| &self.values[i])
    }

    /// Replaces an attribute value without validating it.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> ModelResult<()> {
        let slot = self.ty.position(name).ok_or_else(|| ModelError::UnknownAttribute {
            model: self.type_name().to_string(),
            attr: name.to_string(),
        })?;
        self.values[slot] = value.into();
        Ok(())
    }

    /// Specs paired with their current values, in declaration order.
    pub fn attrs(&self) -> impl Iterator<Item = (&AttrSpec, &Value)> {
        self.ty.specs().iter().zip(&self.values)
    }

    /// Validates every attribute, nested models included.
    ///
    /// Paths start at `parent_path`, or at the type name when absent. Stops
    /// at the first failure.
    pub fn validate(&self, parent_path: Option<&str>) -> Result<(), ValidationError> {
        let parent_path = parent_path.unwrap_or_else(|| self.type_name());
        let hook = self.ty.hooks.when_validating_attr.as_ref();
        for (spec, value) in self.attrs() {
            let path = format!("{parent_path}.{}", spec.exposed_name());
            spec.validate(value, &path)?;
            if let Some(hook) = hook {
                hook(
                    self,
                    &AttrValidation {
                        internal_name: spec.internal_name(),
                        exposed_name: spec.exposed_name(),
                        value,
                        path: &path,
                        parent_path,
                        spec,
                    },
                )?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // PATCH
    // ========================================================================

    /// Copies values from `source` into attributes still equal to `unset`.
    ///
    /// Attributes holding a nested model are patched recursively instead of
    /// being replaced.
    pub fn patch(&mut self, source: &Self, unset: &Value) {
        let ty = Arc::clone(&self.ty);
        for (spec, slot) in ty.specs().iter().zip(self.values.iter_mut()) {
            let incoming = source
                .get(spec.internal_name())
                .or_else(|| source.get(spec.exposed_name()));
            if let Some(incoming) = incoming {
                patch_slot(slot, incoming, unset);
            }
        }
    }

    /// Like [`Model::patch`], reading from a mapping by exposed name.
    pub fn patch_from_dict(&mut self, source: &Dict, unset: &Value) {
        let ty = Arc::clone(&self.ty);
        for (spec, slot) in ty.specs().iter().zip(self.values.iter_mut()) {
            let incoming = spec
                .exposed_names()
                .iter()
                .find_map(|name| source.get(name.as_str()));
            if let Some(incoming) = incoming {
                patch_slot(slot, incoming, unset);
            }
        }
    }

    // ========================================================================
    // SERIALIZABLE VIEW
    // ========================================================================

    /// Names emitted by `to_dict` and the representation, sorted.
    ///
    /// Public attributes plus computed properties, minus excluded names.
    pub fn serializable_names(&self) -> Names {
        let compute = || {
            let mut names: Vec<String> = self
                .ty
                .specs()
                .iter()
                .filter(|spec| spec.visibility() == Visibility::Public)
                .map(|spec| spec.exposed_name().to_string())
                .chain(self.ty.properties.keys().cloned())
                .filter(|name| !self.ty.excluded.contains(name))
                .collect();
            names.sort();
            names.dedup();
            names
        };
        if self.ty.settings().use_cache {
            self.ty
                .cache()
                .get_or_insert_with(self.type_name(), "serializable_names", compute)
        } else {
            compute().into()
        }
    }

    /// Serializable names paired with their current values.
    pub fn serializable_values(&self) -> Vec<(String, Value)> {
        self.serializable_names()
            .iter()
            .map(|name| {
                let value = match self.ty.properties.get(name) {
                    Some(compute) => compute(self),
                    None => self.get(name).cloned().unwrap_or_default(),
                };
                (name.clone(), value)
            })
            .collect()
    }
}

fn patch_slot(slot: &mut Value, incoming: &Value, unset: &Value) {
    if *slot == *unset {
        *slot = incoming.clone();
        return;
    }
    if let Value::Model(current) = slot {
        match incoming {
            Value::Model(nested) => current.patch(nested, unset),
            Value::Dict(nested) => current.patch_from_dict(nested, unset),
            _ => {}
        }
    }
}

impl PartialEq for Model {
    /// Same type and equal comparable attributes.
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name()
            && self
                .attrs()
                .zip(&other.values)
                .all(|((spec, a), b)| !spec.is_comparable() || a == b)
    }
}

impl fmt::Display for Model {
    /// `Person(age=70, name='Rick')`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        repr::write_model(f, self)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.type_name());
        for (spec, value) in self.attrs() {
            out.field(spec.internal_name(), value);
        }
        out.finish()
    }
}
