//! Two-phase model registration.
//!
//! Phase one collects [`ModelDef`]s in a [`RegistryBuilder`]. Phase two,
//! [`RegistryBuilder::build`], compiles every declaration into a
//! [`ModelType`] (parents first), then resolves every model and forward
//! reference used by any validator against the complete set of names. An
//! unresolved name fails the build.
//!
//! The built [`Registry`] is immutable and can be shared between threads.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::attr::AttrSpec;
use crate::cache::MetadataCache;
use crate::def::{DeserializerFn, Hooks, ModelDef, PropertyFn, SerializerFn};
use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::settings::Settings;
use crate::validators::Validator;
use crate::value::Dict;

// ============================================================================
// MODEL TYPE
// ============================================================================

/// A compiled model type: the field table plus everything inherited.
pub struct ModelType {
    name: String,
    lineage: Vec<String>,
    specs: Vec<AttrSpec>,
    index: HashMap<String, usize>,
    pub(crate) hooks: Hooks,
    pub(crate) properties: IndexMap<String, PropertyFn>,
    pub(crate) excluded: HashSet<String>,
    pub(crate) deserializers: IndexMap<String, DeserializerFn>,
    pub(crate) serializers: IndexMap<String, SerializerFn>,
    settings: Settings,
    cache: Arc<MetadataCache>,
}

impl ModelType {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type followed by its ancestors, nearest first.
    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    /// Whether this type is `name` or inherits from it.
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.lineage.iter().any(|n| n == name)
    }

    /// Attribute specs, inherited ones first.
    pub fn specs(&self) -> &[AttrSpec] {
        &self.specs
    }

    /// Looks up a spec by internal, base or exposed name.
    pub fn spec(&self, name: &str) -> Option<&AttrSpec> {
        self.position(name).map(|i| &self.specs[i])
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Builds and validates an instance from keyword input.
    pub fn create(self: &Arc<Self>, input: Dict) -> ModelResult<Model> {
        Model::construct(Arc::clone(self), input, true)
    }

    /// Builds an instance without running validation.
    pub fn create_unvalidated(self: &Arc<Self>, input: Dict) -> ModelResult<Model> {
        Model::construct(Arc::clone(self), input, false)
    }

    fn compile(
        def: &ModelDef,
        parent: Option<&Self>,
        settings: Settings,
        cache: &Arc<MetadataCache>,
    ) -> ModelResult<Self> {
        let mut lineage = vec![def.name.clone()];
        if let Some(parent) = parent {
            lineage.extend(parent.lineage.iter().cloned());
        }
        let lineage_refs: Vec<&str> = lineage.iter().map(String::as_str).collect();

        let mut specs: Vec<AttrSpec> = parent.map(|p| p.specs.clone()).unwrap_or_default();
        let mut own = HashSet::new();
        for attr in &def.attrs {
            let spec = attr.compile(&def.name, &lineage_refs, &settings)?;
            if !own.insert(spec.internal_name().to_string()) {
                return Err(ModelError::DuplicateAttribute {
                    model: def.name.clone(),
                    attr: spec.internal_name().to_string(),
                });
            }
            match specs
                .iter()
                .position(|s| s.internal_name() == spec.internal_name())
            {
                Some(i) => specs[i] = spec,
                None => specs.push(spec),
            }
        }

        let mut index = HashMap::new();
        for (i, spec) in specs.iter().enumerate() {
            index.insert(spec.internal_name().to_string(), i);
        }
        for (i, spec) in specs.iter().enumerate() {
            for name in spec.exposed_names() {
                index.entry(name.clone()).or_insert(i);
            }
            index.entry(spec.base_name().to_string()).or_insert(i);
        }

        let mut hooks = def.hooks.clone();
        let mut properties = IndexMap::new();
        let mut excluded = HashSet::new();
        let mut deserializers = IndexMap::new();
        let mut serializers = IndexMap::new();
        if let Some(parent) = parent {
            hooks.inherit(&parent.hooks);
            properties.extend(parent.properties.clone());
            excluded.extend(parent.excluded.iter().cloned());
            deserializers.extend(parent.deserializers.clone());
            serializers.extend(parent.serializers.clone());
        }
        properties.extend(def.properties.clone());
        excluded.extend(def.excluded.iter().cloned());
        deserializers.extend(def.deserializers.clone());
        serializers.extend(def.serializers.clone());

        let ty = Self {
            name: def.name.clone(),
            lineage,
            specs,
            index,
            hooks,
            properties,
            excluded,
            deserializers,
            serializers,
            settings,
            cache: Arc::clone(cache),
        };
        ty.warn_orphan_conversions();
        debug!(
            model = %ty.name,
            attrs = ty.specs.len(),
            parent = ?parent.map(Self::name),
            "compiled model type"
        );
        Ok(ty)
    }

    fn exposes(&self, name: &str) -> bool {
        self.specs
            .iter()
            .any(|s| s.exposed_names().iter().any(|n| n == name))
    }

    fn warn_orphan_conversions(&self) {
        for name in self.deserializers.keys() {
            if !self.exposes(name) {
                warn!(model = %self.name, name = %name, "deserializer registered for a name no attribute exposes");
            }
        }
        for name in self.serializers.keys() {
            if !self.exposes(name) && !self.properties.contains_key(name) {
                warn!(model = %self.name, name = %name, "serializer registered for a name no attribute exposes");
            }
        }
    }

    fn resolve_references(&self, is_known: &dyn Fn(&str) -> bool) -> ModelResult<()> {
        for spec in &self.specs {
            if let Some(name) = spec
                .declared_type()
                .referenced_models()
                .into_iter()
                .find(|name| !is_known(name))
            {
                return Err(ModelError::UnresolvedReference {
                    model: self.name.clone(),
                    attr: spec.internal_name().to_string(),
                    name: name.to_string(),
                });
            }
            if let Some(validator) = spec.validator() {
                validator
                    .resolve(is_known)
                    .map_err(|name| ModelError::UnresolvedReference {
                        model: self.name.clone(),
                        attr: spec.internal_name().to_string(),
                        name,
                    })?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.name)
            .field("lineage", &self.lineage)
            .field("specs", &self.specs)
            .field("hooks", &self.hooks)
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .field("excluded", &self.excluded)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Collects model declarations.
///
/// ```
/// use modelio::{Attr, DeclaredType, ModelDef, RegistryBuilder, Settings, dict};
///
/// let registry = RegistryBuilder::new(Settings::default())
///     .register(
///         ModelDef::new("Person")
///             .attr(Attr::new("name", DeclaredType::STR))
///             .attr(Attr::new("age", DeclaredType::INT)),
///     )
///     .build()
///     .unwrap();
///
/// let rick = registry.create("Person", dict! { "name" => "Rick", "age" => 70 }).unwrap();
/// assert_eq!(rick.to_string(), "Person(age=70, name='Rick')");
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    settings: Settings,
    defs: Vec<ModelDef>,
}

impl RegistryBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            defs: Vec::new(),
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn register(mut self, def: ModelDef) -> Self {
        self.defs.push(def);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn register_all(mut self, defs: impl IntoIterator<Item = ModelDef>) -> Self {
        self.defs.extend(defs);
        self
    }

    /// Compiles every declaration and resolves references.
    ///
    /// # Errors
    ///
    /// Fails on duplicate model names, unknown parents, inheritance cycles,
    /// duplicate attributes, ambiguous declared types and unresolved
    /// references.
    pub fn build(self) -> ModelResult<Registry> {
        let mut defs: IndexMap<String, ModelDef> = IndexMap::with_capacity(self.defs.len());
        for def in self.defs {
            if defs.contains_key(&def.name) {
                return Err(ModelError::DuplicateModel { name: def.name });
            }
            defs.insert(def.name.clone(), def);
        }
        for def in defs.values() {
            if let Some(parent) = &def.parent {
                if !defs.contains_key(parent) {
                    return Err(ModelError::UnknownParent {
                        model: def.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        let cache = Arc::new(MetadataCache::new());
        let mut compiler = Compiler {
            defs: &defs,
            settings: self.settings,
            cache: &cache,
            types: IndexMap::with_capacity(defs.len()),
            in_progress: HashSet::new(),
        };
        for name in defs.keys() {
            compiler.compile(name)?;
        }
        let types = compiler.types;

        let is_known = |name: &str| types.contains_key(name);
        for ty in types.values() {
            ty.resolve_references(&is_known)?;
        }

        debug!(models = types.len(), "model registry built");
        Ok(Registry {
            types: Arc::new(types),
            settings: self.settings,
            cache,
        })
    }
}

struct Compiler<'a> {
    defs: &'a IndexMap<String, ModelDef>,
    settings: Settings,
    cache: &'a Arc<MetadataCache>,
    types: IndexMap<String, Arc<ModelType>>,
    in_progress: HashSet<String>,
}

impl Compiler<'_> {
    fn compile(&mut self, name: &str) -> ModelResult<Arc<ModelType>> {
        if let Some(ty) = self.types.get(name) {
            return Ok(Arc::clone(ty));
        }
        if !self.in_progress.insert(name.to_string()) {
            return Err(ModelError::InheritanceCycle {
                model: name.to_string(),
            });
        }
        let def = self
            .defs
            .get(name)
            .ok_or_else(|| ModelError::UnknownModel {
                name: name.to_string(),
            })?;
        let parent = match &def.parent {
            Some(parent) => Some(self.compile(parent)?),
            None => None,
        };
        let ty = Arc::new(ModelType::compile(
            def,
            parent.as_deref(),
            self.settings,
            self.cache,
        )?);
        self.in_progress.remove(name);
        self.types.insert(name.to_string(), Arc::clone(&ty));
        Ok(ty)
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Compiled model types, looked up by name.
#[derive(Clone)]
pub struct Registry {
    types: Arc<IndexMap<String, Arc<ModelType>>>,
    settings: Settings,
    cache: Arc<MetadataCache>,
}

impl Registry {
    pub fn builder(settings: Settings) -> RegistryBuilder {
        RegistryBuilder::new(settings)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ModelType>> {
        self.types.get(name)
    }

    /// Looks up a model type, failing with [`ModelError::UnknownModel`].
    pub fn model_type(&self, name: &str) -> ModelResult<&Arc<ModelType>> {
        self.get(name).ok_or_else(|| ModelError::UnknownModel {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Builds and validates an instance of `name` from keyword input.
    pub fn create(&self, name: &str, input: Dict) -> ModelResult<Model> {
        self.model_type(name)?.create(input)
    }

    pub fn create_unvalidated(&self, name: &str, input: Dict) -> ModelResult<Model> {
        self.model_type(name)?.create_unvalidated(input)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("count", &self.types.len())
            .field("names", &self.names().collect::<Vec<_>>())
            .field("settings", &self.settings)
            .finish()
    }
}
