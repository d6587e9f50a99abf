//! Attribute declarations and their compiled form.
//!
//! [`Attr`] is what a model declaration lists. When a registry is built, each
//! `Attr` is compiled into an immutable [`AttrSpec`] holding the storage
//! name, exposed names, validator and input policy.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::builder::build_default_validator;
use crate::error::{ModelError, ModelResult, ValidationError};
use crate::naming::{self, Visibility};
use crate::settings::Settings;
use crate::types::DeclaredType;
use crate::validators::{SharedValidator, Validator};
use crate::value::Value;

/// Produces the value of an attribute that was not supplied.
pub type DefaultFactory = Arc<dyn Fn() -> Value + Send + Sync>;

#[derive(Clone)]
enum ValidatorChoice {
    Inferred,
    Disabled,
    Explicit(SharedValidator),
}

// ============================================================================
// DECLARATION
// ============================================================================

/// Declaration of a single model attribute.
///
/// # Examples
///
/// ```
/// use modelio::{Attr, DeclaredType};
/// use modelio::validators::StringValidator;
///
/// let name = Attr::new("name", DeclaredType::STR)
///     .validator(StringValidator::new().min_len(1))
///     .alias("full_name");
/// let id = Attr::new("__id", DeclaredType::STR)
///     .non_initable()
///     .default_factory(|| "generated".into());
/// let note = Attr::new("note", DeclaredType::STR).compare(false).default_value("");
/// # let _ = (name, id, note);
/// ```
#[derive(Clone)]
pub struct Attr {
    name: String,
    declared_type: DeclaredType,
    validator: ValidatorChoice,
    initable: bool,
    aliases: SmallVec<[String; 1]>,
    init_by_public_alias: bool,
    default_factory: Option<DefaultFactory>,
    compare: bool,
    visibility: Option<Visibility>,
}

impl Attr {
    pub fn new(name: impl Into<String>, declared_type: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            validator: ValidatorChoice::Inferred,
            initable: true,
            aliases: SmallVec::new(),
            init_by_public_alias: false,
            default_factory: None,
            compare: true,
            visibility: None,
        }
    }

    /// Uses `validator` instead of the inferred one.
    #[must_use = "builder methods must be chained or built"]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = ValidatorChoice::Explicit(Arc::new(validator));
        self
    }

    /// Uses an already shared validator.
    #[must_use = "builder methods must be chained or built"]
    pub fn shared_validator(mut self, validator: SharedValidator) -> Self {
        self.validator = ValidatorChoice::Explicit(validator);
        self
    }

    /// Disables validation of this attribute.
    #[must_use = "builder methods must be chained or built"]
    pub fn no_validator(mut self) -> Self {
        self.validator = ValidatorChoice::Disabled;
        self
    }

    /// Rejects any input for this attribute; the default is always used.
    #[must_use = "builder methods must be chained or built"]
    pub fn non_initable(mut self) -> Self {
        self.initable = false;
        self
    }

    /// Replaces the exposed name with `alias`.
    #[must_use = "builder methods must be chained or built"]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        self.aliases([alias.into()])
    }

    /// Replaces the exposed name with `aliases`, tried in order.
    #[must_use = "builder methods must be chained or built"]
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Lets a protected or private attribute be set through its exposed name.
    #[must_use = "builder methods must be chained or built"]
    pub fn init_by_public_alias(mut self) -> Self {
        self.init_by_public_alias = true;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn default_factory(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default_factory = Some(Arc::new(factory));
        self
    }

    /// Uses a clone of `value` as the default.
    #[must_use = "builder methods must be chained or built"]
    pub fn default_value(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default_factory(move || value.clone())
    }

    /// Whether this attribute takes part in equality.
    #[must_use = "builder methods must be chained or built"]
    pub fn compare(mut self, compare: bool) -> Self {
        self.compare = compare;
        self
    }

    /// Sets visibility explicitly instead of reading it from the name.
    #[must_use = "builder methods must be chained or built"]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared_type
    }

    /// Storage name this declaration gets on `owner`.
    pub(crate) fn internal_name(&self, owner: &str) -> String {
        naming::internal_name(&self.name, owner, self.visibility)
    }

    /// Compiles the declaration for `owner`.
    ///
    /// `lineage` is the owner followed by its ancestors, nearest first.
    pub(crate) fn compile(
        &self,
        owner: &str,
        lineage: &[&str],
        settings: &Settings,
    ) -> ModelResult<AttrSpec> {
        let internal_name = self.internal_name(owner);
        let (derived, base_name) = naming::resolve(&internal_name, lineage);
        let visibility = self.visibility.unwrap_or(derived);

        let has_aliases = !self.aliases.is_empty();
        let exposed_names = if has_aliases {
            self.aliases.clone()
        } else {
            SmallVec::from_elem(base_name.clone(), 1)
        };

        let accepts_input = self.initable
            && match visibility {
                Visibility::Public => true,
                _ if has_aliases || self.init_by_public_alias => true,
                Visibility::Protected => settings.init_protected_by_default,
                Visibility::Private => settings.init_private_by_default,
            };

        let validator = match &self.validator {
            ValidatorChoice::Explicit(v) => Some(Arc::clone(v)),
            ValidatorChoice::Disabled => None,
            ValidatorChoice::Inferred if settings.use_default_validator => Some(
                build_default_validator(&self.declared_type).map_err(|e| {
                    ModelError::AutoValidatorBuild {
                        model: owner.to_string(),
                        attr: internal_name.clone(),
                        declared: e.declared,
                        reason: e.reason,
                    }
                })?,
            ),
            ValidatorChoice::Inferred => None,
        };

        Ok(AttrSpec {
            internal_name,
            base_name,
            visibility,
            owner: owner.to_string(),
            declared_type: self.declared_type.clone(),
            validator,
            initable: self.initable,
            accepts_input,
            exposed_names,
            default_factory: self.default_factory.clone(),
            comparable: self.compare,
        })
    }
}

impl fmt::Debug for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attr")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("initable", &self.initable)
            .field("aliases", &self.aliases)
            .field("compare", &self.compare)
            .field("visibility", &self.visibility)
            .finish()
    }
}

// ============================================================================
// COMPILED SPEC
// ============================================================================

/// Compiled, immutable metadata of one attribute.
#[derive(Clone)]
pub struct AttrSpec {
    internal_name: String,
    base_name: String,
    visibility: Visibility,
    owner: String,
    declared_type: DeclaredType,
    validator: Option<SharedValidator>,
    initable: bool,
    accepts_input: bool,
    exposed_names: SmallVec<[String; 1]>,
    default_factory: Option<DefaultFactory>,
    comparable: bool,
}

impl AttrSpec {
    /// Storage name, e.g. `_Person__id` for a private `__id`.
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    /// Name with visibility syntax stripped.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Model that declared this attribute.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared_type
    }

    pub fn validator(&self) -> Option<&SharedValidator> {
        self.validator.as_ref()
    }

    /// Whether the declaration allows input at all.
    pub fn is_initable(&self) -> bool {
        self.initable
    }

    /// Whether construction input may supply this attribute.
    pub fn accepts_input(&self) -> bool {
        self.accepts_input
    }

    /// External names, never empty.
    pub fn exposed_names(&self) -> &[String] {
        &self.exposed_names
    }

    /// The first exposed name, used in validation paths.
    pub fn exposed_name(&self) -> &str {
        &self.exposed_names[0]
    }

    pub fn is_comparable(&self) -> bool {
        self.comparable
    }

    /// Whether `name` addresses this attribute.
    pub fn answers_to(&self, name: &str) -> bool {
        self.internal_name == name
            || self.base_name == name
            || self.exposed_names.iter().any(|n| n == name)
    }

    /// Runs the default factory, or returns `None` without one.
    pub fn default_value(&self) -> Value {
        self.default_factory
            .as_ref()
            .map_or(Value::Null, |factory| factory())
    }

    /// Runs the attribute's validator, if any.
    pub fn validate(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        match &self.validator {
            Some(validator) => validator.validate(value, path),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for AttrSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttrSpec")
            .field("internal_name", &self.internal_name)
            .field("visibility", &self.visibility)
            .field("owner", &self.owner)
            .field("declared_type", &self.declared_type)
            .field("validator", &self.validator)
            .field("accepts_input", &self.accepts_input)
            .field("exposed_names", &self.exposed_names)
            .field("comparable", &self.comparable)
            .finish()
    }
}
