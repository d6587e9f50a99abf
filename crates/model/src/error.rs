//! Error types surfaced by model construction and validation.
//!
//! [`ValidationError`] is what validators and validation hooks raise. It
//! carries the dotted/bracketed path of the offending attribute and renders
//! as `"{path} {message}"`, e.g. `Computer.disks[1].size is not instance of int`.
//!
//! [`ModelError`] is the umbrella error returned by registry building,
//! construction and deserialization.

use std::borrow::Cow;
use std::fmt;

use smallvec::SmallVec;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// A validation failure for a single value.
///
/// Uses `Cow<'static, str>` for the code and message so the common case of
/// static messages does not allocate.
///
/// # Examples
///
/// ```
/// use modelio::ValidationError;
///
/// let error = ValidationError::new("type_mismatch", "Person.name", "is not instance of str")
///     .with_param("expected", "str");
/// assert_eq!(error.to_string(), "Person.name is not instance of str");
/// assert_eq!(error.param("expected"), Some("str"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error code for programmatic handling.
    ///
    /// Examples: "type_mismatch", "not_nullable", "min_length"
    pub code: Cow<'static, str>,

    /// Path of the value that failed, e.g. "Computer.cpu.frequency".
    pub path: String,

    /// Human-readable message, rendered after the path.
    pub message: Cow<'static, str>,

    /// Parameters describing the failed constraint.
    ///
    /// Stored as ordered key-value pairs (typically 0-2 params).
    pub params: SmallVec<[(Cow<'static, str>, Cow<'static, str>); 2]>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(
        code: impl Into<Cow<'static, str>>,
        path: impl Into<String>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            code: code.into(),
            path: path.into(),
            message: message.into(),
            params: SmallVec::new(),
        }
    }

    /// Creates an error raised by user code, such as a validation hook.
    pub fn custom(path: impl Into<String>, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new("custom", path, message)
    }

    /// Adds a parameter to the error.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Replaces the message, keeping code, path and params.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Looks up a parameter value by key.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} {}", self.path, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// MODEL ERROR
// ============================================================================

/// Error type for registry building, construction and deserialization.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A validator or validation hook rejected a value.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Input supplied a value for an attribute that does not accept input.
    #[error("{attr} attribute is not initable for class {model}")]
    NonInitableAttribute { attr: String, model: String },

    /// A declared type is too ambiguous to infer a validator for.
    #[error(
        "can not automatically instantiate a validator for {model}.{attr} of type {declared}: {reason}"
    )]
    AutoValidatorBuild {
        model: String,
        attr: String,
        declared: String,
        reason: String,
    },

    /// A model or forward reference name is not registered.
    #[error("unresolved reference `{name}` in {model}.{attr}")]
    UnresolvedReference {
        model: String,
        attr: String,
        name: String,
    },

    /// No model type is registered under the given name.
    #[error("model `{name}` is not registered")]
    UnknownModel { name: String },

    /// Two declarations share a model name.
    #[error("model `{name}` is already registered")]
    DuplicateModel { name: String },

    /// A declaration extends a model that is not registered.
    #[error("model `{model}` extends unknown model `{parent}`")]
    UnknownParent { model: String, parent: String },

    /// A declaration extends itself, directly or indirectly.
    #[error("inheritance cycle through model `{model}`")]
    InheritanceCycle { model: String },

    /// A declaration repeats an attribute name.
    #[error("attribute `{attr}` is declared twice on {model}")]
    DuplicateAttribute { model: String, attr: String },

    /// An attribute lookup by name failed.
    #[error("{model} has no attribute `{attr}`")]
    UnknownAttribute { model: String, attr: String },

    /// A regex given to a string validator does not compile.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// An error raised by a user conversion function, propagated as-is.
    #[error(transparent)]
    Conversion(Box<dyn std::error::Error + Send + Sync>),
}

impl ModelError {
    /// Wraps an error raised inside a custom conversion function.
    pub fn conversion(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Conversion(error.into())
    }

    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Validation(_) => "MODEL_VALIDATION",
            Self::NonInitableAttribute { .. } => "MODEL_NON_INITABLE",
            Self::AutoValidatorBuild { .. } => "MODEL_AUTO_VALIDATOR",
            Self::UnresolvedReference { .. } => "MODEL_UNRESOLVED_REF",
            Self::UnknownModel { .. } => "MODEL_UNKNOWN",
            Self::DuplicateModel { .. } => "MODEL_DUPLICATE",
            Self::UnknownParent { .. } => "MODEL_UNKNOWN_PARENT",
            Self::InheritanceCycle { .. } => "MODEL_INHERITANCE_CYCLE",
            Self::DuplicateAttribute { .. } => "MODEL_DUPLICATE_ATTR",
            Self::UnknownAttribute { .. } => "MODEL_UNKNOWN_ATTR",
            Self::InvalidPattern { .. } => "MODEL_INVALID_PATTERN",
            Self::Conversion(_) => "MODEL_CONVERSION",
        }
    }

    /// Returns the validation error, if this is one.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(error) => Some(error),
            _ => None,
        }
    }
}

/// Result alias used across the crate.
pub type ModelResult<T> = Result<T, ModelError>;
