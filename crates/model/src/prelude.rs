//! Prelude module for convenient imports.
//!
//! ```rust
//! use modelio::prelude::*;
//!
//! let name = Attr::new("name", DeclaredType::STR).validator(StringValidator::new().min_len(1));
//! # let _ = name;
//! ```

// ============================================================================
// DECLARATIONS AND INSTANCES
// ============================================================================

pub use crate::{
    Attr, AttrSpec, AttrValidation, DeclaredType, Dict, Model, ModelDef, ModelError, ModelResult,
    ModelState, ModelType, Registry, RegistryBuilder, Settings, UNDEFINED, ValidationError, Value,
    ValueKind, Visibility, dict,
};

// ============================================================================
// VALIDATORS
// ============================================================================

pub use crate::validators::{
    EmailValidator, ForwardRefValidator, IterableValidator, NumericValidator, SharedValidator,
    StringValidator, TypeValidator, Validator,
};
