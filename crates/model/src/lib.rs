//! # modelio
//!
//! Declarative data models: declare typed attributes once, get construction,
//! validation, equality, representation and conversion to and from plain
//! mappings.
//!
//! ## Quick Start
//!
//! ```rust
//! use modelio::prelude::*;
//!
//! let registry = RegistryBuilder::new(Settings::default())
//!     .register(
//!         ModelDef::new("Person")
//!             .attr(Attr::new("name", DeclaredType::STR))
//!             .attr(Attr::new("age", DeclaredType::INT).validator(NumericValidator::int().min(0))),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let rick = registry.create("Person", dict! { "name" => "Rick", "age" => 70 }).unwrap();
//! assert_eq!(rick.to_dict(), dict! { "name" => "Rick", "age" => 70 });
//!
//! let err = registry.create("Person", dict! { "name" => 123, "age" => 70 }).unwrap_err();
//! assert_eq!(err.to_string(), "Person.name is not instance of str");
//! ```
//!
//! ## Building Blocks
//!
//! - [`ModelDef`] and [`Attr`] declare a model's field table
//! - [`RegistryBuilder`] compiles declarations and resolves references
//!   between models, yielding a [`Registry`]
//! - [`Model`] is an instance; nested models are [`Value::Model`] values
//! - [`validators`] holds the built-in rules; [`builder`] infers one from a
//!   [`DeclaredType`] when none is given
//! - [`Settings`] is the configuration passed to the registry

// ValidationError is returned by every validator call; boxing it would add an
// allocation to the error path of every field.
#![allow(clippy::result_large_err)]
#![allow(clippy::type_complexity)]

pub mod attr;
pub mod builder;
pub mod cache;
pub mod def;
mod deserialize;
pub mod error;
pub mod model;
pub mod naming;
pub mod prelude;
pub mod registry;
mod repr;
pub mod serialize;
pub mod settings;
pub mod temporal;
pub mod types;
pub mod validators;
pub mod value;

pub use attr::{Attr, AttrSpec};
pub use cache::MetadataCache;
pub use def::{AttrValidation, ModelDef};
pub use error::{ModelError, ModelResult, ValidationError};
pub use model::{Model, ModelState};
pub use naming::Visibility;
pub use registry::{ModelType, Registry, RegistryBuilder};
pub use settings::Settings;
pub use types::{DeclaredType, Primitive, TypeTag};
pub use value::{Dict, UNDEFINED, Value, ValueKind};
