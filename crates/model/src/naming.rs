//! Attribute visibility and exposed-name resolution.
//!
//! Visibility is an explicit tag on each attribute. When a declaration does
//! not set it, it is read from the declared name:
//!
//! - `name` is public and exposed as `name`
//! - `_name` is protected and exposed as `name`
//! - `__name` is private, stored as `_Owner__name` and exposed as `name`
//!
//! Private names are checked against the prefixes of the declaring model
//! and every ancestor, because a private attribute inherited from a parent
//! keeps the parent's prefix.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Visibility of an attribute.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mangling prefix for private attributes declared on `model`.
pub fn private_prefix(model: &str) -> String {
    format!("_{model}__")
}

/// Resolves visibility and exposed name of a stored attribute name.
///
/// `lineage` is the model followed by its ancestors, nearest first.
///
/// # Examples
///
/// ```
/// use modelio::naming::{resolve, Visibility};
///
/// assert_eq!(resolve("name", &["Person"]), (Visibility::Public, "name".into()));
/// assert_eq!(resolve("_name", &["Person"]), (Visibility::Protected, "name".into()));
/// assert_eq!(resolve("_Base__id", &["Child", "Base"]), (Visibility::Private, "id".into()));
/// ```
pub fn resolve(internal: &str, lineage: &[&str]) -> (Visibility, String) {
    if let Some(rest) = strip_private_prefix(internal, lineage) {
        let base = rest.strip_suffix("__").unwrap_or(rest);
        return (Visibility::Private, base.to_string());
    }
    if let Some(rest) = internal.strip_prefix('_') {
        let base = rest.strip_suffix('_').unwrap_or(rest);
        return (Visibility::Protected, base.to_string());
    }
    (Visibility::Public, internal.to_string())
}

fn strip_private_prefix<'a>(name: &'a str, lineage: &[&str]) -> Option<&'a str> {
    if let Some(rest) = name.strip_prefix("__") {
        return Some(rest);
    }
    lineage
        .iter()
        .find_map(|model| name.strip_prefix(private_prefix(model).as_str()))
}

/// Storage name for an attribute declared on `owner`.
///
/// With no explicit visibility, `__name` is mangled to `_Owner__name` unless
/// it also ends in `__`; other names are stored as declared. With an explicit
/// visibility the storage name is rebuilt from the base name.
pub fn internal_name(declared: &str, owner: &str, explicit: Option<Visibility>) -> String {
    match explicit {
        None => {
            let dunder = declared.len() > 4 && declared.ends_with("__");
            match declared.strip_prefix("__") {
                Some(rest) if !dunder => format!("{}{rest}", private_prefix(owner)),
                _ => declared.to_string(),
            }
        }
        Some(visibility) => {
            let (_, base) = resolve(declared, &[owner]);
            match visibility {
                Visibility::Public => base,
                Visibility::Protected => format!("_{base}"),
                Visibility::Private => format!("{}{base}", private_prefix(owner)),
            }
        }
    }
}
