//! Registry configuration

use serde::{Deserialize, Serialize};

/// Flags read when model types are compiled and instances are built.
///
/// Passed to [`RegistryBuilder`](crate::RegistryBuilder); every registry owns
/// its own copy, so tests can use a fresh configuration per case.
///
/// ```
/// use modelio::Settings;
///
/// let settings: Settings = serde_json::from_str(r#"{"parse_dates_as_utc": true}"#).unwrap();
/// assert!(settings.parse_dates_as_utc);
/// assert!(settings.use_default_validator);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Infer a validator from the declared type when none is given.
    pub use_default_validator: bool,

    /// Let protected attributes be set through their exposed name.
    pub init_protected_by_default: bool,

    /// Let private attributes be set through their exposed name.
    pub init_private_by_default: bool,

    /// Replace the timezone of parsed datetimes with UTC.
    pub parse_dates_as_utc: bool,

    /// Memoize per-model metadata lookups.
    pub use_cache: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_default_validator: true,
            init_protected_by_default: false,
            init_private_by_default: false,
            parse_dates_as_utc: false,
            use_cache: true,
        }
    }
}

impl Settings {
    #[must_use = "builder methods must be chained or built"]
    pub fn with_default_validator(mut self, enabled: bool) -> Self {
        self.use_default_validator = enabled;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_init_protected(mut self, enabled: bool) -> Self {
        self.init_protected_by_default = enabled;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_init_private(mut self, enabled: bool) -> Self {
        self.init_private_by_default = enabled;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_dates_as_utc(mut self, enabled: bool) -> Self {
        self.parse_dates_as_utc = enabled;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }
}
