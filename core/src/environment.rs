//! Environment variable sources.
//!
//! Lookups go through [`EnvSource`] so the map can be exercised without
//! touching the real process environment.

use std::collections::HashMap;

/// Read access to a table of environment variables.
pub trait EnvSource {
    /// Value of the variable named exactly `key`, or `None` if it is unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
///
/// Variables whose value is not valid Unicode read as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvSource for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory variable table.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    /// Variables by name.
    vars: HashMap<String, String>,
}

impl MapEnv {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MapEnv::set`].
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a variable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Unset a variable, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}
