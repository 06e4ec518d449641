//! The configuration map and its resolving accessors.

use crate::environment::{EnvSource, SystemEnv};
use crate::error::{ConfigError, Result};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// What [`ConfigMap::get_env_or_default`] persists after it falls back to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteBack {
    /// Store the caller's fallback, whatever was resolved and returned.
    ///
    /// A usable value already in the map is returned but then replaced by
    /// the fallback, so the returned and stored values can differ.
    #[default]
    Fallback,
    /// Store exactly the value that was returned.
    Resolved,
}

/// String-keyed map of untyped configuration values.
///
/// Entries holding an absent value (see [`Value::is_present`]) stay in the
/// container but read as missing through [`get`](Self::get) and are
/// overwritten by the resolving accessors.
#[derive(Debug, Clone, Default)]
pub struct ConfigMap<E = SystemEnv> {
    /// Stored entries, including absent ones.
    entries: IndexMap<String, Value>,
    /// Source consulted by [`get_env_or_default`](Self::get_env_or_default).
    env: E,
    /// Persistence policy for environment fallbacks.
    write_back: WriteBack,
}

impl ConfigMap {
    /// Create an empty map backed by the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: EnvSource> ConfigMap<E> {
    /// Create an empty map reading variables from `env`.
    #[must_use]
    pub fn with_env(env: E) -> Self {
        Self {
            entries: IndexMap::new(),
            env,
            write_back: WriteBack::default(),
        }
    }

    /// Insert entries as-is, absent values included.
    #[must_use]
    pub fn with_entries<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in entries {
            self.entries.insert(key.into(), value.into());
        }
        self
    }

    /// Choose what environment fallbacks persist.
    #[must_use]
    pub fn write_back(mut self, policy: WriteBack) -> Self {
        self.write_back = policy;
        self
    }

    /// Look up a present value.
    ///
    /// Returns `None` when the key is missing or holds an absent value.
    ///
    /// ```
    /// use configmap_core::{ConfigMap, Value};
    ///
    /// let config = ConfigMap::new().with_entries([("b", "c"), ("e", "")]);
    /// assert_eq!(config.get("b"), Some(&Value::from("c")));
    /// assert_eq!(config.get("e"), None);
    /// assert!(config.contains_key("e"));
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).filter(|value| value.is_present())
    }

    /// Resolve `key` from the map, falling back to `default`.
    ///
    /// A present stored value wins; otherwise a present `default` is used.
    /// The resolved value is written back under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDefault`] if neither the stored value
    /// nor `default` is present. The map is left untouched in that case.
    pub fn get_or_default(&mut self, key: &str, default: impl Into<Value>) -> Result<Value> {
        let resolved = match self.get(key) {
            Some(stored) => stored.clone(),
            None => {
                let default = default.into();
                if !default.is_present() {
                    tracing::debug!(key, "no stored value and default is empty");
                    return Err(ConfigError::InvalidDefault);
                }
                tracing::trace!(key, kind = default.kind(), "using default value");
                default
            },
        };

        self.entries.insert(key.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Resolve `key` from the environment, then the map, then `fallback`.
    ///
    /// A non-empty environment variable named exactly `key` wins and is
    /// stored as text. Otherwise resolution is delegated to
    /// [`get_or_default`](Self::get_or_default), after which the map holds
    /// whatever the [`WriteBack`] policy says.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDefault`] if the variable is unset or
    /// empty and [`get_or_default`](Self::get_or_default) fails.
    pub fn get_env_or_default(&mut self, key: &str, fallback: impl Into<Value>) -> Result<Value> {
        if let Some(var) = self.env.var(key).filter(|var| !var.is_empty()) {
            tracing::trace!(key, "resolved from environment");
            let value = Value::Text(var);
            self.entries.insert(key.to_string(), value.clone());
            return Ok(value);
        }

        let fallback = fallback.into();
        let resolved = self.get_or_default(key, fallback.clone())?;
        let persisted = match self.write_back {
            WriteBack::Fallback => fallback,
            WriteBack::Resolved => resolved.clone(),
        };
        if persisted != resolved {
            tracing::debug!(key, "stored fallback differs from resolved value");
        }
        self.entries.insert(key.to_string(), persisted);
        Ok(resolved)
    }

    /// Copy entries with a non-empty key and a present value into the map.
    ///
    /// Existing keys are overwritten. Returns how many entries were copied.
    pub fn merge<I, K, V>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut merged = 0;
        for (key, value) in entries {
            let key = key.into();
            let value = value.into();
            if key.is_empty() || !value.is_present() {
                tracing::trace!(key = %key, "skipping empty entry");
                continue;
            }
            self.entries.insert(key, value);
            merged += 1;
        }
        merged
    }

    /// Store a value as-is, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove an entry, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Stored value for `key`, present or not.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Whether `key` is stored at all, even with an absent value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over stored entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterate over stored keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The underlying container.
    #[must_use]
    pub const fn entries(&self) -> &IndexMap<String, Value> {
        &self.entries
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new().with_entries(iter)
    }
}

impl From<IndexMap<String, Value>> for ConfigMap {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }
}

impl<E> Serialize for ConfigMap<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(&self.entries)
    }
}
