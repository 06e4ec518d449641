//! Configuration map core library
//!
//! Provides an untyped, string-keyed configuration map with accessors that
//! fall back to caller defaults and to environment variables, plus loading of
//! JSON and TOML files into the map.

pub mod environment;
pub mod error;
pub mod loader;
pub mod map;
pub mod value;

pub use environment::{EnvSource, MapEnv, SystemEnv};

pub use error::{ConfigError, Result};

pub use loader::{Format, parse_entries, read_entries};

pub use map::{ConfigMap, WriteBack};

pub use value::{Handle, Value};
