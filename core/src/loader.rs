//! Loading configuration entries from JSON and TOML files.

use crate::environment::EnvSource;
use crate::error::{ConfigError, Result};
use crate::map::ConfigMap;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::path::Path;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON object.
    Json,
    /// TOML document.
    Toml,
}

impl Format {
    /// Detect the format from a file extension, ignoring case.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Lowercase format name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a document into top-level entries.
///
/// `path` is only used for error reporting.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed input and
/// [`ConfigError::NotATable`] if the top level is not a mapping.
pub fn parse_entries(content: &str, format: Format, path: &Path) -> Result<IndexMap<String, Value>> {
    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        format: format.name(),
        message,
    };

    let document = match format {
        Format::Json => serde_json::from_str::<serde_json::Value>(content)
            .map(Value::from)
            .map_err(|e| parse_error(e.to_string()))?,
        Format::Toml => toml::from_str::<toml::Table>(content)
            .map(|table| Value::from(toml::Value::Table(table)))
            .map_err(|e| parse_error(e.to_string()))?,
    };

    match document {
        Value::Mapping(entries) => Ok(entries),
        _ => Err(ConfigError::NotATable {
            path: path.to_path_buf(),
        }),
    }
}

/// Read and parse a configuration file, choosing the format by extension.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedFormat`] for unknown extensions,
/// [`ConfigError::Io`] if the file cannot be read, and the errors of
/// [`parse_entries`].
pub fn read_entries(path: &Path) -> Result<IndexMap<String, Value>> {
    let format = Format::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_entries(&content, format, path)
}

impl<E: EnvSource> ConfigMap<E> {
    /// Merge the entries of a configuration file into the map.
    ///
    /// Entries with empty values are skipped, as with
    /// [`merge`](ConfigMap::merge). Returns how many entries were copied.
    ///
    /// # Errors
    ///
    /// See [`read_entries`].
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let entries = read_entries(path)?;
        let merged = self.merge(entries);
        tracing::debug!(path = %path.display(), merged, "loaded configuration file");
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::MapEnv;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("a.TOML")), Some(Format::Toml));
        assert_eq!(Format::from_path(Path::new("a.yaml")), None);
        assert_eq!(Format::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_parse_json_entries() {
        let entries = parse_entries(
            r#"{"host": "localhost", "port": 8080, "tags": []}"#,
            Format::Json,
            Path::new("inline.json"),
        );
        let entries = entries.unwrap();
        assert_eq!(entries.get("host"), Some(&Value::from("localhost")));
        assert_eq!(entries.get("port"), Some(&Value::Integer(8080)));
        assert_eq!(entries.get("tags"), Some(&Value::Sequence(Vec::new())));
    }

    #[test]
    fn test_parse_toml_entries() {
        let content = "name = \"svc\"\nverbose = false\n\n[db]\nurl = \"postgres://\"\n";
        let entries = parse_entries(content, Format::Toml, Path::new("inline.toml")).unwrap();
        assert_eq!(entries.get("verbose"), Some(&Value::Bool(false)));
        let url = entries
            .get("db")
            .and_then(Value::as_mapping)
            .and_then(|db| db.get("url"))
            .and_then(Value::as_str);
        assert_eq!(url, Some("postgres://"));
    }

    #[test]
    fn test_parse_rejects_non_table() {
        let err = parse_entries("[1, 2]", Format::Json, Path::new("list.json"));
        assert!(matches!(err, Err(ConfigError::NotATable { .. })));
    }

    #[test]
    fn test_parse_reports_format() {
        let err = parse_entries("name = ", Format::Toml, Path::new("bad.toml"));
        assert!(matches!(err, Err(ConfigError::Parse { format: "toml", .. })));
    }

    #[test]
    fn test_read_entries_unsupported_extension() {
        let err = read_entries(Path::new("settings.ini"));
        assert!(matches!(err, Err(ConfigError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_read_entries_missing_file() {
        let err = read_entries(Path::new("/nonexistent/configmap/settings.json"));
        assert!(matches!(err, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_file_skips_empty_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        std::fs::write(&path, r#"{"host": "", "port": 0, "name": "svc", "extra": null}"#).unwrap();
        let mut config = ConfigMap::with_env(MapEnv::new()).with_entries([("host", "kept")]);

        let merged = config.load_file(&path).unwrap();

        assert_eq!(merged, 2);
        assert_eq!(config.get("host"), Some(&Value::from("kept")));
        assert_eq!(config.get("port"), Some(&Value::Integer(0)));
        assert_eq!(config.get("name"), Some(&Value::from("svc")));
        assert!(!config.contains_key("extra"));
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        std::fs::write(&path, "name = \"svc\"\nworkers = 4\n").unwrap();
        let mut config = ConfigMap::with_env(MapEnv::new());

        assert_eq!(config.load_file(&path).unwrap(), 2);
        assert_eq!(config.get("workers"), Some(&Value::Integer(4)));
    }

    #[test]
    fn test_parse_keeps_document_order() {
        let json = parse_entries(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#, Format::Json, Path::new("o.json")).unwrap();
        assert_eq!(json.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);

        let toml = parse_entries("zeta = 1\nalpha = 2\nmid = 3\n", Format::Toml, Path::new("o.toml")).unwrap();
        assert_eq!(toml.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }
}
