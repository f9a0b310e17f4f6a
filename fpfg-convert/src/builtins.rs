use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// One Forcepoint predefined object and the FortiGate object replacing it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuiltinMapping {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Deserialize)]
struct BuiltinFile {
    #[serde(default)]
    builtin: Vec<BuiltinMapping>,
}

/// Errors returned when loading a built-in table.
#[derive(Debug, Error)]
pub enum BuiltinLoadError {
    #[error("failed to read built-in table {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse built-in table {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Lookup table from source-platform built-in names to target equivalents.
///
/// Lookups are exact: Forcepoint names such as `DNS (TCP)` and `DNS (UDP)`
/// are distinct source objects even though both map to FortiGate `DNS`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltinTable {
    entries: HashMap<String, String>,
}

impl BuiltinTable {
    /// A table that resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_mappings(mappings: Vec<BuiltinMapping>) -> Self {
        Self {
            entries: mappings
                .into_iter()
                .map(|m| (m.source, m.target))
                .collect(),
        }
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load a built-in table from a TOML file.
pub fn load_builtin_table(path: &Path) -> Result<BuiltinTable, BuiltinLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| BuiltinLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_builtins(&raw, path.display().to_string()).map(BuiltinTable::from_mappings)
}

/// The table shipped with the binary.
pub fn default_builtin_table() -> BuiltinTable {
    let embedded = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/mappings/builtins.toml"
    ));
    match parse_builtins(embedded, "embedded built-in table".to_string()) {
        Ok(mappings) => BuiltinTable::from_mappings(mappings),
        Err(err) => {
            tracing::warn!("embedded built-in table is unusable: {err}");
            BuiltinTable::empty()
        }
    }
}

fn parse_builtins(raw: &str, path: String) -> Result<Vec<BuiltinMapping>, BuiltinLoadError> {
    let parsed: BuiltinFile =
        toml::from_str(raw).map_err(|source| BuiltinLoadError::Parse { path, source })?;
    Ok(parsed.builtin)
}
