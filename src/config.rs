//! Manifest of a native module and the signatures of its entry points.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge::{Signature, declared_return};
use crate::value::ValueType;

/// Module manifest loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Manifest {
    /// Module location, if the manifest names one.
    #[serde(default)]
    pub module: Option<ModuleConfig>,
    /// Declared entry points.
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
    /// Directory relative module paths resolve against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// Where the module binary lives.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModuleConfig {
    /// Path to a `.wasm` or `.wat` file.
    pub path: PathBuf,
}

/// One declared entry point.
///
/// Parameter types must be known names. Return tokens are kept as written;
/// only the first is consulted and an unknown one passes the result through.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntryConfig {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ValueType>,
    #[serde(default)]
    pub returns: Vec<String>,
}

impl EntryConfig {
    pub fn signature(&self) -> Signature {
        Signature::new(self.params.clone(), declared_return(&self.returns))
    }
}

impl Manifest {
    /// Load a manifest from a TOML file.
    ///
    /// A relative module path is resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        let mut manifest = Self::from_str(&content)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf);
        Ok(manifest)
    }

    /// Parse a manifest from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let manifest: Self = toml::from_str(content)?;

        let mut seen = HashSet::new();
        if let Some(dup) = manifest.entries.iter().find(|e| !seen.insert(e.name.as_str())) {
            return Err(ConfigError::DuplicateEntry(dup.name.clone()));
        }
        Ok(manifest)
    }

    /// The declared signature of `name`.
    pub fn signature(&self, name: &str) -> Option<Signature> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(EntryConfig::signature)
    }

    /// The module path, resolved against the manifest's directory.
    pub fn module_path(&self) -> Option<PathBuf> {
        let path = &self.module.as_ref()?.path;
        match &self.base_dir {
            Some(dir) if path.is_relative() => Some(dir.join(path)),
            _ => Some(path.clone()),
        }
    }

    /// Names of all declared entry points, in declaration order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

/// Manifest loading error.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading the manifest file.
    #[error("Failed to read manifest '{0}': {1}")]
    Io(String, #[source] std::io::Error),

    /// TOML syntax error or an unknown type name.
    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    /// Two entries share a name.
    #[error("Entry '{0}' is declared more than once")]
    DuplicateEntry(String),
}
