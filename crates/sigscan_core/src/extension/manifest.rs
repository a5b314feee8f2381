//! Extension manifest files found in search directories.
//!
//! A manifest binds a file name (the extension name) to a registered factory
//! entry id. No extension code runs while a manifest is read.

use crate::extension::error::ExtensionError;
use serde::Deserialize;
use std::path::Path;

/// File-name suffix identifying extension manifests.
pub const EXTENSION_FILE_SUFFIX: &str = ".ext.toml";
/// Inventory description used when a factory carries no documentation.
pub const NO_DESCRIPTION: &str = "No description";

/// Parsed `<name>.ext.toml` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtensionManifest {
    /// Catalog entry id of the factory implementing this extension.
    pub entry: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl ExtensionManifest {
    /// Parses manifest text.
    ///
    /// # Errors
    /// - Returns a message when the text is not valid TOML, lacks `entry`,
    ///   or `entry` is blank.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut manifest = toml::from_str::<Self>(raw).map_err(|err| err.message().to_string())?;
        manifest.entry = manifest.entry.trim().to_string();
        if manifest.entry.is_empty() {
            return Err("manifest entry cannot be empty".to_string());
        }
        Ok(manifest)
    }

    /// Reads and parses one manifest file.
    pub fn read(path: &Path) -> Result<Self, ExtensionError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ExtensionError::Manifest {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::parse(&raw).map_err(|reason| ExtensionError::Manifest {
            path: path.to_path_buf(),
            reason,
        })
    }
}

/// Returns the extension name for a candidate file name, if it qualifies.
pub fn extension_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(EXTENSION_FILE_SUFFIX)
        .filter(|name| !name.is_empty())
}

/// Returns the leading documentation line, or `NO_DESCRIPTION`.
pub fn summary_line(documentation: Option<&str>) -> String {
    documentation
        .and_then(|doc| doc.lines().map(str::trim).find(|line| !line.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}
