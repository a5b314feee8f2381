//! Extension discovery over the user and system search directories.
//!
//! # Responsibility
//! - Enumerate `*.ext.toml` manifests in both search roots.
//! - Classify each candidate as ready or failed without running extension code.
//!
//! # Invariants
//! - One bad candidate never hides the rest of its directory.
//! - Entries within an origin are sorted by extension name.
//! - Cancellation aborts discovery immediately with `Interrupted`.

use crate::extension::catalog::ExtensionCatalog;
use crate::extension::error::ExtensionError;
use crate::extension::manifest::{
    extension_name, summary_line, ExtensionManifest, NO_DESCRIPTION,
};
use crate::interrupt::{CancelToken, Interrupted};
use crate::report::WarningSink;
use crate::settings::{Origin, PathPurpose, SearchPaths};
use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Discovery outcome for one candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum DescriptorStatus {
    Ready,
    Failed(String),
}

/// One discovered extension candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionDescriptor {
    pub name: String,
    pub source_path: PathBuf,
    pub origin: Origin,
    pub description: String,
    /// Catalog entry id, when the manifest could be read.
    pub entry: Option<String>,
    pub status: DescriptorStatus,
}

impl ExtensionDescriptor {
    fn pending(origin: Origin, name: String, source_path: PathBuf) -> Self {
        Self {
            name,
            source_path,
            origin,
            description: NO_DESCRIPTION.to_string(),
            entry: None,
            status: DescriptorStatus::Ready,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == DescriptorStatus::Ready
    }
}

/// Inventory of one search root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginInventory {
    pub origin: Origin,
    /// Resolved search directory, `None` when the settings have none.
    pub path: Option<PathBuf>,
    pub extensions: Vec<ExtensionDescriptor>,
}

impl OriginInventory {
    fn empty(origin: Origin, path: Option<PathBuf>) -> Self {
        Self {
            origin,
            path,
            extensions: Vec::new(),
        }
    }

    pub fn ready(&self) -> impl Iterator<Item = &ExtensionDescriptor> {
        self.extensions.iter().filter(|entry| entry.is_ready())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ExtensionDescriptor> {
        self.extensions.iter().filter(|entry| !entry.is_ready())
    }

    pub fn get(&self, name: &str) -> Option<&ExtensionDescriptor> {
        self.extensions.iter().find(|entry| entry.name == name)
    }
}

/// Best-effort inventory of both search roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub user: OriginInventory,
    pub system: OriginInventory,
}

impl Inventory {
    pub fn origin(&self, origin: Origin) -> &OriginInventory {
        match origin {
            Origin::User => &self.user,
            Origin::System => &self.system,
        }
    }

    fn origin_mut(&mut self, origin: Origin) -> &mut OriginInventory {
        match origin {
            Origin::User => &mut self.user,
            Origin::System => &mut self.system,
        }
    }

    /// All descriptors in load order (`Origin::SEARCH_ORDER`).
    pub fn iter(&self) -> impl Iterator<Item = &ExtensionDescriptor> {
        Origin::SEARCH_ORDER
            .into_iter()
            .flat_map(move |origin| self.origin(origin).extensions.iter())
    }

    /// Ready descriptors in load order.
    pub fn ready(&self) -> impl Iterator<Item = &ExtensionDescriptor> {
        self.iter().filter(|entry| entry.is_ready())
    }
}

struct Candidate {
    name: String,
    path: PathBuf,
    utf8_name: bool,
}

/// One discovery pass over the configured search roots.
pub struct Discovery<'a> {
    paths: &'a dyn SearchPaths,
    catalog: &'a ExtensionCatalog,
    warnings: &'a dyn WarningSink,
    cancel: &'a CancelToken,
}

impl<'a> Discovery<'a> {
    pub fn new(
        paths: &'a dyn SearchPaths,
        catalog: &'a ExtensionCatalog,
        warnings: &'a dyn WarningSink,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            paths,
            catalog,
            warnings,
            cancel,
        }
    }

    /// Lists every extension candidate in both search roots.
    ///
    /// # Errors
    /// - Returns `Interrupted` when the cancel token trips mid-discovery.
    pub fn list_extensions(&self) -> Result<Inventory, Interrupted> {
        let mut inventory = Inventory {
            user: OriginInventory::empty(Origin::User, None),
            system: OriginInventory::empty(Origin::System, None),
        };
        for origin in Origin::SEARCH_ORDER {
            *inventory.origin_mut(origin) = self.scan_origin(origin)?;
        }
        info!(
            "event=extensions_discover module=extension status=ok user_total={} system_total={} ready={}",
            inventory.user.extensions.len(),
            inventory.system.extensions.len(),
            inventory.ready().count()
        );
        Ok(inventory)
    }

    fn scan_origin(&self, origin: Origin) -> Result<OriginInventory, Interrupted> {
        self.cancel.check()?;
        let path = self.paths.get_path(origin, PathPurpose::Extensions);
        let Some(dir) = path.as_deref() else {
            return Ok(OriginInventory::empty(origin, None));
        };
        if !dir.is_dir() {
            debug!(
                "event=extensions_discover module=extension status=skip origin={origin} dir={}",
                dir.display()
            );
            return Ok(OriginInventory::empty(origin, path));
        }

        let mut inventory = OriginInventory::empty(origin, path.clone());
        for candidate in self.candidates(origin, dir) {
            self.cancel.check()?;
            let descriptor = if candidate.utf8_name {
                self.describe(origin, candidate.name, candidate.path)
            } else {
                let err = ExtensionError::Manifest {
                    path: candidate.path.clone(),
                    reason: "file name is not valid UTF-8".to_string(),
                };
                let descriptor = ExtensionDescriptor::pending(origin, candidate.name, candidate.path);
                self.fail(descriptor, err)
            };
            inventory.extensions.push(descriptor);
        }
        Ok(inventory)
    }

    /// Returns manifest candidates sorted by name.
    fn candidates(&self, origin: Origin, dir: &Path) -> Vec<Candidate> {
        let read_dir = match std::fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(err) => {
                self.warnings.warning(&format!(
                    "Failed to read {origin} extension directory '{}': {err}",
                    dir.display()
                ));
                return Vec::new();
            }
        };

        let mut candidates = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = match dir_entry {
                Ok(dir_entry) => dir_entry,
                Err(err) => {
                    self.warnings.warning(&format!(
                        "Failed to read entry in {origin} extension directory '{}': {err}",
                        dir.display()
                    ));
                    continue;
                }
            };
            let path = dir_entry.path();
            let Some((name, utf8_name)) = path.file_name().and_then(|file_name| {
                // Lossy decoding keeps the ASCII suffix intact.
                let lossy = file_name.to_string_lossy();
                let name = extension_name(&lossy)?.to_string();
                Some((name, file_name.to_str().is_some()))
            }) else {
                continue;
            };
            if !path.is_file() {
                continue;
            }
            candidates.push(Candidate {
                name,
                path,
                utf8_name,
            });
        }
        candidates.sort_by(|left, right| {
            left.name
                .cmp(&right.name)
                .then_with(|| left.path.cmp(&right.path))
        });
        candidates
    }

    fn describe(&self, origin: Origin, name: String, source_path: PathBuf) -> ExtensionDescriptor {
        let mut descriptor = ExtensionDescriptor::pending(origin, name, source_path);

        let manifest = match ExtensionManifest::read(&descriptor.source_path) {
            Ok(manifest) => manifest,
            Err(err) => return self.fail(descriptor, err),
        };
        descriptor.entry = Some(manifest.entry.clone());

        match self.catalog.resolve(&manifest.entry) {
            Some(factory) => {
                descriptor.description = summary_line(factory.documentation());
                descriptor
            }
            None => {
                let err = ExtensionError::UnknownEntry {
                    name: descriptor.name.clone(),
                    entry: manifest.entry,
                };
                self.fail(descriptor, err)
            }
        }
    }

    fn fail(
        &self,
        mut descriptor: ExtensionDescriptor,
        err: ExtensionError,
    ) -> ExtensionDescriptor {
        let message = err.to_string();
        self.warnings.warning(&message);
        descriptor.status = DescriptorStatus::Failed(message);
        descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::{DescriptorStatus, Discovery};
    use crate::extension::catalog::ExtensionCatalog;
    use crate::interrupt::{CancelToken, Interrupted};
    use crate::report::MemoryWarningSink;
    use crate::settings::{Origin, Settings};

    #[test]
    fn missing_directories_yield_empty_inventory() {
        let settings = Settings::new(None, Some("/nonexistent/sigscan/extensions".into()));
        let catalog = ExtensionCatalog::new();
        let warnings = MemoryWarningSink::new();
        let cancel = CancelToken::new();

        let inventory = Discovery::new(&settings, &catalog, &warnings, &cancel)
            .list_extensions()
            .expect("discovery should not be interrupted");

        assert!(inventory.user.path.is_none());
        assert!(inventory.system.path.is_some());
        assert_eq!(inventory.iter().count(), 0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn unknown_entry_is_recorded_as_failed() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("ghost.ext.toml"), "entry = \"vendor.ghost\"\n")
            .expect("write manifest");
        let settings = Settings::new(Some(dir.path().to_path_buf()), None);
        let catalog = ExtensionCatalog::new();
        let warnings = MemoryWarningSink::new();
        let cancel = CancelToken::new();

        let inventory = Discovery::new(&settings, &catalog, &warnings, &cancel)
            .list_extensions()
            .expect("discovery");

        let ghost = inventory.origin(Origin::User).get("ghost").expect("ghost entry");
        assert!(matches!(ghost.status, DescriptorStatus::Failed(_)));
        assert_eq!(ghost.entry.as_deref(), Some("vendor.ghost"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn cancelled_token_aborts_before_enumeration() {
        let settings = Settings::default();
        let catalog = ExtensionCatalog::new();
        let warnings = MemoryWarningSink::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = Discovery::new(&settings, &catalog, &warnings, &cancel).list_extensions();
        assert_eq!(result, Err(Interrupted));
    }
}
