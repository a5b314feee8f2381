//! Statically linked extension factories, resolved by manifest entry id.
//!
//! A manifest never names code directly. Its `entry` string is looked up
//! here, so only factories compiled into the host can ever be constructed.

use crate::extension::contract::ExtensionFactory;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Entry id is not a dot-separated list of `[a-z0-9_-]` segments.
    InvalidEntryId(String),
    /// Two factories claim the same entry id.
    DuplicateEntryId(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEntryId(entry) => write!(
                f,
                "cannot register factory `{entry}`: entry ids are dot-separated [a-z0-9_-] segments"
            ),
            Self::DuplicateEntryId(entry) => {
                write!(f, "a factory is already registered for entry `{entry}`")
            }
        }
    }
}

impl Error for CatalogError {}

/// Entry id to factory resolution table.
#[derive(Default)]
pub struct ExtensionCatalog {
    factories: BTreeMap<String, Arc<dyn ExtensionFactory>>,
}

impl ExtensionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the factories shipped with the core crate.
    pub fn with_builtins() -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        crate::builtin::register_builtins(&mut catalog)?;
        Ok(catalog)
    }

    /// Makes `factory` resolvable under its (trimmed) entry id.
    ///
    /// # Errors
    /// - `InvalidEntryId` for ids a manifest could not spell.
    /// - `DuplicateEntryId` when the id already resolves to another factory.
    pub fn register(&mut self, factory: Arc<dyn ExtensionFactory>) -> Result<(), CatalogError> {
        let entry = factory.entry().trim();
        if !is_resolvable_entry_id(entry) {
            return Err(CatalogError::InvalidEntryId(entry.to_string()));
        }
        match self.factories.entry(entry.to_string()) {
            Entry::Occupied(slot) => Err(CatalogError::DuplicateEntryId(slot.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(factory);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered entry ids in lexicographic order.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Resolves a manifest `entry` value to its factory.
    pub fn resolve(&self, entry: &str) -> Option<&dyn ExtensionFactory> {
        self.factories.get(entry.trim()).map(|factory| factory.as_ref())
    }
}

fn is_resolvable_entry_id(entry: &str) -> bool {
    entry.split('.').all(|segment| {
        !segment.is_empty()
            && segment
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
    })
}
