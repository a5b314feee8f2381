//! Extensions shipped with the core crate.

pub mod description_cleanup;
pub mod result_counter;

use crate::extension::catalog::{CatalogError, ExtensionCatalog};
use std::sync::Arc;

/// Registers every built-in factory.
pub fn register_builtins(catalog: &mut ExtensionCatalog) -> Result<(), CatalogError> {
    catalog.register(Arc::new(description_cleanup::factory()))?;
    catalog.register(Arc::new(result_counter::factory()))?;
    Ok(())
}
