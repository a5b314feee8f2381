//! Extension subsystem of the sigscan file scanner.
//! Discovers, loads, and dispatches scan-lifecycle extensions.

pub mod builtin;
pub mod extension;
pub mod interrupt;
pub mod logging;
pub mod report;
pub mod result;
pub mod settings;

pub use extension::catalog::{CatalogError, ExtensionCatalog};
pub use extension::contract::{
    is_enabled_for, Extension, ExtensionFactory, FnFactory, Hook, HookError, HookResult,
    ModuleContext,
};
pub use extension::discovery::{
    DescriptorStatus, Discovery, ExtensionDescriptor, Inventory, OriginInventory,
};
pub use extension::error::ExtensionError;
pub use extension::manifest::{ExtensionManifest, EXTENSION_FILE_SUFFIX, NO_DESCRIPTION};
pub use extension::registry::{CallbackHandle, ExtensionInstance, ExtensionRegistry, LoadSummary};
pub use interrupt::{CancelToken, Interrupted};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use report::{LogWarningSink, MemoryWarningSink, WarningSink};
pub use result::{FieldValue, ScanResult};
pub use settings::{Origin, PathPurpose, SearchPaths, Settings};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
