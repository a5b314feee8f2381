//! Extension subsystem.
//!
//! Extensions are statically registered factories. Manifest files in the
//! user and system search directories select which factories a scan session
//! loads; no code is loaded from disk.

pub mod catalog;
pub mod contract;
pub mod discovery;
pub mod error;
pub mod manifest;
pub mod registry;
