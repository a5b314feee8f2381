//! Extension contract and factory entry point.
//!
//! # Responsibility
//! - Define the lifecycle hooks every extension may override.
//! - Define the explicit factory each extension module exports.
//!
//! # Invariants
//! - Every hook defaults to a no-op returning `Ok(())`.
//! - `Extension::hooks` lists exactly the hooks the extension overrides;
//!   undeclared hooks are never dispatched.
//! - Affinity matching is case-sensitive.

use crate::interrupt::Interrupted;
use crate::result::ScanResult;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lifecycle method an extension may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hook {
    PreScan,
    Scan,
    PostScan,
}

impl Hook {
    pub const ALL: [Hook; 3] = [Hook::PreScan, Hook::Scan, Hook::PostScan];

    /// Stable method name used in warnings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreScan => "pre_scan",
            Self::Scan => "scan",
            Self::PostScan => "post_scan",
        }
    }
}

impl Display for Hook {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure raised by extension code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// Ordinary failure; logged and skipped by the host.
    Failed(String),
    /// Cancellation; aborts the surrounding operation.
    Interrupted,
}

impl HookError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl Display for HookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(message) => f.write_str(message),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl Error for HookError {}

impl From<Interrupted> for HookError {
    fn from(_: Interrupted) -> Self {
        Self::Interrupted
    }
}

pub type HookResult = Result<(), HookError>;

/// Identity of the scanning module extensions are loaded for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleContext {
    identity: String,
}

impl ModuleContext {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// Capability set implemented by every extension.
pub trait Extension {
    /// Hooks this extension overrides.
    fn hooks(&self) -> &'static [Hook];

    /// Module identities this extension is restricted to; empty means all.
    fn affinity(&self) -> &[&str] {
        &[]
    }

    /// Runs once after construction, only when the extension is enabled.
    fn init(&mut self) -> HookResult {
        Ok(())
    }

    fn pre_scan(&mut self) -> HookResult {
        Ok(())
    }

    fn scan(&mut self, _result: &mut ScanResult) -> HookResult {
        Ok(())
    }

    fn post_scan(&mut self) -> HookResult {
        Ok(())
    }
}

/// Returns whether an affinity list admits the given module identity.
pub fn is_enabled_for(affinity: &[&str], identity: &str) -> bool {
    affinity.is_empty() || affinity.contains(&identity)
}

/// Registration entry point exported by one extension module.
pub trait ExtensionFactory: Send + Sync {
    /// Stable entry id referenced by extension manifests.
    fn entry(&self) -> &str;

    /// Free-form documentation; its first line is the inventory description.
    fn documentation(&self) -> Option<&str> {
        None
    }

    /// Constructs one extension bound to `context`.
    fn create(&self, context: &ModuleContext) -> Result<Box<dyn Extension>, HookError>;
}

type CreateFn = dyn Fn(&ModuleContext) -> Result<Box<dyn Extension>, HookError> + Send + Sync;

/// Closure-backed factory.
pub struct FnFactory {
    entry: String,
    documentation: Option<String>,
    create: Box<CreateFn>,
}

impl FnFactory {
    pub fn new<F>(entry: impl Into<String>, create: F) -> Self
    where
        F: Fn(&ModuleContext) -> Result<Box<dyn Extension>, HookError> + Send + Sync + 'static,
    {
        Self {
            entry: entry.into(),
            documentation: None,
            create: Box::new(create),
        }
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}

impl ExtensionFactory for FnFactory {
    fn entry(&self) -> &str {
        &self.entry
    }

    fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    fn create(&self, context: &ModuleContext) -> Result<Box<dyn Extension>, HookError> {
        (self.create)(context)
    }
}
