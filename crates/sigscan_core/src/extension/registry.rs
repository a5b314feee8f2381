//! Extension loading, callback binding, and lifecycle dispatch.
//!
//! # Responsibility
//! - Instantiate applicable extensions for the active module context.
//! - Keep three ordered callback lists (pre_scan, scan, post_scan).
//! - Dispatch hooks in order, isolating ordinary failures.
//!
//! # Invariants
//! - Disabled instances contribute no handles.
//! - Each handle references one retained instance and one hook.
//! - `load_all` rebuilds every list from scratch.
//! - Interruption is returned immediately and never reported as a warning.

use crate::extension::catalog::ExtensionCatalog;
use crate::extension::contract::{
    is_enabled_for, Extension, Hook, HookError, HookResult, ModuleContext,
};
use crate::extension::discovery::{Discovery, ExtensionDescriptor, Inventory};
use crate::extension::error::ExtensionError;
use crate::extension::manifest::ExtensionManifest;
use crate::interrupt::{CancelToken, Interrupted};
use crate::report::WarningSink;
use crate::result::ScanResult;
use crate::settings::{Origin, SearchPaths};
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

/// Constructed extension bound to one module context.
pub struct ExtensionInstance {
    name: String,
    origin: Origin,
    enabled: bool,
    extension: Box<dyn Extension>,
}

impl ExtensionInstance {
    /// Binds a freshly constructed extension to `context`.
    ///
    /// `init` runs only when the extension's affinity admits the context.
    pub fn bind(
        name: impl Into<String>,
        origin: Origin,
        extension: Box<dyn Extension>,
        context: &ModuleContext,
    ) -> Result<Self, HookError> {
        let enabled = is_enabled_for(extension.affinity(), context.identity());
        let mut instance = Self {
            name: name.into(),
            origin,
            enabled,
            extension,
        };
        if instance.enabled {
            instance.extension.init()?;
        }
        Ok(instance)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    fn extension_mut(&mut self) -> &mut dyn Extension {
        self.extension.as_mut()
    }
}

/// Bound reference to one hook of one retained instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackHandle {
    instance: usize,
    hook: Hook,
}

/// Ordered callback lists, one per hook.
#[derive(Debug, Default)]
struct CallbackRegistry {
    pre_scan: Vec<CallbackHandle>,
    scan: Vec<CallbackHandle>,
    post_scan: Vec<CallbackHandle>,
}

impl CallbackRegistry {
    fn handles(&self, hook: Hook) -> &[CallbackHandle] {
        match hook {
            Hook::PreScan => &self.pre_scan,
            Hook::Scan => &self.scan,
            Hook::PostScan => &self.post_scan,
        }
    }

    fn push(&mut self, handle: CallbackHandle) {
        match handle.hook {
            Hook::PreScan => self.pre_scan.push(handle),
            Hook::Scan => self.scan.push(handle),
            Hook::PostScan => self.post_scan.push(handle),
        }
    }

    fn clear(&mut self) {
        self.pre_scan.clear();
        self.scan.clear();
        self.post_scan.clear();
    }
}

/// Counts produced by one `load_all` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub disabled: usize,
    pub failed: usize,
}

/// Owns the extension instances and callbacks of one scan session.
pub struct ExtensionRegistry {
    paths: Arc<dyn SearchPaths>,
    catalog: Arc<ExtensionCatalog>,
    warnings: Arc<dyn WarningSink>,
    cancel: CancelToken,
    instances: Vec<ExtensionInstance>,
    callbacks: CallbackRegistry,
}

impl ExtensionRegistry {
    pub fn new(
        paths: Arc<dyn SearchPaths>,
        catalog: Arc<ExtensionCatalog>,
        warnings: Arc<dyn WarningSink>,
    ) -> Self {
        Self {
            paths,
            catalog,
            warnings,
            cancel: CancelToken::new(),
            instances: Vec::new(),
            callbacks: CallbackRegistry::default(),
        }
    }

    /// Replaces the session cancel token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Lists both search roots without loading anything.
    pub fn list_extensions(&self) -> Result<Inventory, Interrupted> {
        Discovery::new(
            self.paths.as_ref(),
            self.catalog.as_ref(),
            self.warnings.as_ref(),
            &self.cancel,
        )
        .list_extensions()
    }

    /// Loads every applicable extension for `context`.
    ///
    /// Previous instances and callback lists are discarded first.
    ///
    /// # Errors
    /// - Returns `Interrupted` when discovery, construction, or `init` is
    ///   cancelled. Every other failure is reported as a warning.
    pub fn load_all(&mut self, context: &ModuleContext) -> Result<LoadSummary, Interrupted> {
        let started_at = Instant::now();
        self.instances.clear();
        self.callbacks.clear();
        info!(
            "event=extensions_load module=extension status=start context={}",
            context.identity()
        );

        let inventory = self.list_extensions()?;
        let mut summary = LoadSummary::default();
        for descriptor in inventory.ready() {
            self.cancel.check()?;
            match self.instantiate(descriptor, context) {
                Ok(Some(instance)) => {
                    self.retain(instance);
                    summary.loaded += 1;
                }
                Ok(None) => {
                    debug!(
                        "event=extension_load module=extension status=disabled name={} origin={} context={}",
                        descriptor.name,
                        descriptor.origin,
                        context.identity()
                    );
                    summary.disabled += 1;
                }
                Err(err) => {
                    err.report_to(self.warnings.as_ref())?;
                    summary.failed += 1;
                }
            }
        }

        info!(
            "event=extensions_load module=extension status=ok context={} loaded={} disabled={} failed={} duration_ms={}",
            context.identity(),
            summary.loaded,
            summary.disabled,
            summary.failed,
            started_at.elapsed().as_millis()
        );
        Ok(summary)
    }

    /// Locate, load, construct, and bind one descriptor.
    ///
    /// Returns `Ok(None)` for instances disabled by affinity.
    fn instantiate(
        &self,
        descriptor: &ExtensionDescriptor,
        context: &ModuleContext,
    ) -> Result<Option<ExtensionInstance>, ExtensionError> {
        let name = descriptor.name.as_str();
        if !descriptor.source_path.is_file() {
            return Err(ExtensionError::load(
                name,
                format!("file '{}' not found", descriptor.source_path.display()),
            ));
        }
        let raw = std::fs::read_to_string(&descriptor.source_path)
            .map_err(|err| ExtensionError::load(name, err))?;
        let manifest =
            ExtensionManifest::parse(&raw).map_err(|reason| ExtensionError::load(name, reason))?;
        let factory = self.catalog.resolve(&manifest.entry).ok_or_else(|| {
            ExtensionError::load(
                name,
                format!("entry `{}` is not registered", manifest.entry),
            )
        })?;

        let extension = factory
            .create(context)
            .map_err(|err| ExtensionError::from_load_hook(name, err))?;
        let instance = ExtensionInstance::bind(name, descriptor.origin, extension, context)
            .map_err(|err| ExtensionError::from_load_hook(name, err))?;
        Ok(instance.enabled().then_some(instance))
    }

    fn retain(&mut self, instance: ExtensionInstance) {
        let index = self.instances.len();
        let declared = instance.extension.hooks();
        for hook in Hook::ALL {
            if declared.contains(&hook) {
                self.callbacks.push(CallbackHandle {
                    instance: index,
                    hook,
                });
            }
        }
        debug!(
            "event=extension_load module=extension status=ok name={} origin={} hooks={}",
            instance.name,
            instance.origin,
            declared.len()
        );
        self.instances.push(instance);
    }

    pub fn instances(&self) -> &[ExtensionInstance] {
        &self.instances
    }

    pub fn handles(&self, hook: Hook) -> &[CallbackHandle] {
        self.callbacks.handles(hook)
    }

    /// Instance behind `handle`; `None` for handles from an earlier load.
    pub fn instance(&self, handle: CallbackHandle) -> Option<&ExtensionInstance> {
        self.instances.get(handle.instance)
    }

    /// Extension names bound to `hook`, in dispatch order.
    pub fn callback_names(&self, hook: Hook) -> Vec<&str> {
        self.handles(hook)
            .iter()
            .filter_map(|handle| self.instance(*handle))
            .map(ExtensionInstance::name)
            .collect()
    }

    /// Runs every `pre_scan` handle; call once per target before parsing.
    pub fn dispatch_pre_scan(&mut self) -> Result<(), Interrupted> {
        self.dispatch(Hook::PreScan, |extension| extension.pre_scan())
    }

    /// Runs every `scan` handle against one finding.
    ///
    /// Mutations by earlier handles are visible to later handles and to the
    /// caller once this returns.
    pub fn dispatch_scan(&mut self, result: &mut ScanResult) -> Result<(), Interrupted> {
        self.dispatch(Hook::Scan, |extension| extension.scan(result))
    }

    /// Runs every `post_scan` handle; call once per target after parsing.
    pub fn dispatch_post_scan(&mut self) -> Result<(), Interrupted> {
        self.dispatch(Hook::PostScan, |extension| extension.post_scan())
    }

    fn dispatch<F>(&mut self, hook: Hook, mut call: F) -> Result<(), Interrupted>
    where
        F: FnMut(&mut dyn Extension) -> HookResult,
    {
        for handle in self.callbacks.handles(hook) {
            self.cancel.check()?;
            let instance = &mut self.instances[handle.instance];
            if let Err(err) = call(instance.extension_mut()) {
                ExtensionError::from_callback(&instance.name, hook, err)
                    .report_to(self.warnings.as_ref())?;
            }
        }
        Ok(())
    }
}
