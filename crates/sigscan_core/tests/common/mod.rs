#![allow(dead_code)]

use sigscan_core::{
    Extension, ExtensionCatalog, ExtensionRegistry, FnFactory, Hook, HookError, HookResult,
    MemoryWarningSink, Origin, ScanResult, Settings,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// What a scripted hook does when invoked.
#[derive(Clone, Copy)]
pub enum Action {
    Succeed,
    Fail,
    Interrupt,
    Mutate(fn(&mut ScanResult)),
}

/// Test extension whose hooks record calls and follow scripted actions.
#[derive(Clone)]
pub struct Scripted {
    label: String,
    hooks: &'static [Hook],
    affinity: Vec<&'static str>,
    calls: CallLog,
    pre_scan: Action,
    scan: Action,
    post_scan: Action,
    init: Action,
}

impl Scripted {
    pub fn new(label: &str, hooks: &'static [Hook], calls: &CallLog) -> Self {
        Self {
            label: label.to_string(),
            hooks,
            affinity: Vec::new(),
            calls: Arc::clone(calls),
            pre_scan: Action::Succeed,
            scan: Action::Succeed,
            post_scan: Action::Succeed,
            init: Action::Succeed,
        }
    }

    pub fn restricted_to(mut self, modules: &[&'static str]) -> Self {
        self.affinity = modules.to_vec();
        self
    }

    pub fn on(mut self, hook: Hook, action: Action) -> Self {
        match hook {
            Hook::PreScan => self.pre_scan = action,
            Hook::Scan => self.scan = action,
            Hook::PostScan => self.post_scan = action,
        }
        self
    }

    pub fn on_init(mut self, action: Action) -> Self {
        self.init = action;
        self
    }

    pub fn factory(self, entry: &str) -> Arc<FnFactory> {
        let documentation = format!("{} test extension.\nSecond line.", self.label);
        Arc::new(
            FnFactory::new(entry, move |_| Ok(Box::new(self.clone()) as Box<dyn Extension>))
                .with_documentation(documentation),
        )
    }

    fn run(&self, name: &str, action: Action, result: Option<&mut ScanResult>) -> HookResult {
        self.calls
            .lock()
            .expect("call log lock")
            .push(format!("{}.{name}", self.label));
        match action {
            Action::Succeed => Ok(()),
            Action::Fail => Err(HookError::failed(format!("{} exploded", self.label))),
            Action::Interrupt => Err(HookError::Interrupted),
            Action::Mutate(mutate) => {
                if let Some(result) = result {
                    mutate(result);
                }
                Ok(())
            }
        }
    }
}

impl Extension for Scripted {
    fn hooks(&self) -> &'static [Hook] {
        self.hooks
    }

    fn affinity(&self) -> &[&str] {
        &self.affinity
    }

    fn init(&mut self) -> HookResult {
        self.run("init", self.init, None)
    }

    fn pre_scan(&mut self) -> HookResult {
        self.run("pre_scan", self.pre_scan, None)
    }

    fn scan(&mut self, result: &mut ScanResult) -> HookResult {
        self.run("scan", self.scan, Some(result))
    }

    fn post_scan(&mut self) -> HookResult {
        self.run("post_scan", self.post_scan, None)
    }
}

/// Temporary user/system search roots plus a catalog under construction.
pub struct Fixture {
    pub user: TempDir,
    pub system: TempDir,
    pub catalog: ExtensionCatalog,
    pub warnings: Arc<MemoryWarningSink>,
    pub calls: CallLog,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            user: tempfile::tempdir().expect("user tempdir"),
            system: tempfile::tempdir().expect("system tempdir"),
            catalog: ExtensionCatalog::new(),
            warnings: Arc::new(MemoryWarningSink::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn dir(&self, origin: Origin) -> PathBuf {
        match origin {
            Origin::User => self.user.path().to_path_buf(),
            Origin::System => self.system.path().to_path_buf(),
        }
    }

    pub fn settings(&self) -> Settings {
        Settings::new(Some(self.dir(Origin::User)), Some(self.dir(Origin::System)))
    }

    /// Writes `<name>.ext.toml` pointing at `entry`.
    pub fn manifest(&self, origin: Origin, name: &str, entry: &str) -> PathBuf {
        self.raw_file(origin, &format!("{name}.ext.toml"), &format!("entry = \"{entry}\"\n"))
    }

    pub fn raw_file(&self, origin: Origin, file_name: &str, contents: &str) -> PathBuf {
        let path = self.dir(origin).join(file_name);
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Registers `extension` under `entry` and installs a manifest for it.
    pub fn install(&mut self, origin: Origin, name: &str, entry: &str, extension: Scripted) {
        self.catalog
            .register(extension.factory(entry))
            .expect("register test factory");
        self.manifest(origin, name, entry);
    }

    pub fn registry(self) -> (ExtensionRegistry, Session) {
        let registry = ExtensionRegistry::new(
            Arc::new(self.settings()),
            Arc::new(self.catalog),
            self.warnings.clone(),
        );
        let session = Session {
            _user: self.user,
            _system: self.system,
            warnings: self.warnings,
            calls: self.calls,
        };
        (registry, session)
    }
}

/// Keeps fixture directories alive and exposes recorded side effects.
pub struct Session {
    _user: TempDir,
    _system: TempDir,
    pub warnings: Arc<MemoryWarningSink>,
    pub calls: CallLog,
}

impl Session {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log lock").clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().expect("call log lock").clear();
    }
}
