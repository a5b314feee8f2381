//! Search-path settings for extension discovery.
//!
//! # Responsibility
//! - Resolve the user-scope and system-scope extension directories.
//! - Keep path policy out of discovery and loading code.
//!
//! # Invariants
//! - Resolved directories are absolute.
//! - A missing directory is reported as `None`, never as an error.

use log::warn;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable overriding the user-scope extension directory.
pub const USER_DIR_ENV: &str = "SIGSCAN_USER_DIR";
/// Environment variable overriding the system-scope extension directory.
pub const SYSTEM_DIR_ENV: &str = "SIGSCAN_SYSTEM_DIR";
/// Fallback system-scope directory.
pub const DEFAULT_SYSTEM_DIR: &str = "/usr/share/sigscan/extensions";

const APP_DIR_NAME: &str = "sigscan";
const EXTENSIONS_DIR_NAME: &str = "extensions";

/// Scope an extension directory belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    User,
    System,
}

impl Origin {
    /// Load order: user extensions always precede system extensions.
    pub const SEARCH_ORDER: [Origin; 2] = [Origin::User, Origin::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
        }
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a resolved settings path is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPurpose {
    Extensions,
}

/// Settings collaborator consulted by discovery.
pub trait SearchPaths {
    fn get_path(&self, origin: Origin, purpose: PathPurpose) -> Option<PathBuf>;
}

/// Directory settings for both search scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    user_dir: Option<PathBuf>,
    system_dir: Option<PathBuf>,
}

impl Settings {
    /// Creates settings with explicit directories and no fallbacks.
    pub fn new(user_dir: Option<PathBuf>, system_dir: Option<PathBuf>) -> Self {
        Self {
            user_dir,
            system_dir,
        }
    }

    /// Resolves directories from the environment, then platform defaults.
    ///
    /// Relative override values are ignored with a warning.
    pub fn from_env() -> Self {
        let user_fallback =
            dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(EXTENSIONS_DIR_NAME));
        Self {
            user_dir: resolve_dir(
                USER_DIR_ENV,
                std::env::var(USER_DIR_ENV).ok(),
                user_fallback,
            ),
            system_dir: resolve_dir(
                SYSTEM_DIR_ENV,
                std::env::var(SYSTEM_DIR_ENV).ok(),
                Some(PathBuf::from(DEFAULT_SYSTEM_DIR)),
            ),
        }
    }

    pub fn with_user_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_dir = Some(dir.into());
        self
    }

    pub fn with_system_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.system_dir = Some(dir.into());
        self
    }

    pub fn dir(&self, origin: Origin) -> Option<&Path> {
        match origin {
            Origin::User => self.user_dir.as_deref(),
            Origin::System => self.system_dir.as_deref(),
        }
    }
}

impl SearchPaths for Settings {
    fn get_path(&self, origin: Origin, purpose: PathPurpose) -> Option<PathBuf> {
        match purpose {
            PathPurpose::Extensions => self.dir(origin).map(Path::to_path_buf),
        }
    }
}

/// Validates one configured search directory.
///
/// # Errors
/// - Returns an error when `raw` is blank or not absolute.
pub fn normalize_search_dir(raw: &str) -> Result<PathBuf, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("extension directory cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!(
            "extension directory must be an absolute path, got `{trimmed}`"
        ));
    }
    Ok(path.to_path_buf())
}

fn resolve_dir(
    variable: &str,
    raw: Option<String>,
    fallback: Option<PathBuf>,
) -> Option<PathBuf> {
    let Some(raw) = raw else {
        return fallback;
    };
    match normalize_search_dir(&raw) {
        Ok(path) => Some(path),
        Err(err) => {
            warn!("event=settings_resolve module=settings status=ignored variable={variable} error={err}");
            fallback
        }
    }
}
