//! Structured extension errors.
//!
//! Every recoverable error ends up as exactly one warning. `Interrupted` is
//! the only variant that escapes to the caller.

use crate::extension::contract::{Hook, HookError};
use crate::interrupt::Interrupted;
use crate::report::WarningSink;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    /// Manifest file could not be read or parsed during discovery.
    Manifest { path: PathBuf, reason: String },
    /// Manifest names an entry id missing from the catalog.
    UnknownEntry { name: String, entry: String },
    /// Locate/load/construct/init failed while binding an extension.
    Load { name: String, reason: String },
    /// A dispatched hook returned an ordinary failure.
    Callback {
        extension: String,
        hook: Hook,
        reason: String,
    },
    Interrupted,
}

impl ExtensionError {
    pub fn load(name: &str, reason: impl Display) -> Self {
        Self::Load {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Maps a construct/init failure for extension `name`.
    pub fn from_load_hook(name: &str, err: HookError) -> Self {
        match err {
            HookError::Interrupted => Self::Interrupted,
            HookError::Failed(reason) => Self::Load {
                name: name.to_string(),
                reason,
            },
        }
    }

    /// Maps a dispatch failure of `hook` on extension `name`.
    pub fn from_callback(name: &str, hook: Hook, err: HookError) -> Self {
        match err {
            HookError::Interrupted => Self::Interrupted,
            HookError::Failed(reason) => Self::Callback {
                extension: name.to_string(),
                hook,
                reason,
            },
        }
    }

    pub fn is_interruption(&self) -> bool {
        matches!(self, Self::Interrupted)
    }

    /// Emits a warning for recoverable errors; re-raises interruption untouched.
    pub fn report_to(self, sink: &dyn WarningSink) -> Result<(), Interrupted> {
        if self.is_interruption() {
            return Err(Interrupted);
        }
        sink.warning(&self.to_string());
        Ok(())
    }
}

impl Display for ExtensionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manifest { path, reason } => {
                write!(f, "Error loading extension '{}': {reason}", path.display())
            }
            Self::UnknownEntry { name, entry } => write!(
                f,
                "Error loading extension '{name}': entry `{entry}` is not registered"
            ),
            Self::Load { name, reason } => {
                write!(f, "Failed to load extension '{name}': {reason}")
            }
            Self::Callback {
                extension,
                hook,
                reason,
            } => write!(f, "{extension}.{hook} failed: {reason}"),
            Self::Interrupted => write!(f, "{}", Interrupted),
        }
    }
}

impl Error for ExtensionError {}

impl From<Interrupted> for ExtensionError {
    fn from(_: Interrupted) -> Self {
        Self::Interrupted
    }
}
