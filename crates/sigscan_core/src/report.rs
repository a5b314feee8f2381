//! Warning emission for recoverable extension failures.

use log::warn;
use std::sync::{Mutex, PoisonError};

/// Host collaborator receiving one message per recoverable failure.
pub trait WarningSink {
    fn warning(&self, message: &str);
}

/// Forwards warnings to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogWarningSink;

impl WarningSink for LogWarningSink {
    fn warning(&self, message: &str) {
        warn!("event=extension_warning module=extension status=warn message={message}");
    }
}

/// Collects warnings in memory and also forwards them to `log`.
///
/// Useful for hosts that print a warning summary after a scan.
#[derive(Debug, Default)]
pub struct MemoryWarningSink {
    messages: Mutex<Vec<String>>,
}

impl MemoryWarningSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drains collected messages.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WarningSink for MemoryWarningSink {
    fn warning(&self, message: &str) {
        LogWarningSink.warning(message);
        self.lock().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryWarningSink, WarningSink};

    #[test]
    fn memory_sink_collects_and_drains() {
        let sink = MemoryWarningSink::new();
        sink.warning("first");
        sink.warning("second");
        assert_eq!(sink.len(), 2);

        assert_eq!(sink.take(), vec!["first".to_string(), "second".to_string()]);
        assert!(sink.is_empty());
    }
}
