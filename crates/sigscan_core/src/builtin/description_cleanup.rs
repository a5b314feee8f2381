//! Whitespace normalization for result descriptions.

use crate::extension::contract::{Extension, FnFactory, Hook, HookResult};
use crate::result::ScanResult;

pub const ENTRY: &str = "builtin.description_cleanup";

const DOCUMENTATION: &str = "Collapses whitespace runs in result descriptions.

Results left with an empty description are marked invalid.";

pub fn factory() -> FnFactory {
    FnFactory::new(ENTRY, |_| Ok(Box::new(DescriptionCleanup) as Box<dyn Extension>))
        .with_documentation(DOCUMENTATION)
}

struct DescriptionCleanup;

impl Extension for DescriptionCleanup {
    fn hooks(&self) -> &'static [Hook] {
        &[Hook::Scan]
    }

    fn scan(&mut self, result: &mut ScanResult) -> HookResult {
        let cleaned = result.description.split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.is_empty() {
            result.valid = false;
        }
        result.description = cleaned;
        Ok(())
    }
}
