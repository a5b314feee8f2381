//! Per-target numbering of valid signature results.

use crate::extension::contract::{Extension, FnFactory, Hook, HookResult, ModuleContext};
use crate::result::ScanResult;
use log::info;

pub const ENTRY: &str = "builtin.result_counter";
/// Field receiving the zero-based index of each valid result.
pub const RESULT_INDEX_FIELD: &str = "result_index";

const DOCUMENTATION: &str = "Numbers valid results within each scan target.";
const AFFINITY: &[&str] = &["signature"];

pub fn factory() -> FnFactory {
    FnFactory::new(ENTRY, |context| {
        Ok(Box::new(ResultCounter::new(context)) as Box<dyn Extension>)
    })
    .with_documentation(DOCUMENTATION)
}

struct ResultCounter {
    module: String,
    valid_results: i64,
}

impl ResultCounter {
    fn new(context: &ModuleContext) -> Self {
        Self {
            module: context.identity().to_string(),
            valid_results: 0,
        }
    }
}

impl Extension for ResultCounter {
    fn hooks(&self) -> &'static [Hook] {
        &[Hook::PreScan, Hook::Scan, Hook::PostScan]
    }

    fn affinity(&self) -> &[&str] {
        AFFINITY
    }

    fn pre_scan(&mut self) -> HookResult {
        self.valid_results = 0;
        Ok(())
    }

    fn scan(&mut self, result: &mut ScanResult) -> HookResult {
        if result.valid {
            result.set(RESULT_INDEX_FIELD, self.valid_results);
            self.valid_results += 1;
        }
        Ok(())
    }

    fn post_scan(&mut self) -> HookResult {
        info!(
            "event=scan_target module=result_counter status=ok context={} valid_results={}",
            self.module, self.valid_results
        );
        Ok(())
    }
}
