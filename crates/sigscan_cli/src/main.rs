//! Command-line host for the sigscan extension subsystem.
//!
//! # Responsibility
//! - Wire settings, logging, and the built-in catalog into a registry.
//! - List discovered extensions, or replay findings through the scan lifecycle.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sigscan_core::{
    init_logging, CancelToken, ExtensionCatalog, ExtensionRegistry, Interrupted, LogLevel,
    ModuleContext, ScanResult, Settings, WarningSink,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Exit status for a cancelled session, matching SIGINT conventions.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "sigscan", version, about = "sigscan extension host")]
struct Cli {
    /// User-scope extension directory (overrides SIGSCAN_USER_DIR).
    #[arg(long, global = true)]
    user_dir: Option<PathBuf>,

    /// System-scope extension directory (overrides SIGSCAN_SYSTEM_DIR).
    #[arg(long, global = true)]
    system_dir: Option<PathBuf>,

    /// Absolute directory for rotating log files; logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the extension inventory of both search directories.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Load extensions for a module and replay findings through them.
    Run {
        /// Identity of the active scanning module.
        #[arg(long, default_value = "signature")]
        module: String,

        /// Scan target labels; each one gets its own pre/post scan pass.
        #[arg(long = "target", default_value = "stdin")]
        targets: Vec<String>,

        /// Finding descriptions, reported at consecutive offsets.
        findings: Vec<String>,
    },
}

/// Prints warnings to stderr and forwards them to the log file.
struct ConsoleWarnings;

impl WarningSink for ConsoleWarnings {
    fn warning(&self, message: &str) {
        eprintln!("warning: {message}");
        log::warn!("event=extension_warning module=cli status=warn message={message}");
    }
}

fn main() -> ExitCode {
    let cancel = CancelToken::new();
    let outcome = watch_ctrl_c(&cancel).and_then(|()| run(Cli::parse(), cancel));
    ExitCode::from(exit_status(&outcome))
}

/// Trips `cancel` on SIGINT; the session then ends with `Interrupted`.
fn watch_ctrl_c(cancel: &CancelToken) -> Result<()> {
    let token = cancel.clone();
    ctrlc::set_handler(move || {
        log::warn!("event=session_interrupt module=cli status=cancel source=sigint");
        token.cancel();
    })
    .context("installing Ctrl-C handler")
}

fn exit_status(outcome: &Result<()>) -> u8 {
    match outcome {
        Ok(()) => 0,
        Err(err) if err.is::<Interrupted>() => {
            eprintln!("interrupted");
            EXIT_INTERRUPTED
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    }
}

fn run(cli: Cli, cancel: CancelToken) -> Result<()> {
    if let Some(log_dir) = &cli.log_dir {
        let level = match &cli.log_level {
            Some(raw) => raw.parse::<LogLevel>()?,
            None => LogLevel::build_default(),
        };
        init_logging(level, log_dir).context("initializing logging")?;
    }

    let mut settings = Settings::from_env();
    if let Some(dir) = cli.user_dir {
        settings = settings.with_user_dir(dir);
    }
    if let Some(dir) = cli.system_dir {
        settings = settings.with_system_dir(dir);
    }
    let catalog = ExtensionCatalog::with_builtins().context("registering built-in extensions")?;
    let mut registry =
        ExtensionRegistry::new(Arc::new(settings), Arc::new(catalog), Arc::new(ConsoleWarnings))
            .with_cancel_token(cancel);

    match cli.command {
        Command::List { json } => list(&registry, json),
        Command::Run {
            module,
            targets,
            findings,
        } => replay(&mut registry, &ModuleContext::new(module), &targets, &findings),
    }
}

fn list(registry: &ExtensionRegistry, json: bool) -> Result<()> {
    let inventory = registry.list_extensions()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&inventory)?);
        return Ok(());
    }

    for origin in [&inventory.user, &inventory.system] {
        let path = origin
            .path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "(not configured)".to_string());
        println!("{} extensions: {path}", origin.origin);
        for entry in &origin.extensions {
            let state = if entry.is_ready() { "enabled" } else { "failed" };
            println!("  {:<24} {:<8} {}", entry.name, state, entry.description);
        }
    }
    Ok(())
}

fn replay(
    registry: &mut ExtensionRegistry,
    context: &ModuleContext,
    targets: &[String],
    findings: &[String],
) -> Result<()> {
    let summary = registry.load_all(context)?;
    eprintln!(
        "loaded={} disabled={} failed={}",
        summary.loaded, summary.disabled, summary.failed
    );

    for target in targets {
        registry.dispatch_pre_scan()?;
        for (offset, description) in findings.iter().enumerate() {
            registry.cancel_token().check()?;
            let mut result = ScanResult::new(offset as u64, description.as_str());
            registry.dispatch_scan(&mut result)?;
            if result.valid {
                println!(
                    "{target}\t{}",
                    serde_json::to_string(&result).context("encoding scan result")?
                );
            }
        }
        registry.dispatch_post_scan()?;
    }
    Ok(())
}
