use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use appmgr_core::AppRecord;
use appmgr_installer::{AppInstaller, HttpFetcher, OperationOutcome};
use appmgr_registry::{AppRegistry, AppsLayout, RegistryConfig, RegistryResult, StatusReport};
use tracing::debug;

use crate::render::{
    current_output_style, format_outcome_line, format_record_json, format_records_json,
    format_status_report, render_status_line, OperationProgress, OutputStyle,
};
use crate::{Cli, Commands};

const PROGRESS_POLL_INTERVAL: Duration = Duration::from_millis(80);

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let installer = open_installer(&config, cli.root.as_deref())?;
    let style = current_output_style();

    match cli.command {
        Commands::List => {
            println!("{}", format_records_json(&installer.get_all())?);
        }
        Commands::Get { name } => {
            println!("{}", format_record_json(&installer.get(&name)?)?);
        }
        Commands::Status { name } => {
            println!("{}", format_status_report(&installer.status(&name)?));
        }
        Commands::Install { update_url } => {
            let outcome = run_with_progress(
                style,
                "install",
                || installer.install(&update_url),
                || find_by_update_url(&installer.get_all(), &update_url),
            )?;
            finish_operation("install", &outcome, style)?;
        }
        Commands::Update { name } => {
            let outcome = run_with_progress(
                style,
                "update",
                || installer.update(&name),
                || observe_app(&installer, &name),
            )?;
            finish_operation("update", &outcome, style)?;
        }
        Commands::CheckUpdate { name } => {
            let outcome = run_with_progress(
                style,
                "check-update",
                || installer.check_for_update(&name),
                || observe_app(&installer, &name),
            )?;
            finish_operation("check-update", &outcome, style)?;
        }
        Commands::Uninstall { name } => {
            let record = installer.uninstall(&name)?;
            println!(
                "{}",
                render_status_line(style, "ok", &format!("uninstalled {}", record.name))
            );
        }
        Commands::AutoDownload { name, allowed } => {
            let record = installer.registry().set_auto_download(&name, allowed)?;
            println!("{}", format_record_json(&record)?);
        }
        Commands::RegisterPreloaded => {
            let registered = installer.registry().ensure_preloaded(&config.preloaded)?;
            if registered.is_empty() {
                println!(
                    "{}",
                    render_status_line(style, "info", "preloaded apps already registered")
                );
            }
            for record in registered {
                println!(
                    "{}",
                    render_status_line(style, "ok", &format!("registered {}", record.name))
                );
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RegistryConfig> {
    match path {
        Some(path) => RegistryConfig::load(path),
        None => Ok(RegistryConfig::default()),
    }
}

fn open_installer(config: &RegistryConfig, root_override: Option<&Path>) -> Result<AppInstaller> {
    let root = match root_override {
        Some(root) => root.to_path_buf(),
        None => config.resolve_root()?,
    };
    debug!(root = %root.display(), "opening app registry");

    let registry = AppRegistry::open(AppsLayout::new(root), config.origin.clone())?;
    let fetcher = HttpFetcher::new(Duration::from_secs(config.http_timeout_secs))?;
    Ok(AppInstaller::new(Arc::new(registry), Arc::new(fetcher)))
}

/// Runs `operation` on a worker thread and feeds the spinner with whatever
/// `observe` reports until it settles.
fn run_with_progress<F, O>(
    style: OutputStyle,
    label: &str,
    operation: F,
    observe: O,
) -> Result<OperationOutcome>
where
    F: FnOnce() -> RegistryResult<OperationOutcome> + Send,
    O: Fn() -> Option<(String, StatusReport)>,
{
    if style == OutputStyle::Plain {
        return Ok(operation()?);
    }

    let progress = OperationProgress::start(style, label);
    let joined = thread::scope(|scope| {
        let worker = scope.spawn(operation);
        while !worker.is_finished() {
            let observed = observe();
            progress.observe(
                observed
                    .as_ref()
                    .map(|(name, report)| (name.as_str(), *report)),
            );
            thread::sleep(PROGRESS_POLL_INTERVAL);
        }
        worker.join()
    });
    progress.finish();

    let outcome = joined.map_err(|_| anyhow!("{label} worker panicked"))??;
    Ok(outcome)
}

fn observe_app(installer: &AppInstaller, name: &str) -> Option<(String, StatusReport)> {
    installer
        .status(name)
        .ok()
        .map(|report| (name.to_string(), report))
}

/// The app being installed is only known by its update URL until the
/// manifest names it.
pub(crate) fn find_by_update_url(
    records: &[AppRecord],
    update_url: &str,
) -> Option<(String, StatusReport)> {
    records
        .iter()
        .find(|record| record.update_url.as_deref() == Some(update_url))
        .map(|record| (record.name.clone(), StatusReport::from(record)))
}

fn finish_operation(label: &str, outcome: &OperationOutcome, style: OutputStyle) -> Result<()> {
    if let Some(failure) = outcome.failure() {
        let detail = outcome.detail.as_deref().unwrap_or("no detail");
        bail!("{label} failed ({}): {detail}", failure.as_str());
    }

    println!("{}", format_outcome_line(outcome, style));
    if let Some(record) = &outcome.record {
        println!("{}", format_record_json(record)?);
    }
    Ok(())
}
