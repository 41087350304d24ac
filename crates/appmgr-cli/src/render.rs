use std::io::IsTerminal;
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use anyhow::{Context, Result};
use appmgr_core::AppRecord;
use appmgr_installer::{OperationOutcome, OperationResult};
use appmgr_registry::StatusReport;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
    if !no_color && std::io::stdout().is_terminal() {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

/// Spinner that mirrors the live state of the app an operation works on.
pub(crate) struct OperationProgress {
    label: String,
    progress_bar: Option<ProgressBar>,
}

impl OperationProgress {
    pub(crate) fn start(style: OutputStyle, label: &str) -> Self {
        let progress_bar = if style == OutputStyle::Rich {
            let progress_bar = ProgressBar::new_spinner();
            if let Ok(spinner) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}") {
                progress_bar.set_style(spinner.tick_chars(progress_tick_chars(label)));
            }
            progress_bar.set_message(format_progress_message(label, None));
            progress_bar.enable_steady_tick(Duration::from_millis(80));
            Some(progress_bar)
        } else {
            None
        };

        Self {
            label: label.to_string(),
            progress_bar,
        }
    }

    pub(crate) fn observe(&self, observed: Option<(&str, StatusReport)>) {
        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.set_message(format_progress_message(&self.label, observed));
        }
    }

    pub(crate) fn finish(mut self) {
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish_and_clear();
        }
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => {
            let (badge, badge_style) = status_badge(status);
            format!("{} {message}", colorize(badge_style, badge))
        }
    }
}

pub(crate) fn format_records_json(records: &[AppRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).context("failed to encode app records")
}

pub(crate) fn format_record_json(record: &AppRecord) -> Result<String> {
    serde_json::to_string_pretty(record).context("failed to encode app record")
}

pub(crate) fn format_status_report(report: &StatusReport) -> String {
    format!(
        "installState={}({}) updateState={}({}) status={}({})",
        report.install_state.as_str(),
        report.install_state.code(),
        report.update_state.as_str(),
        report.update_state.code(),
        report.status.as_str(),
        report.status.code()
    )
}

pub(crate) fn format_progress_message(label: &str, observed: Option<(&str, StatusReport)>) -> String {
    match observed {
        Some((name, report)) => format!(
            "{label} {name}: {}/{}/{}",
            report.install_state.as_str(),
            report.update_state.as_str(),
            report.status.as_str()
        ),
        None => format!("{label}: fetching manifest"),
    }
}

/// Summary line for a settled operation. Failures are reported through the
/// command error instead.
pub(crate) fn format_outcome_line(outcome: &OperationOutcome, style: OutputStyle) -> String {
    let name = outcome
        .record
        .as_ref()
        .map(|record| record.name.as_str())
        .unwrap_or("app");
    let (status, message) = match outcome.result {
        OperationResult::Installed => ("ok", format!("installed {name}")),
        OperationResult::Updated => ("ok", format!("updated {name}")),
        OperationResult::UpdateAvailable => ("info", format!("update available for {name}")),
        OperationResult::UpToDate => ("info", format!("{name} is up to date")),
        OperationResult::Failed(failure) => ("err", format!("{name}: {}", failure.as_str())),
    };
    render_status_line(style, status, &message)
}

fn status_badge(status: &str) -> (&'static str, Style) {
    match status {
        "ok" => ("[OK]", Style::new().fg_color(Some(AnsiColor::Green.into()))),
        "warn" => ("[WARN]", Style::new().fg_color(Some(AnsiColor::Yellow.into()))),
        "err" => (
            "[ERR]",
            Style::new()
                .fg_color(Some(AnsiColor::Red.into()))
                .effects(Effects::BOLD),
        ),
        _ => ("[..]", Style::new().fg_color(Some(AnsiColor::BrightBlue.into()))),
    }
}

fn progress_tick_chars(label: &str) -> &'static str {
    match label {
        "install" => ".oO@* ",
        "update" => "<^>v ",
        "check-update" => "-=~* ",
        _ => "|/-\\ ",
    }
}

pub(crate) fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
