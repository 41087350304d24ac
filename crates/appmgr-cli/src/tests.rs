use super::*;
use clap::error::ErrorKind;
use clap::CommandFactory;

use appmgr_core::{AppRecord, AppStatus, InstallState, UpdateState};
use appmgr_installer::{OperationFailure, OperationOutcome, OperationResult};
use appmgr_registry::StatusReport;

use crate::dispatch::find_by_update_url;
use crate::render::{
    format_outcome_line, format_progress_message, format_records_json, format_status_report,
    render_status_line, OutputStyle,
};

fn calculator() -> AppRecord {
    AppRecord::new(
        "calculator",
        "https://calculator.local:4443/manifest.webapp",
        Some("https://store.server/calculator/manifest.webapp".to_string()),
    )
}

#[test]
fn install_takes_update_url_positionally() {
    let cli = Cli::try_parse_from([
        "appmgr",
        "install",
        "http://127.0.0.1:8081/tests/fixtures/packaged_app_manifest.json",
    ])
    .expect("command must parse");

    match cli.command {
        Commands::Install { update_url } => assert_eq!(
            update_url,
            "http://127.0.0.1:8081/tests/fixtures/packaged_app_manifest.json"
        ),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn global_flags_are_accepted_after_subcommand() {
    let cli = Cli::try_parse_from(["appmgr", "list", "--root", "/tmp/apps", "--config", "a.toml"])
        .expect("command must parse");

    assert!(matches!(cli.command, Commands::List));
    assert_eq!(cli.root, Some(PathBuf::from("/tmp/apps")));
    assert_eq!(cli.config, Some(PathBuf::from("a.toml")));
}

#[test]
fn auto_download_parses_boolish_values() {
    for (raw, expected) in [("true", true), ("false", false), ("yes", true), ("off", false)] {
        let cli = Cli::try_parse_from(["appmgr", "auto-download", "gallery", raw])
            .expect("command must parse");
        match cli.command {
            Commands::AutoDownload { name, allowed } => {
                assert_eq!(name, "gallery");
                assert_eq!(allowed, expected, "value {raw}");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

#[test]
fn auto_download_requires_policy_value() {
    let err = Cli::try_parse_from(["appmgr", "auto-download", "gallery"])
        .expect_err("missing value must fail");
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn check_update_uses_kebab_case_name() {
    let cli =
        Cli::try_parse_from(["appmgr", "check-update", "ciautotest"]).expect("command must parse");
    assert!(matches!(cli.command, Commands::CheckUpdate { name } if name == "ciautotest"));
}

#[test]
fn every_subcommand_has_help_text() {
    let command = Cli::command();
    for subcommand in command.get_subcommands() {
        assert!(
            subcommand.get_about().is_some(),
            "subcommand {} has no help text",
            subcommand.get_name()
        );
    }
}

#[test]
fn render_status_line_plain_is_unadorned() {
    assert_eq!(
        render_status_line(OutputStyle::Plain, "ok", "installed ciautotest"),
        "installed ciautotest"
    );
}

#[test]
fn render_status_line_rich_includes_badge() {
    let line = render_status_line(OutputStyle::Rich, "err", "update failed");
    assert!(line.contains("[ERR]"));
    assert!(line.ends_with(" update failed"));
}

#[test]
fn status_report_lists_names_and_codes() {
    let mut record = calculator();
    record.install_state = InstallState::Pending;
    record.status = AppStatus::Downloading;

    assert_eq!(
        format_status_report(&StatusReport::from(&record)),
        "installState=pending(1) updateState=idle(0) status=downloading(2)"
    );
}

#[test]
fn progress_message_waits_for_manifest_before_name_is_known() {
    assert_eq!(
        format_progress_message("install", None),
        "install: fetching manifest"
    );

    let mut record = calculator();
    record.update_state = UpdateState::Checking;
    record.status = AppStatus::Fetching;
    assert_eq!(
        format_progress_message("update", Some(("calculator", StatusReport::from(&record)))),
        "update calculator: installed/checking/fetching"
    );
}

#[test]
fn find_by_update_url_matches_only_exact_url() {
    let records = vec![calculator()];

    let (name, report) = find_by_update_url(
        &records,
        "https://store.server/calculator/manifest.webapp",
    )
    .expect("record must be found");
    assert_eq!(name, "calculator");
    assert_eq!(report.install_state, InstallState::Installed);

    assert!(find_by_update_url(&records, "https://store.server/calculator").is_none());
}

#[test]
fn records_render_as_camel_case_json() {
    let rendered = format_records_json(&[calculator()]).expect("must encode");
    let value: serde_json::Value = serde_json::from_str(&rendered).expect("must decode");

    assert_eq!(value[0]["name"], "calculator");
    assert_eq!(value[0]["installState"], 0);
    assert_eq!(value[0]["allowedAutoDownload"], false);
}

#[test]
fn outcome_line_names_the_app() {
    let outcome = OperationOutcome {
        record: Some(calculator()),
        result: OperationResult::UpToDate,
        detail: None,
    };
    assert_eq!(
        format_outcome_line(&outcome, OutputStyle::Plain),
        "calculator is up to date"
    );

    let failed = OperationOutcome {
        record: None,
        result: OperationResult::Failed(OperationFailure::DownloadFailed),
        detail: Some("request failed".to_string()),
    };
    assert_eq!(
        format_outcome_line(&failed, OutputStyle::Plain),
        "app: download-failed"
    );
}
