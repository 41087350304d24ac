use super::*;

const CALCULATOR_JSON: &str = r#"{"name":"calculator","installState":0,"manifestUrl":"https://calculator.local:4443/manifest.webapp","status":0,"updateState":0,"updateUrl":"https://store.server/calculator/manifest.webapp","allowedAutoDownload":false}"#;
const LAUNCHER_JSON: &str = r#"{"name":"launcher","installState":0,"manifestUrl":"https://launcher.local:4443/manifest.webapp","status":0,"updateState":0,"updateUrl":"","allowedAutoDownload":false}"#;

#[test]
fn record_serializes_to_exact_wire_shape() {
    let record = AppRecord::new(
        "calculator",
        "https://calculator.local:4443/manifest.webapp",
        Some("https://store.server/calculator/manifest.webapp".to_string()),
    );

    let json = serde_json::to_string(&record).expect("record should serialize");
    assert_eq!(json, CALCULATOR_JSON);
}

#[test]
fn record_without_update_source_writes_empty_update_url() {
    let record = AppRecord::new("launcher", "https://launcher.local:4443/manifest.webapp", None);

    let json = serde_json::to_string(&record).expect("record should serialize");
    assert_eq!(json, LAUNCHER_JSON);
    assert!(!record.has_update_source());
}

#[test]
fn empty_update_url_reads_back_as_absent() {
    let record: AppRecord = serde_json::from_str(LAUNCHER_JSON).expect("record should parse");
    assert_eq!(record.update_url, None);
    assert_eq!(record.install_state, InstallState::Installed);
    assert!(!record.allowed_auto_download);
}

#[test]
fn blank_update_url_is_normalized_on_construction() {
    let record = AppRecord::new("system", "https://system.local:4443/manifest.webapp", Some("  ".into()));
    assert_eq!(record.update_url, None);
}

#[test]
fn record_rejects_extra_fields() {
    let raw = r#"{"name":"x","installState":0,"manifestUrl":"m","status":0,"updateState":0,"updateUrl":"","allowedAutoDownload":false,"version":"1.0"}"#;
    let err = serde_json::from_str::<AppRecord>(raw).expect_err("unknown field must fail");
    assert!(err.to_string().contains("unknown field"));
}

#[test]
fn record_rejects_unknown_state_codes() {
    let raw = r#"{"name":"x","installState":9,"manifestUrl":"m","status":0,"updateState":0,"updateUrl":"","allowedAutoDownload":false}"#;
    let err = serde_json::from_str::<AppRecord>(raw).expect_err("unknown code must fail");
    assert!(err.to_string().contains("unknown installState code: 9"));
}

#[test]
fn state_codes_serialize_as_integers() {
    let mut record = AppRecord::new("ciautotest", "https://ciautotest.local:4443/manifest.webapp", None);
    record.install_state = InstallState::Installing;
    record.update_state = UpdateState::Available;
    record.status = AppStatus::Verifying;

    let value = serde_json::to_value(&record).expect("record should serialize");
    assert_eq!(value["installState"], 2);
    assert_eq!(value["updateState"], 2);
    assert_eq!(value["status"], 3);
    assert!(!record.is_steady());
}

#[test]
fn only_idle_and_available_update_states_are_committable() {
    assert!(UpdateState::Idle.is_committable());
    assert!(UpdateState::Available.is_committable());
    assert!(!UpdateState::Checking.is_committable());
    assert!(!UpdateState::Downloading.is_committable());
    assert!(!UpdateState::Applying.is_committable());
}

#[test]
fn parse_packaged_mini_manifest() {
    let raw = br#"{
        "name": "ciautotest",
        "version": "1.0.1",
        "description": "CI test app",
        "package_path": "packaged_app.zip",
        "size": 1024,
        "sha256": "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    }"#;

    let manifest = AppManifest::from_json_slice(raw).expect("manifest should parse");
    assert_eq!(manifest.name, "ciautotest");
    assert_eq!(manifest.kind(), AppKind::Packaged);
    assert_eq!(manifest.size, Some(1024));
    assert_eq!(
        manifest
            .package_url("http://127.0.0.1:8081/tests/fixtures/packaged_app_manifest.json")
            .expect("package url should resolve")
            .as_deref(),
        Some("http://127.0.0.1:8081/tests/fixtures/packaged_app.zip")
    );
}

#[test]
fn parse_hosted_manifest() {
    let raw = br#"{"name": "hellopwa", "version": "1.0", "start_url": "/index.html"}"#;
    let manifest = AppManifest::from_json_slice(raw).expect("manifest should parse");
    assert_eq!(manifest.kind(), AppKind::Hosted);
    assert_eq!(
        manifest
            .package_url("https://seinlin.github.io/tests/pwa/manifest.webapp")
            .expect("hosted manifest has no package"),
        None
    );
}

#[test]
fn package_url_resolves_absolute_and_root_relative_paths() {
    let mut manifest = AppManifest::from_json_slice(br#"{"name":"app","package_path":"/pkg/app.zip"}"#)
        .expect("manifest should parse");
    assert_eq!(
        manifest
            .package_url("https://store.server/app/manifest.webapp")
            .expect("package url should resolve")
            .as_deref(),
        Some("https://store.server/pkg/app.zip")
    );

    manifest.package_path = Some("https://cdn.test/app.zip".to_string());
    assert_eq!(
        manifest
            .package_url("https://store.server/app/manifest.webapp")
            .expect("package url should resolve")
            .as_deref(),
        Some("https://cdn.test/app.zip")
    );
}

#[test]
fn package_url_ignores_manifest_query_and_normalizes_dot_segments() {
    let mut manifest = AppManifest::from_json_slice(br#"{"name":"app","package_path":"app.zip"}"#)
        .expect("manifest should parse");
    assert_eq!(
        manifest
            .package_url("http://127.0.0.1:8081/tests/fixtures/m.json?rev=a/b")
            .expect("package url should resolve")
            .as_deref(),
        Some("http://127.0.0.1:8081/tests/fixtures/app.zip")
    );

    manifest.package_path = Some("../packages/app.zip".to_string());
    assert_eq!(
        manifest
            .package_url("https://store.server/apps/app/manifest.webapp#latest")
            .expect("package url should resolve")
            .as_deref(),
        Some("https://store.server/apps/packages/app.zip")
    );
}

#[test]
fn package_url_rejects_unparseable_manifest_url() {
    let manifest = AppManifest::from_json_slice(br#"{"name":"app","package_path":"app.zip"}"#)
        .expect("manifest should parse");
    let err = manifest
        .package_url("not a url")
        .expect_err("relative base must fail");
    assert!(err.to_string().contains("invalid manifest url"));
}

#[test]
fn manifest_rejects_invalid_names_and_digests() {
    let err = AppManifest::from_json_slice(br#"{"name":"bad name"}"#)
        .expect_err("space in name must fail");
    assert!(err.to_string().contains("invalid app name"));

    let err = AppManifest::from_json_slice(br#"{"name":"-app"}"#)
        .expect_err("leading separator must fail");
    assert!(err.to_string().contains("invalid app name"));

    let err = AppManifest::from_json_slice(br#"{"name":"app","sha256":"xyz"}"#)
        .expect_err("short digest must fail");
    assert!(err.to_string().contains("64 hex characters"));

    let err = AppManifest::from_json_slice(br#"{"name":"app","package_path":" "}"#)
        .expect_err("blank package path must fail");
    assert!(err.to_string().contains("package_path must not be empty"));
}

#[test]
fn newer_version_detection() {
    let manifest = AppManifest::from_json_slice(br#"{"name":"app","version":"1.2"}"#)
        .expect("manifest should parse");
    assert!(manifest.is_newer_than(None));
    assert!(manifest.is_newer_than(Some("1.1.9")));
    assert!(!manifest.is_newer_than(Some("1.2.0")));
    assert!(!manifest.is_newer_than(Some("2.0")));

    let odd = AppManifest::from_json_slice(br#"{"name":"app","version":"build-7"}"#)
        .expect("manifest should parse");
    assert!(odd.is_newer_than(Some("build-6")));
    assert!(!odd.is_newer_than(Some("build-7")));

    let unversioned = AppManifest::from_json_slice(br#"{"name":"app"}"#)
        .expect("manifest should parse");
    assert!(!unversioned.is_newer_than(Some("1.0.0")));
}

#[test]
fn local_origin_derives_manifest_urls() {
    let origin = LocalOrigin::default();
    assert_eq!(
        origin.manifest_url("ciautotest", AppKind::Packaged),
        "https://ciautotest.local:4443/manifest.webapp"
    );
    assert_eq!(
        origin.manifest_url("hellopwa", AppKind::Hosted),
        "https://cached.local:4443/hellopwa/manifest.webapp"
    );
}
