#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

use hw_projects_test_helpers::{TestVolume, metro_elevator};

fn hwp_bin() -> PathBuf {
    // Cargo sets this for integration tests.
    PathBuf::from(env!("CARGO_BIN_EXE_hwp"))
}

fn hwp(volume: &TestVolume, args: &[&str]) -> Output {
    Command::new(hwp_bin())
        .args(args)
        .env("HWP_PROJECTS_ROOT", volume.root())
        .env("HWP_SETTINGS_PATH", volume.root().join("settings/user-settings.json"))
        .env_remove("HWP_TEMPLATES_DIR")
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn hwp")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn resolve_prints_the_folder() {
    let volume = TestVolume::new();
    let folder = volume.add_project(&metro_elevator());

    let out = hwp(&volume, &["resolve", "625301"]);
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out).trim_end(), folder.display().to_string());
}

#[test]
fn failure_prints_name_and_message_and_exits_1() {
    let volume = TestVolume::new();
    volume.add_folder("625301", "625302 Neighbour");

    let out = hwp(&volume, &["resolve", "625301"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("NotFoundError: Couldn't find folder starting with 625301"),
        "{stderr}"
    );
}

#[test]
fn json_mode_reports_filesystem_errors() {
    let volume = TestVolume::new();

    let out = hwp(&volume, &["--json", "resolve", "625301"]);
    assert_eq!(out.status.code(), Some(1));
    let doc: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("json outcome");
    assert_eq!(doc["success"], false);
    assert_eq!(doc["error"]["name"], "ListError");
    assert_eq!(doc["error"]["code"], "ENOENT");
    assert_eq!(doc["error"]["syscall"], "scandir");
}

#[test]
fn email_writes_the_draft() {
    let volume = TestVolume::new();
    let folder = volume.add_project(&metro_elevator());
    let pdf = hw_projects_test_helpers::write_fake_pdf(&folder.join("Drawings/layout.pdf"));

    let out = hwp(
        &volume,
        &[
            "--json",
            "email",
            "625301",
            "--drawings",
            "--attach",
            pdf.to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "{out:?}");
    let doc: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let written = PathBuf::from(doc["data"].as_str().unwrap());
    assert_eq!(written, folder.join("Metro Elevator PO PO-1 - HW 625301.eml"));

    let text = std::fs::read_to_string(written).unwrap();
    assert!(text.contains("name=Customer 625301 dwgs 1.pdf"));
    assert!(text.ends_with("----boundary_area_0--"));
}

#[test]
fn project_create_then_show() {
    let volume = TestVolume::new();
    let created = hwp(
        &volume,
        &[
            "project",
            "create",
            "--contract-no",
            "731004",
            "--customer-name",
            "Acme: Lifts",
            "--po-no",
            "PO-9",
            "--price",
            "99.5",
        ],
    );
    assert!(created.status.success(), "{created:?}");
    assert!(volume.root().join("73xxxx/731xxx/731004 Acme Lifts").is_dir());

    let shown = hwp(&volume, &["--json", "project", "show", "731004"]);
    let doc: serde_json::Value = serde_json::from_str(&stdout(&shown)).unwrap();
    assert_eq!(doc["data"]["customerName"], "Acme Lifts");
    assert_eq!(doc["data"]["currency"], "USD");
}

#[test]
fn settings_file_is_created_on_first_run() {
    let volume = TestVolume::new();
    let out = hwp(&volume, &["--json", "settings", "show"]);
    assert!(out.status.success(), "{out:?}");
    let doc: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(doc["data"]["server"], "https://staging-hwcalc.vantage-link.com");
    assert_eq!(doc["data"]["email"], "");
    assert!(volume.root().join("settings/user-settings.json").is_file());
}
