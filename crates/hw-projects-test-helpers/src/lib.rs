//! Shared fixtures for workspace tests.
//!
//! [`TestVolume`] is a temporary project volume laid out with the same shard
//! convention as the production share, so tests can exercise resolution and
//! message writes without a network drive.

#![forbid(unsafe_code)]
#![allow(clippy::missing_panics_doc)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use hw_projects_core::{Config, ProjectRecord};
use tempfile::TempDir;

/// Minimal bytes that look like a PDF to anything sniffing the header.
pub const FAKE_PDF: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";

/// Install a test tracing subscriber once per process (`RUST_LOG` aware).
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A temporary project volume root.
pub struct TestVolume {
    dir: TempDir,
}

impl TestVolume {
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        Self {
            dir: tempfile::tempdir().expect("create temp volume"),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Config pointing at this volume, with a settings file inside it.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            projects_root: self.root().to_path_buf(),
            user_email: "eng@example.com".to_string(),
            user_name: "Test Engineer".to_string(),
            settings_path: self.root().join("user-settings.json"),
            ..Config::default()
        }
    }

    /// Shard directory for `contract_no`, created if needed. Only handles
    /// contract numbers ending in at least 4 digits.
    #[must_use]
    pub fn shard_dir(&self, contract_no: &str) -> PathBuf {
        assert!(
            contract_no.len() >= 4 && contract_no[contract_no.len() - 4..].bytes().all(|b| b.is_ascii_digit()),
            "fixture expects a contract number ending in 4 digits"
        );
        let shard4 = format!("{}xxxx", &contract_no[..contract_no.len() - 4]);
        let shard3 = format!("{}xxx", &contract_no[..contract_no.len() - 3]);
        let dir = self.root().join(shard4).join(shard3);
        fs::create_dir_all(&dir).expect("create shard dir");
        dir
    }

    /// Create an arbitrary entry (directory) inside the contract's shard dir.
    pub fn add_folder(&self, contract_no: &str, name: &str) -> PathBuf {
        let dir = self.shard_dir(contract_no).join(name);
        fs::create_dir_all(&dir).expect("create folder");
        dir
    }

    /// Create the project's folder with its `data.json` mirror.
    pub fn add_project(&self, record: &ProjectRecord) -> PathBuf {
        let folder = self.add_folder(&record.contract_no, &record.folder_name());
        let json = serde_json::to_string_pretty(record).expect("serialize record");
        fs::write(folder.join("data.json"), json).expect("write mirror");
        folder
    }

    /// Write a fake PDF at `rel` below the volume root.
    pub fn add_pdf(&self, rel: impl AsRef<Path>) -> PathBuf {
        write_fake_pdf(&self.root().join(rel))
    }
}

impl Default for TestVolume {
    fn default() -> Self {
        Self::new()
    }
}

/// Write [`FAKE_PDF`] to `path`, creating parent directories.
pub fn write_fake_pdf(path: &Path) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create pdf parent");
    }
    fs::write(path, FAKE_PDF).expect("write pdf");
    path.to_path_buf()
}

/// The record used across the end-to-end tests.
#[must_use]
pub fn metro_elevator() -> ProjectRecord {
    ProjectRecord {
        id: None,
        contract_no: "625301".to_string(),
        customer_name: "Metro Elevator".to_string(),
        po_no: "PO-1".to_string(),
        price: 1250.0,
        currency: "USD".to_string(),
        bookmarked: false,
        completed: None,
        created: "2026-10-19T12:00:00.000Z".to_string(),
        released: None,
        user: "eng@example.com".to_string(),
    }
}
