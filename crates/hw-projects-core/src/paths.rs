//! Location of the user settings file and atomic file writes.
//!
//! The settings live in `<platform config dir>/hw-projects/user-settings.json`.
//! The platform directory comes from [`dirs::config_dir`], which honours
//! `$XDG_CONFIG_HOME` on Linux and resolves to `%APPDATA%` on Windows.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const APP_DIR: &str = "hw-projects";

/// File name of the user settings document.
pub const SETTINGS_FILE_NAME: &str = "user-settings.json";

/// Per-user directory holding the settings file.
///
/// Falls back to `./hw-projects` when the platform reports no config dir.
#[must_use]
pub fn config_dir() -> PathBuf {
    app_dir_in(dirs::config_dir())
}

fn app_dir_in(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

/// Default settings file, `config_dir()/user-settings.json`.
#[must_use]
pub fn settings_path() -> PathBuf {
    config_dir().join(SETTINGS_FILE_NAME)
}

/// Write bytes to a file atomically via a temp file + rename.
///
/// The temp file is created in the same directory as the target so that
/// `fs::rename` stays on one filesystem. The parent directory must exist.
/// On failure the temp file is removed and the target is left untouched.
pub fn write_file_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp_name = format!(
        ".tmp-{}-{seq}-{}",
        std::process::id(),
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    let tmp_path = parent.join(tmp_name);

    let written = fs::File::create(&tmp_path).and_then(|mut f| {
        f.write_all(data)?;
        f.sync_data()
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    fs::rename(&tmp_path, path).inspect_err(|_| {
        // Best-effort cleanup of the temp file on rename failure
        let _ = fs::remove_file(&tmp_path);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_ends_with_app_dir() {
        assert!(config_dir().ends_with(APP_DIR));
    }

    #[test]
    fn test_app_dir_without_platform_base_is_relative() {
        assert_eq!(app_dir_in(None), Path::new(".").join(APP_DIR));
        assert_eq!(
            app_dir_in(Some(PathBuf::from("/home/eng/.config"))),
            Path::new("/home/eng/.config/hw-projects")
        );
    }

    #[test]
    fn test_settings_path_ends_with_file_name() {
        assert!(settings_path().ends_with(SETTINGS_FILE_NAME));
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("out.txt");
        write_file_atomic(&target, b"first").unwrap();
        write_file_atomic(&target, b"second").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "second");

        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_atomic_write_into_missing_dir_fails_cleanly() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("missing").join("out.txt");
        assert!(write_file_atomic(&target, b"x").is_err());
        assert!(!target.exists());
    }
}
