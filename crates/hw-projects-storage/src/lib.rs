#![forbid(unsafe_code)]
//! Sharded project volume storage.
//!
//! Project folders live two shard levels below the volume root:
//!
//! ```text
//! <root>/
//!   62xxxx/                      # contract number, last 4 digits -> xxxx
//!     625xxx/                    # contract number, last 3 digits -> xxx
//!       625301 Metro Elevator/   # "<contractNo> <customerName>"
//!         data.json              # local mirror of the project record
//!         Metro Elevator PO PO-1 - HW 625301.eml
//! ```
//!
//! Provides:
//! - Shard computation and project folder resolution
//! - Filesystem primitives that map I/O failures onto the shared error taxonomy
//! - Project folder lifecycle (create, mirror, copy, delete)
//! - Remote-then-local orchestration over a [`ProjectApi`]

pub mod service;

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use walkdir::WalkDir;

pub use hw_projects_core::{Error, ProjectRecord, Result};
pub use service::{ProjectApi, ProjectService};

/// File name of the local project record mirror.
pub const MIRROR_FILE_NAME: &str = "data.json";

const SHARD4_PLACEHOLDER: &str = "xxxx";
const SHARD3_PLACEHOLDER: &str = "xxx";

// ---------------------------------------------------------------------------
// Shard computation
// ---------------------------------------------------------------------------

/// The two-level shard directory for a contract number. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardPath {
    pub root: PathBuf,
    /// Contract number with its last 4 digits replaced by `xxxx`.
    pub shard4: String,
    /// Contract number with its last 3 digits replaced by `xxx`.
    pub shard3: String,
}

impl ShardPath {
    /// `root / shard4 / shard3`
    #[must_use]
    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.shard4).join(&self.shard3)
    }
}

fn trailing4_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{4}$").expect("valid regex"))
}

fn trailing3_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{3}$").expect("valid regex"))
}

/// Compute the shard directory for `contract_no` under `root`.
///
/// Pure and total. When the contract number does not end in enough digits the
/// substitution is a no-op and the segment equals the raw contract number.
#[must_use]
pub fn compute_shard_path(root: &Path, contract_no: &str) -> ShardPath {
    let shard4 = trailing4_re()
        .replace(contract_no, SHARD4_PLACEHOLDER)
        .into_owned();
    let shard3 = trailing3_re()
        .replace(contract_no, SHARD3_PLACEHOLDER)
        .into_owned();
    ShardPath {
        root: root.to_path_buf(),
        shard4,
        shard3,
    }
}

// ---------------------------------------------------------------------------
// Project folder resolution
// ---------------------------------------------------------------------------

/// Locate the project folder for `contract_no`.
///
/// Lists the shard directory and selects the entry whose name starts with the
/// exact contract number. Read-only; safe to call concurrently.
///
/// # Errors
/// - [`Error::List`] when the shard directory cannot be listed.
/// - [`Error::FolderNotFound`] when no entry matches.
/// - [`Error::Ambiguous`] when more than one entry matches.
pub fn resolve_project_folder(root: &Path, contract_no: &str) -> Result<PathBuf> {
    let dir = compute_shard_path(root, contract_no).dir();
    tracing::debug!(contract_no, dir = %dir.display(), "resolving project folder");

    let matches: Vec<OsString> = read_dir_names(&dir)?
        .into_iter()
        .filter(|name| name.to_string_lossy().starts_with(contract_no))
        .collect();

    match matches.as_slice() {
        [] => Err(Error::FolderNotFound(contract_no.to_string())),
        [only] => Ok(dir.join(only)),
        _ => Err(Error::Ambiguous {
            prefix: contract_no.to_string(),
            matches: matches
                .iter()
                .map(|m| m.to_string_lossy().into_owned())
                .collect(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Filesystem primitives
// ---------------------------------------------------------------------------

/// Names of the entries in `dir`, in listing order.
pub fn read_dir_names(dir: &Path) -> Result<Vec<OsString>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::list(dir, e))?;
    entries
        .map(|entry| {
            entry
                .map(|e| e.file_name())
                .map_err(|e| Error::list(dir, e))
        })
        .collect()
}

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::read(path, e))
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::read(path, e))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = read_text(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Replace `path` with `content` via write-to-temp-then-rename.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    hw_projects_core::paths::write_file_atomic(path, content.as_bytes())
        .map_err(|e| Error::write(path, e))
}

/// Write `value` pretty-printed with 2-space indentation.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    write_text(path, &content)
}

/// Create a directory and any missing parents.
pub fn make_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::write_op(path, "mkdir", e))
}

/// Remove a directory and everything below it. A missing directory is not an error.
pub fn delete_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(Error::write_op(path, "rm", e)),
        _ => Ok(()),
    }
}

/// Whether anything (file, directory or link) exists at `path`.
#[must_use]
pub fn project_folder_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Copy the directory tree at `source` into `dest`, keeping directories and
/// the files accepted by `keep`. Returns the number of files copied.
pub fn copy_dir_filtered<F>(source: &Path, dest: &Path, keep: F) -> Result<usize>
where
    F: Fn(&Path) -> bool,
{
    let mut copied = 0;
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            Error::read(path, io::Error::other(e))
        })?;
        let Ok(rel) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            make_dir(&target)?;
        } else if entry.file_type().is_file() && keep(entry.path()) {
            fs::copy(entry.path(), &target)
                .map_err(|e| Error::write_op(&target, "copyfile", e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

// ---------------------------------------------------------------------------
// Project folder lifecycle
// ---------------------------------------------------------------------------

/// Path a new project's folder will occupy (no I/O).
#[must_use]
pub fn project_folder_path(root: &Path, record: &ProjectRecord) -> PathBuf {
    compute_shard_path(root, &record.contract_no)
        .dir()
        .join(record.folder_name())
}

pub fn write_project_mirror(folder: &Path, record: &ProjectRecord) -> Result<()> {
    write_json(&folder.join(MIRROR_FILE_NAME), record)
}

pub fn read_project_mirror(folder: &Path) -> Result<ProjectRecord> {
    read_json(&folder.join(MIRROR_FILE_NAME))
}

/// Fail when the contract number already owns an entry in its shard directory.
///
/// A second folder with the same prefix would make every later resolution
/// ambiguous. A shard directory that does not exist yet claims nothing.
///
/// # Errors
/// - [`Error::Write`] with `EEXIST` naming the existing entry.
/// - [`Error::List`] when the shard directory exists but cannot be listed.
pub fn ensure_contract_unclaimed(root: &Path, contract_no: &str) -> Result<()> {
    let dir = compute_shard_path(root, contract_no).dir();
    let names = match read_dir_names(&dir) {
        Ok(names) => names,
        Err(err)
            if err
                .io_source()
                .is_some_and(|e| e.kind() == io::ErrorKind::NotFound) =>
        {
            return Ok(());
        }
        Err(err) => return Err(err),
    };
    match names
        .iter()
        .find(|name| name.to_string_lossy().starts_with(contract_no))
    {
        Some(existing) => Err(Error::write_op(
            dir.join(existing),
            "mkdir",
            io::Error::from(io::ErrorKind::AlreadyExists),
        )),
        None => Ok(()),
    }
}

/// Create the folder for a newly persisted project and write its mirror.
pub fn create_project_folder(root: &Path, record: &ProjectRecord) -> Result<PathBuf> {
    ensure_contract_unclaimed(root, &record.contract_no)?;
    let folder = project_folder_path(root, record);
    make_dir(&folder)?;
    write_project_mirror(&folder, record)?;
    tracing::info!(
        contract_no = %record.contract_no,
        folder = %folder.display(),
        "created project folder"
    );
    Ok(folder)
}

/// Rewrite the mirror of an existing project.
pub fn update_project_mirror(root: &Path, record: &ProjectRecord) -> Result<PathBuf> {
    let folder = resolve_project_folder(root, &record.contract_no)?;
    write_project_mirror(&folder, record)?;
    tracing::debug!(contract_no = %record.contract_no, "updated project mirror");
    Ok(folder)
}

/// Load the mirrored record of an existing project.
pub fn load_project(root: &Path, contract_no: &str) -> Result<ProjectRecord> {
    let folder = resolve_project_folder(root, contract_no)?;
    read_project_mirror(&folder)
}

/// Delete a project's folder and everything in it.
pub fn delete_project_folder(root: &Path, contract_no: &str) -> Result<PathBuf> {
    let folder = resolve_project_folder(root, contract_no)?;
    delete_dir(&folder)?;
    tracing::info!(contract_no, folder = %folder.display(), "deleted project folder");
    Ok(folder)
}

/// Start a new project from an existing one: the new folder receives the
/// source folder's directory tree with only its PDF files, plus a fresh mirror.
pub fn copy_project_folder(
    root: &Path,
    source_contract_no: &str,
    record: &ProjectRecord,
) -> Result<PathBuf> {
    if record.contract_no == source_contract_no {
        return Err(Error::InvalidArgument(format!(
            "project {source_contract_no} cannot be copied onto its own contract number"
        )));
    }
    let source = resolve_project_folder(root, source_contract_no)?;
    ensure_contract_unclaimed(root, &record.contract_no)?;
    let dest = project_folder_path(root, record);
    if project_folder_exists(&dest) {
        return Err(Error::write_op(
            &dest,
            "mkdir",
            io::Error::from(io::ErrorKind::AlreadyExists),
        ));
    }
    make_dir(&dest)?;
    let copied = copy_dir_filtered(&source, &dest, is_pdf)?;
    write_project_mirror(&dest, record)?;
    tracing::info!(
        from = %source.display(),
        to = %dest.display(),
        pdfs = copied,
        "copied project folder"
    );
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_shard_path_six_digit_contract() {
        let shard = compute_shard_path(Path::new("/vol"), "625301");
        assert_eq!(shard.shard4, "62xxxx");
        assert_eq!(shard.shard3, "625xxx");
        assert_eq!(shard.dir(), PathBuf::from("/vol/62xxxx/625xxx"));
    }

    #[test]
    fn test_shard_path_seven_digit_contract() {
        let shard = compute_shard_path(Path::new("/vol"), "1234567");
        assert_eq!(shard.shard4, "123xxxx");
        assert_eq!(shard.shard3, "1234xxx");
    }

    #[test]
    fn test_shard_path_short_contract_is_noop() {
        let shard = compute_shard_path(Path::new("/vol"), "12");
        assert_eq!(shard.shard4, "12");
        assert_eq!(shard.shard3, "12");
        assert_eq!(shard.dir(), PathBuf::from("/vol/12/12"));
    }

    #[test]
    fn test_shard_path_three_trailing_digits_only() {
        let shard = compute_shard_path(Path::new("/vol"), "AB-A123");
        assert_eq!(shard.shard4, "AB-A123");
        assert_eq!(shard.shard3, "AB-Axxx");
    }

    #[test]
    fn test_shard_path_ignores_non_ascii_digits() {
        let shard = compute_shard_path(Path::new("/vol"), "12\u{0663}\u{0664}\u{0665}\u{0666}");
        assert_eq!(shard.shard4, "12\u{0663}\u{0664}\u{0665}\u{0666}");
    }

    #[test]
    fn test_is_pdf_case_insensitive() {
        assert!(is_pdf(Path::new("a/b/DWG.PDF")));
        assert!(is_pdf(Path::new("x.pdf")));
        assert!(!is_pdf(Path::new("x.pdf.txt")));
        assert!(!is_pdf(Path::new("README")));
    }

    proptest! {
        #[test]
        fn prop_shard4_is_parent_of_shard3(prefix in "[0-9]{3,8}", tail in "[0-9]{4}") {
            let contract = format!("{prefix}{tail}");
            let shard = compute_shard_path(Path::new("/vol"), &contract);
            let stem = &contract[..contract.len() - 4];
            prop_assert_eq!(&shard.shard4, &format!("{stem}xxxx"));
            // shard3 keeps one more digit than shard4, so it refines it.
            prop_assert!(shard.shard3.starts_with(stem));
            prop_assert!(shard.shard3.ends_with("xxx"));
            prop_assert_eq!(shard.shard3.len(), shard.shard4.len());
            prop_assert!(contract.starts_with(&shard.shard3[..shard.shard3.len() - 3]));
        }

        #[test]
        fn prop_shard_computation_is_deterministic(contract in "\\PC{0,16}") {
            let a = compute_shard_path(Path::new("/vol"), &contract);
            let b = compute_shard_path(Path::new("/vol"), &contract);
            prop_assert_eq!(a, b);
        }
    }
}
