//! Email body templates.
//!
//! The four HTML bodies are embedded at compile time so the binary is
//! self-contained; a [`TemplateStore`] can instead read them from a directory.

use std::io;
use std::path::{Path, PathBuf};

use hw_projects_core::{Config, EmailOptions, Error, Result};
use include_dir::{Dir, include_dir};

static TEMPLATE_DIR: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Token replaced by the rendered change list.
pub const CHANGES_PLACEHOLDER: &str = "{changes}";

/// One row of the template table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub drawings: bool,
    pub order_change: bool,
    pub has_sheave: bool,
    pub file: &'static str,
}

/// Every template that exists. There is no row for `has_sheave = true`.
pub const TEMPLATES: [Template; 4] = [
    Template {
        drawings: true,
        order_change: true,
        has_sheave: false,
        file: "dwgs-changes.html",
    },
    Template {
        drawings: false,
        order_change: true,
        has_sheave: false,
        file: "no-dwgs-changes.html",
    },
    Template {
        drawings: true,
        order_change: false,
        has_sheave: false,
        file: "dwgs-no-changes.html",
    },
    Template {
        drawings: false,
        order_change: false,
        has_sheave: false,
        file: "no-dwgs-no-changes.html",
    },
];

/// Exact match of the option triple against [`TEMPLATES`].
#[must_use]
pub fn select_template(options: &EmailOptions) -> Option<&'static Template> {
    TEMPLATES.iter().find(|row| {
        row.drawings == options.customer_drawings
            && row.order_change == options.order_change
            && row.has_sheave == options.has_sheave
    })
}

/// Where template resources are read from, addressed by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TemplateStore {
    #[default]
    Embedded,
    Directory(PathBuf),
}

impl TemplateStore {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        config
            .templates_dir
            .clone()
            .map_or(Self::Embedded, Self::Directory)
    }

    /// Read a template by file name.
    ///
    /// # Errors
    /// [`Error::Read`] when the resource is missing or not valid UTF-8.
    pub fn read(&self, file: &str) -> Result<String> {
        match self {
            Self::Embedded => {
                let path = Path::new("templates").join(file);
                let entry = TEMPLATE_DIR
                    .get_file(file)
                    .ok_or_else(|| Error::read(&path, io::Error::from(io::ErrorKind::NotFound)))?;
                entry.contents_utf8().map(str::to_string).ok_or_else(|| {
                    Error::read(
                        &path,
                        io::Error::new(io::ErrorKind::InvalidData, "template is not UTF-8"),
                    )
                })
            }
            Self::Directory(dir) => hw_projects_storage::read_text(&dir.join(file)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(drawings: bool, order_change: bool, has_sheave: bool) -> EmailOptions {
        EmailOptions {
            customer_drawings: drawings,
            order_change,
            has_sheave,
            changes: String::new(),
        }
    }

    #[test]
    fn test_every_sheave_free_triple_selects_its_own_template() {
        let cases = [
            ((true, true), "dwgs-changes.html"),
            ((false, true), "no-dwgs-changes.html"),
            ((true, false), "dwgs-no-changes.html"),
            ((false, false), "no-dwgs-no-changes.html"),
        ];
        for ((drawings, change), file) in cases {
            let row = select_template(&options(drawings, change, false)).unwrap();
            assert_eq!(row.file, file);
        }
    }

    #[test]
    fn test_sheave_has_no_template() {
        for drawings in [true, false] {
            for change in [true, false] {
                assert!(select_template(&options(drawings, change, true)).is_none());
            }
        }
    }

    #[test]
    fn test_all_table_rows_are_embedded() {
        let store = TemplateStore::Embedded;
        for row in &TEMPLATES {
            let html = store.read(row.file).unwrap();
            assert!(html.contains("<html>"), "{} is not HTML", row.file);
            assert!(html.ends_with('\n'));
            // Only the order-change bodies carry a change list.
            assert_eq!(html.contains(CHANGES_PLACEHOLDER), row.order_change, "{}", row.file);
        }
    }

    #[test]
    fn test_missing_embedded_template_is_read_error() {
        let err = TemplateStore::Embedded.read("sheave.html").unwrap_err();
        assert_eq!(err.error_type(), "ReadError");
        assert_eq!(err.info().code.as_deref(), Some("ENOENT"));
    }

    #[test]
    fn test_directory_store_reads_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("dwgs-changes.html"), "<p>{changes}</p>\n").unwrap();
        let store = TemplateStore::Directory(tmp.path().to_path_buf());
        assert_eq!(store.read("dwgs-changes.html").unwrap(), "<p>{changes}</p>\n");
        assert_eq!(
            store.read("no-dwgs-changes.html").unwrap_err().error_type(),
            "ReadError"
        );
    }

    #[test]
    fn test_store_follows_config() {
        let mut config = Config::default();
        assert_eq!(TemplateStore::from_config(&config), TemplateStore::Embedded);
        config.templates_dir = Some(PathBuf::from("/opt/t"));
        assert_eq!(
            TemplateStore::from_config(&config),
            TemplateStore::Directory(PathBuf::from("/opt/t"))
        );
    }
}
