//! Error types for HW project management
//!
//! Every fallible operation in the workspace returns [`Result`]; callers compose
//! with `?` and the first failing step's error reaches the caller unchanged.
//! At process boundaries the error is flattened into an [`ErrorInfo`] and
//! wrapped in an [`Outcome`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Result type alias for HW project operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for HW project operations
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Lookup Errors
    // ==========================================================================
    #[error("Couldn't list directory {}: {source}", path.display())]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Couldn't find folder starting with {0}")]
    FolderNotFound(String),

    #[error(
        "Email template not found (drawings: {drawings}, order change: {order_change}, sheave: {has_sheave})"
    )]
    TemplateNotFound {
        drawings: bool,
        order_change: bool,
        has_sheave: bool,
    },

    #[error("Multiple folders start with {prefix}: {}", matches.join(", "))]
    Ambiguous { prefix: String, matches: Vec<String> },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    #[error("Couldn't read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        syscall: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Couldn't write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        syscall: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ==========================================================================
    // Validation Errors
    // ==========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ==========================================================================
    // Collaborator Errors
    // ==========================================================================
    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    #[error("{0}")]
    Unknown(String),
}

impl Error {
    pub fn list(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::List {
            path: path.into(),
            source,
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            syscall: "open",
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            syscall: "open",
            source,
        }
    }

    /// A write-class failure raised by a syscall other than `open`
    /// (`mkdir`, `rm`, `copyfile`, `rename`).
    pub fn write_op(path: impl Into<PathBuf>, syscall: &'static str, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            syscall,
            source,
        }
    }

    /// Returns the error type string (for JSON responses)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::List { .. } => "ListError",
            Self::FolderNotFound(_) | Self::TemplateNotFound { .. } => "NotFoundError",
            Self::Ambiguous { .. } => "AmbiguousError",
            Self::Read { .. } => "ReadError",
            Self::Write { .. } => "WriteError",
            Self::Serialization(_) => "SerializationError",
            Self::InvalidArgument(_) => "InvalidArgumentError",
            Self::Api { .. } => "HTTPError",
            Self::Unknown(_) => "UnknownError",
        }
    }

    /// Returns whether the user can fix the cause and try again.
    ///
    /// Nothing in the workspace retries automatically; this only guides how a
    /// front end words the failure.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::List { .. }
                | Self::FolderNotFound(_)
                | Self::Ambiguous { .. }
                | Self::Read { .. }
                | Self::Write { .. }
                | Self::InvalidArgument(_)
                | Self::Api { .. }
        )
    }

    /// The underlying OS error, when the failure came from the filesystem.
    #[must_use]
    pub fn io_source(&self) -> Option<&io::Error> {
        match self {
            Self::List { source, .. } | Self::Read { source, .. } | Self::Write { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }

    /// Flatten into the structured wire error.
    ///
    /// Filesystem-class errors carry `code`, `errno`, `syscall` and `path`;
    /// everything else carries only `name` and `message`.
    #[must_use]
    pub fn info(&self) -> ErrorInfo {
        let mut info = ErrorInfo::new(self.error_type(), self.to_string());
        match self {
            Self::List { path, source } => info.with_os(source, "scandir", path),
            Self::Read {
                path,
                syscall,
                source,
            }
            | Self::Write {
                path,
                syscall,
                source,
            } => info.with_os(source, syscall, path),
            Self::Api {
                status: Some(status),
                ..
            } => {
                info.code = Some(status.to_string());
                info
            }
            _ => info,
        }
    }
}

/// Structured error as it crosses a process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syscall: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            code: None,
            errno: None,
            syscall: None,
            path: None,
        }
    }

    /// Normalize a value that is not a recognizable error into a minimal
    /// named error carrying its string form.
    #[must_use]
    pub fn unknown(value: impl fmt::Display) -> Self {
        Self::new("UnknownError", value.to_string())
    }

    /// Whether this error originated from a filesystem operation.
    #[must_use]
    pub const fn is_system_error(&self) -> bool {
        self.code.is_some() && self.syscall.is_some()
    }

    fn with_os(mut self, source: &io::Error, syscall: &str, path: &Path) -> Self {
        self.code = Some(io_error_code(source).to_string());
        self.errno = source.raw_os_error();
        self.syscall = Some(syscall.to_string());
        self.path = Some(path.display().to_string());
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl From<&Error> for ErrorInfo {
    fn from(err: &Error) -> Self {
        err.info()
    }
}

/// POSIX-style symbolic code for an I/O error.
#[must_use]
pub fn io_error_code(err: &io::Error) -> &'static str {
    match err.kind() {
        io::ErrorKind::NotFound => "ENOENT",
        io::ErrorKind::PermissionDenied => "EACCES",
        io::ErrorKind::AlreadyExists => "EEXIST",
        io::ErrorKind::NotADirectory => "ENOTDIR",
        io::ErrorKind::IsADirectory => "EISDIR",
        io::ErrorKind::DirectoryNotEmpty => "ENOTEMPTY",
        io::ErrorKind::ReadOnlyFilesystem => "EROFS",
        io::ErrorKind::StorageFull => "ENOSPC",
        io::ErrorKind::InvalidInput => "EINVAL",
        io::ErrorKind::TimedOut => "ETIMEDOUT",
        io::ErrorKind::Interrupted => "EINTR",
        io::ErrorKind::BrokenPipe => "EPIPE",
        io::ErrorKind::ConnectionRefused => "ECONNREFUSED",
        io::ErrorKind::ConnectionReset => "ECONNRESET",
        _ => "EIO",
    }
}

/// Tagged success/failure value: `{"success": true, "data": ..}` or
/// `{"success": false, "error": {..}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(ErrorInfo),
}

impl<T> Outcome<T> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn into_result(self) -> std::result::Result<T, ErrorInfo> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(info) => Err(info),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(err) => Self::Failure(err.info()),
        }
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Outcome", 2)?;
        match self {
            Self::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            Self::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}
