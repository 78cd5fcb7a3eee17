//! CLI output: human text or a JSON `Outcome` document.
//!
//! - **JSON mode** (`--json`): every command, successful or not, prints one
//!   pretty-printed `{"success": .., "data" | "error": ..}` document on stdout.
//! - **Text mode**: the command's human rendering on stdout; failures print
//!   `name: message` on stderr (red on a TTY).

#![forbid(unsafe_code)]

use std::io::IsTerminal;

use hw_projects_core::{ErrorInfo, Outcome};
use serde::Serialize;
use serde_json::Value;

use crate::CliResult;

/// Detect whether stderr is a TTY.
#[must_use]
pub fn is_tty() -> bool {
    std::io::stderr().is_terminal()
}

/// What a command produced: structured data for `--json` and its text form.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub data: Value,
    pub text: String,
}

impl Report {
    /// Build a report whose text is rendered separately from the data.
    pub fn new<T: Serialize>(data: &T, text: impl Into<String>) -> CliResult<Self> {
        let data = serde_json::to_value(data).map_err(hw_projects_core::Error::from)?;
        Ok(Self {
            data,
            text: text.into(),
        })
    }

    /// A single path or value, printed as-is and serialized as a string.
    #[must_use]
    pub fn line(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            data: Value::String(value.clone()),
            text: value,
        }
    }
}

// ── Key/value output ─────────────────────────────────────────────────────

/// Render pairs with the values aligned one column past the longest key.
#[must_use]
pub fn key_values<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.as_ref().len()).max().unwrap_or(0);
    let mut out = String::new();
    for (key, value) in pairs {
        out.push_str(&format!("{:<width$}  {}\n", key.as_ref(), value.as_ref()));
    }
    out
}

// ── Outcome ──────────────────────────────────────────────────────────────

/// Convert a command result to the wire shape.
#[must_use]
pub fn outcome(result: &CliResult<Report>) -> Outcome<&Value> {
    match result {
        Ok(report) => Outcome::Success(&report.data),
        Err(err) => Outcome::Failure(err.info()),
    }
}

/// Text written to stderr for a failure in text mode.
#[must_use]
pub fn error_line(info: &ErrorInfo, tty: bool) -> String {
    if tty {
        format!("\x1b[31m{}\x1b[0m: {}", info.name, info.message)
    } else {
        info.to_string()
    }
}

/// Print the result in the selected mode and return the process exit code.
#[must_use]
pub fn emit(json_mode: bool, result: &CliResult<Report>) -> i32 {
    let code = i32::from(result.is_err());
    if json_mode {
        let doc = serde_json::to_string_pretty(&outcome(result)).unwrap_or_default();
        println!("{doc}");
        return code;
    }
    match result {
        Ok(report) => {
            let text = report.text.trim_end_matches('\n');
            if !text.is_empty() {
                println!("{text}");
            }
        }
        Err(err) => eprintln!("{}", error_line(&err.info(), is_tty())),
    }
    code
}
