//! PDF attachment selection and encoding.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hw_projects_core::{Error, Result};

use crate::part_delimiter;

/// What the user is asked to pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRequest {
    pub title: String,
    pub default_dir: PathBuf,
    pub filter_name: String,
    pub extensions: Vec<String>,
    pub multi_select: bool,
}

impl PickRequest {
    /// Multi-select of PDF files starting in `default_dir`.
    #[must_use]
    pub fn pdfs(default_dir: &Path) -> Self {
        Self {
            title: "Select PDF attachments".to_string(),
            default_dir: default_dir.to_path_buf(),
            filter_name: "PDF".to_string(),
            extensions: vec!["pdf".to_string()],
            multi_select: true,
        }
    }

    /// Whether `path` passes the extension filter.
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| {
            self.extensions
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
    }
}

/// Result of a file selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Canceled,
    Selected(Vec<PathBuf>),
}

/// Interactive file selection, e.g. an OS dialog or a terminal prompt.
pub trait FilePicker {
    fn pick(&self, request: &PickRequest) -> Result<Selection>;
}

/// Returns a selection fixed up front. An empty list behaves like a cancel.
#[derive(Debug, Clone, Default)]
pub struct PresetPicker {
    paths: Vec<PathBuf>,
}

impl PresetPicker {
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl FilePicker for PresetPicker {
    fn pick(&self, _request: &PickRequest) -> Result<Selection> {
        if self.paths.is_empty() {
            Ok(Selection::Canceled)
        } else {
            Ok(Selection::Selected(self.paths.clone()))
        }
    }
}

/// Terminal selection over the matching files in the request's default
/// directory. Answers are 1-based indices or paths separated by commas
/// (indices may also be separated by spaces), `all`, or an empty line to cancel.
pub struct PromptPicker<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl<R: BufRead, W: Write> PromptPicker<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    fn candidates(request: &PickRequest) -> Vec<PathBuf> {
        let names = match hw_projects_storage::read_dir_names(&request.default_dir) {
            Ok(names) => names,
            Err(err) => {
                tracing::warn!(error = %err, "cannot list default attachment directory");
                return Vec::new();
            }
        };
        let mut files: Vec<PathBuf> = names
            .into_iter()
            .map(|name| request.default_dir.join(name))
            .filter(|path| path.is_file() && request.accepts(path))
            .collect();
        files.sort();
        files
    }

    fn parse_answer(answer: &str, candidates: &[PathBuf], request: &PickRequest) -> Result<Selection> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(Selection::Canceled);
        }
        if answer.eq_ignore_ascii_case("all") {
            return Ok(Selection::Selected(candidates.to_vec()));
        }

        let mut picked = Vec::new();
        for token in answer.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let is_index_list = token
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_whitespace());
            if is_index_list {
                for index in token.split_whitespace() {
                    let path = index
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| candidates.get(i))
                        .ok_or_else(|| {
                            Error::InvalidArgument(format!("no file numbered {index}"))
                        })?;
                    picked.push(path.clone());
                }
            } else {
                picked.push(request.default_dir.join(token));
            }
        }
        Ok(Selection::Selected(picked))
    }
}

impl PromptPicker<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr, read the answer from stdin.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> FilePicker for PromptPicker<R, W> {
    fn pick(&self, request: &PickRequest) -> Result<Selection> {
        let candidates = Self::candidates(request);
        let prompt_failed = |e: io::Error| Error::Unknown(format!("attachment prompt failed: {e}"));

        let mut text = format!("{} ({})\n", request.title, request.default_dir.display());
        for (i, path) in candidates.iter().enumerate() {
            let name = path.file_name().unwrap_or(path.as_os_str());
            let _ = writeln!(text, "  {:>2}. {}", i + 1, name.to_string_lossy());
        }
        text.push_str("Numbers or paths, comma separated (\"all\" for every file, empty to cancel): ");
        {
            let mut out = self.output.borrow_mut();
            out.write_all(text.as_bytes()).map_err(prompt_failed)?;
            out.flush().map_err(prompt_failed)?;
        }

        let mut answer = String::new();
        self.input
            .borrow_mut()
            .read_line(&mut answer)
            .map_err(prompt_failed)?;
        Self::parse_answer(&answer, &candidates, request)
    }
}

/// Display name of the `index`-th (1-based) attachment, without extension.
#[must_use]
pub fn attachment_name(contract_no: &str, index: usize) -> String {
    format!("Customer {contract_no} dwgs {index}")
}

fn pdf_part(name: &str, base64_data: &str) -> String {
    format!(
        "{}\n\
         Content-Type: application/pdf; name={name}.pdf\n\
         Content-Transfer-Encoding: base64\n\
         Content-Disposition: attachment\n\n\
         {base64_data}\n",
        part_delimiter()
    )
}

/// Ask the picker for PDFs and frame each one as a base64 body part.
///
/// A canceled selection yields an empty string. Every selected file is read
/// even after a failure, but the first read error is the one returned and no
/// parts are kept.
pub fn collect_attachments(
    picker: &dyn FilePicker,
    contract_no: &str,
    default_dir: &Path,
) -> Result<String> {
    let request = PickRequest::pdfs(default_dir);
    let paths = match picker.pick(&request)? {
        Selection::Canceled => {
            tracing::debug!(contract_no, "attachment selection canceled");
            return Ok(String::new());
        }
        Selection::Selected(paths) => paths,
    };

    let mut parts = Vec::with_capacity(paths.len());
    let mut first_error = None;
    for (i, path) in paths.iter().enumerate() {
        match hw_projects_storage::read_bytes(path) {
            Ok(bytes) => {
                let name = attachment_name(contract_no, i + 1);
                parts.push(pdf_part(&name, &STANDARD.encode(bytes)));
            }
            Err(err) if first_error.is_none() => first_error = Some(err),
            Err(err) => tracing::warn!(error = %err, "additional attachment read failure"),
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }

    tracing::debug!(contract_no, count = parts.len(), "attachments encoded");
    Ok(parts.join("\n"))
}
