//! Assembling and writing the `.eml` draft.

use std::path::{Path, PathBuf};

use hw_projects_core::{Config, EmailOptions, Error, ProjectRecord, Result};

use crate::attachments::{FilePicker, collect_attachments};
use crate::templates::{CHANGES_PLACEHOLDER, TemplateStore, select_template};
use crate::{BOUNDARY, closing_delimiter, part_delimiter};

/// Header block, including the blank line that ends it.
#[must_use]
pub fn header(subject: &str) -> String {
    format!(
        "Subject: {subject}\n\
         X-Unsent: 1\n\
         Content-Type: multipart/mixed; boundary={BOUNDARY}\n\n"
    )
}

fn change_items(changes: &str) -> String {
    changes
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<li><span class=\"bold\">{line}</span></li>"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the HTML body part from template `file`.
///
/// Each non-blank line of `changes` becomes one list item, substituted for the
/// first `{changes}` token. Templates without the token are used verbatim.
pub fn render_body(store: &TemplateStore, file: &str, changes: &str) -> Result<String> {
    let template = store.read(file)?;
    let html = template.replacen(CHANGES_PLACEHOLDER, &change_items(changes), 1);
    Ok(format!(
        "{}\nContent-Type: text/html; charset=UTF-8\n\n{html}\n",
        part_delimiter()
    ))
}

/// A fully assembled draft that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub folder: PathBuf,
    pub subject: String,
    pub text: String,
}

impl ComposedMessage {
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.eml", self.subject)
    }

    /// Destination inside the project folder.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.folder.join(self.file_name())
    }
}

/// Builds email drafts for projects on one volume.
pub struct Composer<'a> {
    root: PathBuf,
    templates: TemplateStore,
    picker: &'a dyn FilePicker,
}

impl<'a> Composer<'a> {
    #[must_use]
    pub fn new(config: &Config, picker: &'a dyn FilePicker) -> Self {
        Self {
            root: config.projects_root.clone(),
            templates: TemplateStore::from_config(config),
            picker,
        }
    }

    #[must_use]
    pub fn with_templates(mut self, templates: TemplateStore) -> Self {
        self.templates = templates;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Assemble the draft in memory. Nothing is written.
    ///
    /// The picker is only consulted when `customer_drawings` is set, and only
    /// after the folder and the template have been resolved.
    ///
    /// # Errors
    /// - Folder resolution errors from [`hw_projects_storage::resolve_project_folder`]
    /// - [`Error::TemplateNotFound`] when no template matches the options
    /// - [`Error::Read`] for an unreadable template or attachment
    pub fn compose(&self, project: &ProjectRecord, options: &EmailOptions) -> Result<ComposedMessage> {
        let folder = hw_projects_storage::resolve_project_folder(&self.root, &project.contract_no)?;
        let subject = project.email_subject();

        let template = select_template(options).ok_or(Error::TemplateNotFound {
            drawings: options.customer_drawings,
            order_change: options.order_change,
            has_sheave: options.has_sheave,
        })?;
        let body = render_body(&self.templates, template.file, &options.changes)?;

        let attachments = if options.customer_drawings {
            collect_attachments(self.picker, &project.contract_no, &folder)?
        } else {
            String::new()
        };

        let mut text = header(&subject);
        text.push_str(&body);
        text.push_str(&attachments);
        text.push_str(&closing_delimiter());

        tracing::debug!(
            contract_no = %project.contract_no,
            template = template.file,
            bytes = text.len(),
            "composed email"
        );
        Ok(ComposedMessage {
            folder,
            subject,
            text,
        })
    }

    /// Compose and write `<subject>.eml` into the project folder, replacing an
    /// existing draft of the same name. Returns the written path.
    pub fn compose_and_write(&self, project: &ProjectRecord, options: &EmailOptions) -> Result<PathBuf> {
        let message = self.compose(project, options)?;
        let path = message.path();
        hw_projects_storage::write_text(&path, &message.text)?;
        tracing::info!(path = %path.display(), "email draft written");
        Ok(path)
    }
}
