//! Project email composition.
//!
//! Builds one multipart `.eml` draft per request: a header block, exactly one
//! HTML part rendered from a fixed template, zero or more base64 PDF parts, and
//! the closing boundary marker. The draft is assembled in memory and written
//! once into the project folder.

#![forbid(unsafe_code)]

pub mod attachments;
pub mod compose;
pub mod templates;

pub use attachments::{
    FilePicker, PickRequest, PresetPicker, PromptPicker, Selection, attachment_name,
    collect_attachments,
};
pub use compose::{ComposedMessage, Composer, header, render_body};
pub use templates::{TEMPLATES, Template, TemplateStore, select_template};

/// Boundary parameter of the multipart content type.
pub const BOUNDARY: &str = "--boundary_area_0";

/// Line that opens every body part: `--` followed by [`BOUNDARY`].
#[must_use]
pub fn part_delimiter() -> String {
    format!("--{BOUNDARY}")
}

/// Line that terminates the message.
#[must_use]
pub fn closing_delimiter() -> String {
    format!("--{BOUNDARY}--")
}
