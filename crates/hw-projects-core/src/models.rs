//! Data models for HW project management
//!
//! Field names follow the JSON wire format of the project API (camelCase), which
//! is also the format of the `data.json` mirror kept in every project folder.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// =============================================================================
// Project
// =============================================================================

/// A project record as stored by the project API and mirrored locally.
///
/// # Constraints
/// - `contract_no`: unique, at least 6 digits, embedded in folder and file names.
/// - `customer_name`: already sanitized of filesystem-illegal characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub contract_no: String,
    pub customer_name: String,
    pub po_no: String,
    pub price: f64,
    pub currency: String,
    #[serde(default)]
    pub bookmarked: bool,
    #[serde(default)]
    pub completed: Option<String>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub user: String,
}

impl ProjectRecord {
    /// Name of the project folder: `"<contractNo> <customerName>"`.
    #[must_use]
    pub fn folder_name(&self) -> String {
        format!("{} {}", self.contract_no, self.customer_name)
    }

    /// Email subject line for this project.
    #[must_use]
    pub fn email_subject(&self) -> String {
        format!(
            "{} PO {} - HW {}",
            self.customer_name, self.po_no, self.contract_no
        )
    }
}

/// Input for a project that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub customer_name: String,
    pub contract_no: String,
    pub po_no: String,
    pub price: f64,
    pub currency: String,
}

impl NewProject {
    /// Validate and normalize the form input.
    ///
    /// The customer name is sanitized before the emptiness check, so a name
    /// made only of illegal characters is rejected.
    pub fn validate(mut self) -> Result<Self> {
        self.customer_name = sanitize_customer_name(&self.customer_name);
        if self.customer_name.is_empty() {
            return Err(Error::InvalidArgument(
                "customer name is empty after removing illegal characters".into(),
            ));
        }
        if !is_valid_contract_no(&self.contract_no) {
            return Err(Error::InvalidArgument(format!(
                "contract number {:?} must contain at least 6 digits",
                self.contract_no
            )));
        }
        if self.po_no.is_empty() {
            return Err(Error::InvalidArgument("PO number is required".into()));
        }
        if !is_valid_po_no(&self.po_no) {
            return Err(Error::InvalidArgument(format!(
                "PO number {:?} must not contain path separators or '..'",
                self.po_no
            )));
        }
        if self.currency.is_empty() {
            return Err(Error::InvalidArgument("currency is required".into()));
        }
        if self.price.is_nan() || self.price < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "price must be non-negative, got {}",
                self.price
            )));
        }
        Ok(self)
    }

    /// Turn validated input into a fresh record owned by `user`.
    #[must_use]
    pub fn into_record(self, user: &str, now: DateTime<Utc>) -> ProjectRecord {
        ProjectRecord {
            id: None,
            contract_no: self.contract_no,
            customer_name: self.customer_name,
            po_no: self.po_no,
            price: self.price,
            currency: self.currency,
            bookmarked: false,
            completed: None,
            created: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            released: None,
            user: user.to_string(),
        }
    }
}

fn illegal_name_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[.<>:"/\\|?*]"#).expect("valid regex"))
}

fn contract_no_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{6,}").expect("valid regex"))
}

/// Remove characters that are illegal in folder names: `. < > : " / \ | ? *`.
#[must_use]
pub fn sanitize_customer_name(value: &str) -> String {
    illegal_name_chars_re().replace_all(value, "").into_owned()
}

/// A contract number must contain a run of at least 6 digits.
#[must_use]
pub fn is_valid_contract_no(value: &str) -> bool {
    contract_no_re().is_match(value)
}

/// The PO number ends up in the draft file name, so it may not contain a path
/// separator or a `..` component.
#[must_use]
pub fn is_valid_po_no(value: &str) -> bool {
    !value.contains(['/', '\\']) && !value.contains("..")
}

// =============================================================================
// Email
// =============================================================================

/// Options chosen by the user when composing a project email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailOptions {
    pub customer_drawings: bool,
    pub order_change: bool,
    pub has_sheave: bool,
    #[serde(default)]
    pub changes: String,
}

// =============================================================================
// Report
// =============================================================================

/// Per-currency totals for a reporting week.
pub type CurrencyTotals = BTreeMap<String, f64>;

/// Projects released during one week, starting on `monday`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekReport {
    pub monday: String,
    pub projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub total: CurrencyTotals,
}

/// Weekly report returned by the project API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub this_week: WeekReport,
    pub last_week: WeekReport,
}
