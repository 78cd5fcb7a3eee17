//! CLI commands for HW project folders
//!
//! The `hwp` binary exposes the library operations to a terminal or a script:
//! - Shard computation and project folder resolution
//! - Email draft composition with PDF attachments
//! - Local project folder lifecycle (create, update, copy, delete, show)
//! - User settings and effective configuration

#![forbid(unsafe_code)]

pub mod output;

use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use hw_projects_core::{Config, EmailOptions, ErrorInfo, NewProject, Settings, is_valid_po_no};
use hw_projects_mail::{Composer, FilePicker, PresetPicker, PromptPicker};
use serde_json::json;

use crate::output::{Report, key_values};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] hw_projects_core::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    #[must_use]
    pub fn info(&self) -> ErrorInfo {
        match self {
            Self::Core(err) => err.info(),
            Self::InvalidArgument(msg) => ErrorInfo::new("InvalidArgumentError", msg.clone()),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "hwp", version, about = "HW project folders and email drafts")]
pub struct Cli {
    /// Debug-level logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
    /// Print a JSON outcome document instead of text
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the shard directory for a contract number
    Shard { contract_no: String },
    /// Print the project folder for a contract number
    Resolve { contract_no: String },
    /// Write an email draft (.eml) into the project folder
    Email(EmailArgs),
    Project {
        #[command(subcommand)]
        action: ProjectCommand,
    },
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Show the effective configuration
    Config,
}

#[derive(Args, Debug)]
pub struct EmailArgs {
    pub contract_no: String,
    /// Attach customer drawings
    #[arg(long)]
    pub drawings: bool,
    #[arg(long)]
    pub order_change: bool,
    #[arg(long)]
    pub sheave: bool,
    /// Change lines, one per line
    #[arg(long, conflicts_with = "changes_file")]
    pub changes: Option<String>,
    #[arg(long, value_name = "PATH")]
    pub changes_file: Option<PathBuf>,
    /// PDF to attach (repeatable)
    #[arg(long = "attach", value_name = "PATH", conflicts_with = "prompt")]
    pub attach: Vec<PathBuf>,
    /// Choose attachments interactively
    #[arg(long)]
    pub prompt: bool,
    /// Print the message instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ProjectFields {
    #[arg(long)]
    pub contract_no: String,
    #[arg(long)]
    pub customer_name: String,
    #[arg(long)]
    pub po_no: String,
    #[arg(long)]
    pub price: f64,
    #[arg(long, default_value = "USD")]
    pub currency: String,
}

impl From<ProjectFields> for NewProject {
    fn from(fields: ProjectFields) -> Self {
        Self {
            customer_name: fields.customer_name,
            contract_no: fields.contract_no,
            po_no: fields.po_no,
            price: fields.price,
            currency: fields.currency,
        }
    }
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub contract_no: String,
    #[arg(long)]
    pub po_no: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub currency: Option<String>,
    #[arg(long)]
    pub bookmarked: Option<bool>,
    /// Completion timestamp; an empty value clears it
    #[arg(long)]
    pub completed: Option<String>,
    /// Release timestamp; an empty value clears it
    #[arg(long)]
    pub released: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Create the project folder and its data.json
    Create(ProjectFields),
    /// Rewrite fields of an existing project's data.json
    Update(UpdateArgs),
    /// Create a new project from an existing folder, keeping only PDFs
    Copy {
        source_contract_no: String,
        #[command(flatten)]
        fields: ProjectFields,
    },
    /// Remove the project folder
    Delete { contract_no: String },
    /// Print a project's data.json
    Show { contract_no: String },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    /// Create the settings file with defaults if missing
    Init,
    Set {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        server: Option<String>,
    },
}

pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[must_use]
pub fn run() -> i32 {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let result = Config::load()
        .map_err(CliError::from)
        .and_then(|mut config| execute(cli.command, &mut config));
    output::emit(cli.json, &result)
}

pub fn execute(command: Commands, config: &mut Config) -> CliResult<Report> {
    tracing::debug!(?command, root = %config.projects_root.display(), "running command");
    match command {
        Commands::Shard { contract_no } => {
            let shard = hw_projects_storage::compute_shard_path(&config.projects_root, &contract_no);
            Ok(Report::line(shard.dir().display().to_string()))
        }
        Commands::Resolve { contract_no } => {
            let folder = hw_projects_storage::resolve_project_folder(&config.projects_root, &contract_no)?;
            Ok(Report::line(folder.display().to_string()))
        }
        Commands::Email(args) => handle_email(args, config),
        Commands::Project { action } => handle_project(action, config),
        Commands::Settings { action } => handle_settings(action, config),
        Commands::Config => {
            let summary = config.summary();
            let data: serde_json::Map<String, serde_json::Value> = summary
                .iter()
                .map(|(k, v)| ((*k).to_string(), json!(v)))
                .collect();
            Report::new(&data, key_values(&summary))
        }
    }
}

fn email_options(args: &EmailArgs) -> CliResult<EmailOptions> {
    let changes = match (&args.changes, &args.changes_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => hw_projects_storage::read_text(path)?,
        (None, None) => String::new(),
    };
    Ok(EmailOptions {
        customer_drawings: args.drawings,
        order_change: args.order_change,
        has_sheave: args.sheave,
        changes,
    })
}

fn handle_email(args: EmailArgs, config: &Config) -> CliResult<Report> {
    if !args.drawings && (args.prompt || !args.attach.is_empty()) {
        return Err(CliError::InvalidArgument(
            "attachments require --drawings".to_string(),
        ));
    }
    let project = hw_projects_storage::load_project(&config.projects_root, &args.contract_no)?;
    let options = email_options(&args)?;

    let picker: Box<dyn FilePicker> = if args.prompt {
        Box::new(PromptPicker::stdio())
    } else {
        Box::new(PresetPicker::new(args.attach))
    };
    let composer = Composer::new(config, picker.as_ref());

    if args.dry_run {
        let message = composer.compose(&project, &options)?;
        let data = json!({
            "subject": message.subject,
            "fileName": message.file_name(),
            "path": message.path().display().to_string(),
            "text": message.text,
        });
        return Report::new(&data, message.text.clone());
    }
    let path = composer.compose_and_write(&project, &options)?;
    Ok(Report::line(path.display().to_string()))
}

fn handle_project(action: ProjectCommand, config: &Config) -> CliResult<Report> {
    let root = &config.projects_root;
    match action {
        ProjectCommand::Create(fields) => {
            let record = NewProject::from(fields)
                .validate()?
                .into_record(&config.user_email, Utc::now());
            let folder = hw_projects_storage::create_project_folder(root, &record)?;
            Ok(Report::line(folder.display().to_string()))
        }
        ProjectCommand::Copy {
            source_contract_no,
            fields,
        } => {
            let record = NewProject::from(fields)
                .validate()?
                .into_record(&config.user_email, Utc::now());
            let folder = hw_projects_storage::copy_project_folder(root, &source_contract_no, &record)?;
            Ok(Report::line(folder.display().to_string()))
        }
        ProjectCommand::Update(args) => {
            let mut record = hw_projects_storage::load_project(root, &args.contract_no)?;
            if let Some(po_no) = args.po_no {
                if po_no.is_empty() || !is_valid_po_no(&po_no) {
                    return Err(CliError::InvalidArgument(format!("invalid PO number {po_no:?}")));
                }
                record.po_no = po_no;
            }
            if let Some(price) = args.price {
                if price.is_nan() || price < 0.0 {
                    return Err(CliError::InvalidArgument(format!("invalid price {price}")));
                }
                record.price = price;
            }
            if let Some(currency) = args.currency {
                record.currency = currency;
            }
            if let Some(bookmarked) = args.bookmarked {
                record.bookmarked = bookmarked;
            }
            if let Some(completed) = args.completed {
                record.completed = Some(completed).filter(|v| !v.is_empty());
            }
            if let Some(released) = args.released {
                record.released = Some(released).filter(|v| !v.is_empty());
            }
            hw_projects_storage::update_project_mirror(root, &record)?;
            let text = serde_json::to_string_pretty(&record).map_err(hw_projects_core::Error::from)?;
            Report::new(&record, text)
        }
        ProjectCommand::Delete { contract_no } => {
            let folder = hw_projects_storage::delete_project_folder(root, &contract_no)?;
            Ok(Report::line(folder.display().to_string()))
        }
        ProjectCommand::Show { contract_no } => {
            let record = hw_projects_storage::load_project(root, &contract_no)?;
            let text = serde_json::to_string_pretty(&record).map_err(hw_projects_core::Error::from)?;
            Report::new(&record, text)
        }
    }
}

fn settings_report(settings: &Settings) -> CliResult<Report> {
    let shown = settings.for_display();
    let pairs = [
        ("firstName", shown.first_name.clone().unwrap_or_default()),
        ("lastName", shown.last_name.clone().unwrap_or_default()),
        ("email", shown.email.clone().unwrap_or_default()),
        ("server", shown.server.clone().unwrap_or_default()),
    ];
    Report::new(&shown, key_values(&pairs))
}

fn handle_settings(action: SettingsCommand, config: &mut Config) -> CliResult<Report> {
    match action {
        SettingsCommand::Show => settings_report(&config.settings()?),
        SettingsCommand::Init => {
            Settings::init(&config.settings_path)?;
            Ok(Report::line(config.settings_path.display().to_string()))
        }
        SettingsCommand::Set {
            first_name,
            last_name,
            email,
            server,
        } => {
            let mut settings = config.settings()?;
            if first_name.is_some() {
                settings.first_name = first_name;
            }
            if last_name.is_some() {
                settings.last_name = last_name;
            }
            if email.is_some() {
                settings.email = email;
            }
            if let Some(server) = server {
                settings.server = Some(server);
            }
            config.save_settings(&settings)?;
            settings_report(&settings)
        }
    }
}
