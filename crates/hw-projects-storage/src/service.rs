//! Keeps the project API and the local folder mirrors in step.
//!
//! Every mutation goes to the API first; the local folder is touched only after
//! the API accepted the change, and the refreshed project list is returned only
//! after both succeeded. A caller must not report success before it holds that
//! list.

use chrono::Utc;
use hw_projects_core::{Config, Error, NewProject, ProjectRecord, ProjectReport, Result};

/// The remote project API, keyed by contract number.
///
/// Transport, authentication and retries belong to the implementation.
pub trait ProjectApi {
    fn list_projects(&self, user: &str) -> Result<Vec<ProjectRecord>>;
    fn create_project(&self, record: &ProjectRecord) -> Result<()>;
    fn update_project(&self, record: &ProjectRecord) -> Result<()>;
    fn delete_project(&self, contract_no: &str) -> Result<()>;
    fn report(&self) -> Result<ProjectReport>;
}

impl<A: ProjectApi + ?Sized> ProjectApi for &A {
    fn list_projects(&self, user: &str) -> Result<Vec<ProjectRecord>> {
        (**self).list_projects(user)
    }
    fn create_project(&self, record: &ProjectRecord) -> Result<()> {
        (**self).create_project(record)
    }
    fn update_project(&self, record: &ProjectRecord) -> Result<()> {
        (**self).update_project(record)
    }
    fn delete_project(&self, contract_no: &str) -> Result<()> {
        (**self).delete_project(contract_no)
    }
    fn report(&self) -> Result<ProjectReport> {
        (**self).report()
    }
}

pub struct ProjectService<'a, A> {
    config: &'a Config,
    api: A,
}

impl<'a, A: ProjectApi> ProjectService<'a, A> {
    pub const fn new(config: &'a Config, api: A) -> Self {
        Self { config, api }
    }

    /// Projects owned by the configured user.
    pub fn list(&self) -> Result<Vec<ProjectRecord>> {
        self.api.list_projects(&self.config.user_email)
    }

    pub fn report(&self) -> Result<ProjectReport> {
        self.api.report()
    }

    /// Register a new project, then create its folder and mirror. A contract
    /// number that already owns a folder is refused before the API is called.
    pub fn create(&self, project: NewProject) -> Result<Vec<ProjectRecord>> {
        let record = project
            .validate()?
            .into_record(&self.config.user_email, Utc::now());
        crate::ensure_contract_unclaimed(&self.config.projects_root, &record.contract_no)?;
        self.api.create_project(&record)?;
        crate::create_project_folder(&self.config.projects_root, &record)?;
        self.list()
    }

    /// Register a new project seeded with the PDFs of an existing one.
    ///
    /// The source must resolve and the new contract number must be free before
    /// the API is called.
    pub fn copy(&self, source_contract_no: &str, project: NewProject) -> Result<Vec<ProjectRecord>> {
        let record = project
            .validate()?
            .into_record(&self.config.user_email, Utc::now());
        if record.contract_no == source_contract_no {
            return Err(Error::InvalidArgument(format!(
                "project {source_contract_no} cannot be copied onto its own contract number"
            )));
        }
        crate::resolve_project_folder(&self.config.projects_root, source_contract_no)?;
        crate::ensure_contract_unclaimed(&self.config.projects_root, &record.contract_no)?;
        self.api.create_project(&record)?;
        crate::copy_project_folder(&self.config.projects_root, source_contract_no, &record)?;
        self.list()
    }

    pub fn update(&self, record: &ProjectRecord) -> Result<Vec<ProjectRecord>> {
        self.api.update_project(record)?;
        crate::update_project_mirror(&self.config.projects_root, record)?;
        self.list()
    }

    pub fn delete(&self, contract_no: &str) -> Result<Vec<ProjectRecord>> {
        self.api.delete_project(contract_no)?;
        crate::delete_project_folder(&self.config.projects_root, contract_no)?;
        self.list()
    }
}
