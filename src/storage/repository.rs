//! ProjectRepository trait: pluggable storage backend
//!
//! Abstracts project, well, survey, BHA and drilling-log persistence so the
//! API and CLI work unchanged against either backend:
//! - `SledRepository`: durable, embedded sled database
//! - `InMemoryRepository`: RwLock-backed store for tests and ephemeral runs

use crate::types::{Bha, DrillingLog, DrillingParameters, ModelError, Project, Survey, Well};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid {0}")]
    Invalid(#[from] ModelError),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("invalid backup: {0}")]
    InvalidBackup(String),
}

impl StorageError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<zip::result::ZipError> for StorageError {
    fn from(err: zip::result::ZipError) -> Self {
        StorageError::Archive(err.to_string())
    }
}

/// Trait for pluggable persistence backends
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across request handlers. Models are validated before they are written.
pub trait ProjectRepository: Send + Sync {
    // ---- Projects ----

    /// Store a new project. Fails with `Conflict` if the id is taken.
    fn create_project(&self, project: &Project) -> Result<(), StorageError>;

    fn get_project(&self, project_id: &str) -> Result<Project, StorageError>;

    /// All projects, oldest first.
    fn list_projects(&self) -> Result<Vec<Project>, StorageError>;

    /// Replace an existing project.
    fn update_project(&self, project: &Project) -> Result<(), StorageError>;

    /// Delete a project together with all of its wells.
    fn delete_project(&self, project_id: &str) -> Result<(), StorageError>;

    // ---- Wells ----

    /// Store a new well and register it on its project.
    fn create_well(&self, project_id: &str, well: &Well) -> Result<(), StorageError>;

    fn get_well(&self, well_id: &str) -> Result<Well, StorageError>;

    /// Wells registered on a project, in registration order.
    fn list_wells(&self, project_id: &str) -> Result<Vec<Well>, StorageError>;

    fn update_well(&self, well: &Well) -> Result<(), StorageError>;

    /// Delete a well with its surveys, BHAs and drilling log, and
    /// unregister it from every project.
    fn delete_well(&self, well_id: &str) -> Result<(), StorageError>;

    // ---- Surveys ----

    /// Insert or replace a survey. The owning well must exist.
    fn save_survey(&self, survey: &Survey) -> Result<(), StorageError>;

    fn get_survey(&self, survey_id: &str) -> Result<Survey, StorageError>;

    /// Surveys for a well, oldest first.
    fn list_surveys(&self, well_id: &str) -> Result<Vec<Survey>, StorageError>;

    fn delete_survey(&self, survey_id: &str) -> Result<(), StorageError>;

    // ---- BHAs ----

    /// Insert or replace a BHA. The owning well must exist.
    fn save_bha(&self, bha: &Bha) -> Result<(), StorageError>;

    fn get_bha(&self, bha_id: &str) -> Result<Bha, StorageError>;

    /// BHAs for a well, oldest first.
    fn list_bhas(&self, well_id: &str) -> Result<Vec<Bha>, StorageError>;

    fn delete_bha(&self, bha_id: &str) -> Result<(), StorageError>;

    // ---- Drilling parameters ----

    fn get_drilling_log(&self, well_id: &str) -> Result<Option<DrillingLog>, StorageError>;

    /// Insert or replace the drilling log of a well. The well must exist.
    fn save_drilling_log(&self, log: &DrillingLog) -> Result<(), StorageError>;

    /// Append one parameter record, creating the log on first use with
    /// the well's unit system. The read and write happen as one step, so
    /// concurrent appends to the same well never drop a record.
    fn append_parameters(
        &self,
        well_id: &str,
        params: DrillingParameters,
    ) -> Result<DrillingLog, StorageError>;

    /// Backend name for logging and `/health`
    fn backend_name(&self) -> &'static str;
}
