//! Sled-backed project repository
//!
//! One named tree per record type, keyed by record id (drilling logs by
//! well id), JSON values.

use std::path::Path;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Tree;

use super::repository::{ProjectRepository, StorageError};
use crate::types::{Bha, DrillingLog, DrillingParameters, Project, Survey, Well};

const PROJECTS_TREE: &str = "projects";
const WELLS_TREE: &str = "wells";
const SURVEYS_TREE: &str = "surveys";
const BHAS_TREE: &str = "bhas";
const DRILLING_LOGS_TREE: &str = "drilling_logs";

/// Durable repository over an embedded sled database.
pub struct SledRepository {
    db: sled::Db,
    projects: Tree,
    wells: Tree,
    surveys: Tree,
    bhas: Tree,
    drilling_logs: Tree,
    /// Serialises read-modify-write sequences that span trees
    write_lock: Mutex<()>,
}

impl SledRepository {
    /// Open or create the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let db = sled::open(path)?;
        tracing::info!(path = %path.display(), "Project database opened");
        Self::from_db(db)
    }

    /// Throwaway database that is removed when dropped.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            projects: db.open_tree(PROJECTS_TREE)?,
            wells: db.open_tree(WELLS_TREE)?,
            surveys: db.open_tree(SURVEYS_TREE)?,
            bhas: db.open_tree(BHAS_TREE)?,
            drilling_logs: db.open_tree(DRILLING_LOGS_TREE)?,
            db,
            write_lock: Mutex::new(()),
        })
    }

    /// Flush dirty buffers to disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StorageError> {
        self.write_lock
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))
    }
}

// ============================================================================
// Tree helpers
// ============================================================================

fn put<T: Serialize>(tree: &Tree, key: &str, value: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(value)?;
    tree.insert(key, bytes)?;
    Ok(())
}

fn fetch<T: DeserializeOwned>(tree: &Tree, key: &str) -> Result<Option<T>, StorageError> {
    match tree.get(key)? {
        Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
        None => Ok(None),
    }
}

fn require<T: DeserializeOwned>(tree: &Tree, kind: &'static str, key: &str) -> Result<T, StorageError> {
    fetch(tree, key)?.ok_or_else(|| StorageError::not_found(kind, key))
}

/// Deserialize every record matching `keep`, skipping unreadable entries.
fn scan<T, F>(tree: &Tree, keep: F) -> Result<Vec<T>, StorageError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let mut out = Vec::new();
    for item in tree.iter() {
        let (key, value) = item?;
        match serde_json::from_slice::<T>(&value) {
            Ok(record) if keep(&record) => out.push(record),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(key = %String::from_utf8_lossy(&key), error = %e, "Skipping unreadable record");
            }
        }
    }
    Ok(out)
}

fn ensure_exists(tree: &Tree, kind: &'static str, key: &str) -> Result<(), StorageError> {
    if tree.contains_key(key)? {
        Ok(())
    } else {
        Err(StorageError::not_found(kind, key))
    }
}

impl SledRepository {
    /// Remove a well and everything hanging off it. Caller holds the lock.
    fn purge_well(&self, well_id: &str) -> Result<(), StorageError> {
        for survey in scan::<Survey, _>(&self.surveys, |s| s.well_id == well_id)? {
            self.surveys.remove(survey.survey_id.as_str())?;
        }
        for bha in scan::<Bha, _>(&self.bhas, |b| b.well_id == well_id)? {
            self.bhas.remove(bha.bha_id.as_str())?;
        }
        self.drilling_logs.remove(well_id)?;
        self.wells.remove(well_id)?;
        Ok(())
    }
}

impl ProjectRepository for SledRepository {
    fn create_project(&self, project: &Project) -> Result<(), StorageError> {
        project.validate()?;
        let _guard = self.lock()?;
        if self.projects.contains_key(project.project_id.as_str())? {
            return Err(StorageError::Conflict(format!(
                "project {} already exists",
                project.project_id
            )));
        }
        put(&self.projects, &project.project_id, project)?;
        tracing::debug!(project_id = %project.project_id, name = %project.name, "Project created");
        Ok(())
    }

    fn get_project(&self, project_id: &str) -> Result<Project, StorageError> {
        require(&self.projects, "project", project_id)
    }

    fn list_projects(&self) -> Result<Vec<Project>, StorageError> {
        let mut projects: Vec<Project> = scan(&self.projects, |_| true)?;
        projects.sort_by_key(|p| p.created_date);
        Ok(projects)
    }

    fn update_project(&self, project: &Project) -> Result<(), StorageError> {
        project.validate()?;
        let _guard = self.lock()?;
        ensure_exists(&self.projects, "project", &project.project_id)?;
        put(&self.projects, &project.project_id, project)
    }

    fn delete_project(&self, project_id: &str) -> Result<(), StorageError> {
        let _guard = self.lock()?;
        let project: Project = require(&self.projects, "project", project_id)?;
        for well_id in &project.well_ids {
            self.purge_well(well_id)?;
        }
        self.projects.remove(project_id)?;
        tracing::info!(project_id, wells = project.well_ids.len(), "Project deleted");
        Ok(())
    }

    fn create_well(&self, project_id: &str, well: &Well) -> Result<(), StorageError> {
        well.validate()?;
        let _guard = self.lock()?;
        let mut project: Project = require(&self.projects, "project", project_id)?;
        if self.wells.contains_key(well.well_id.as_str())? {
            return Err(StorageError::Conflict(format!(
                "well {} already exists",
                well.well_id
            )));
        }
        put(&self.wells, &well.well_id, well)?;
        project.add_well(&well.well_id);
        put(&self.projects, project_id, &project)?;
        tracing::debug!(project_id, well_id = %well.well_id, "Well created");
        Ok(())
    }

    fn get_well(&self, well_id: &str) -> Result<Well, StorageError> {
        require(&self.wells, "well", well_id)
    }

    fn list_wells(&self, project_id: &str) -> Result<Vec<Well>, StorageError> {
        let project = self.get_project(project_id)?;
        let mut wells = Vec::with_capacity(project.well_ids.len());
        for id in &project.well_ids {
            if let Some(well) = fetch(&self.wells, id)? {
                wells.push(well);
            }
        }
        Ok(wells)
    }

    fn update_well(&self, well: &Well) -> Result<(), StorageError> {
        well.validate()?;
        let _guard = self.lock()?;
        ensure_exists(&self.wells, "well", &well.well_id)?;
        put(&self.wells, &well.well_id, well)
    }

    fn delete_well(&self, well_id: &str) -> Result<(), StorageError> {
        let _guard = self.lock()?;
        ensure_exists(&self.wells, "well", well_id)?;
        self.purge_well(well_id)?;
        for mut project in scan::<Project, _>(&self.projects, |p| p.well_ids.iter().any(|w| w == well_id))? {
            project.remove_well(well_id);
            put(&self.projects, &project.project_id, &project)?;
        }
        tracing::info!(well_id, "Well deleted");
        Ok(())
    }

    fn save_survey(&self, survey: &Survey) -> Result<(), StorageError> {
        survey.validate()?;
        let _guard = self.lock()?;
        ensure_exists(&self.wells, "well", &survey.well_id)?;
        put(&self.surveys, &survey.survey_id, survey)
    }

    fn get_survey(&self, survey_id: &str) -> Result<Survey, StorageError> {
        require(&self.surveys, "survey", survey_id)
    }

    fn list_surveys(&self, well_id: &str) -> Result<Vec<Survey>, StorageError> {
        ensure_exists(&self.wells, "well", well_id)?;
        let mut surveys: Vec<Survey> = scan(&self.surveys, |s: &Survey| s.well_id == well_id)?;
        surveys.sort_by_key(|s| s.created_date);
        Ok(surveys)
    }

    fn delete_survey(&self, survey_id: &str) -> Result<(), StorageError> {
        match self.surveys.remove(survey_id)? {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found("survey", survey_id)),
        }
    }

    fn save_bha(&self, bha: &Bha) -> Result<(), StorageError> {
        bha.validate()?;
        let _guard = self.lock()?;
        ensure_exists(&self.wells, "well", &bha.well_id)?;
        put(&self.bhas, &bha.bha_id, bha)
    }

    fn get_bha(&self, bha_id: &str) -> Result<Bha, StorageError> {
        let mut bha: Bha = require(&self.bhas, "bha", bha_id)?;
        bha.sort_components();
        Ok(bha)
    }

    fn list_bhas(&self, well_id: &str) -> Result<Vec<Bha>, StorageError> {
        ensure_exists(&self.wells, "well", well_id)?;
        let mut bhas: Vec<Bha> = scan(&self.bhas, |b: &Bha| b.well_id == well_id)?;
        bhas.sort_by_key(|b| b.created_date);
        for bha in &mut bhas {
            bha.sort_components();
        }
        Ok(bhas)
    }

    fn delete_bha(&self, bha_id: &str) -> Result<(), StorageError> {
        match self.bhas.remove(bha_id)? {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found("bha", bha_id)),
        }
    }

    fn get_drilling_log(&self, well_id: &str) -> Result<Option<DrillingLog>, StorageError> {
        ensure_exists(&self.wells, "well", well_id)?;
        fetch(&self.drilling_logs, well_id)
    }

    fn save_drilling_log(&self, log: &DrillingLog) -> Result<(), StorageError> {
        for entry in &log.entries {
            entry.validate()?;
        }
        let _guard = self.lock()?;
        ensure_exists(&self.wells, "well", &log.well_id)?;
        put(&self.drilling_logs, &log.well_id, log)
    }

    fn append_parameters(
        &self,
        well_id: &str,
        params: DrillingParameters,
    ) -> Result<DrillingLog, StorageError> {
        params.validate()?;
        let _guard = self.lock()?;
        let mut log = match fetch::<DrillingLog>(&self.drilling_logs, well_id)? {
            Some(log) => log,
            None => {
                let well: Well = require(&self.wells, "well", well_id)?;
                DrillingLog::new(well_id, well.unit_system)
            }
        };
        log.push(params);
        put(&self.drilling_logs, well_id, &log)?;
        Ok(log)
    }

    fn backend_name(&self) -> &'static str {
        "sled"
    }
}
