//! In-memory project repository for testing and ephemeral deployments
//!
//! Thread-safe via `RwLock`. Not durable: data is lost on restart.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::repository::{ProjectRepository, StorageError};
use crate::types::{Bha, DrillingLog, DrillingParameters, Project, Survey, Well};

#[derive(Default)]
struct Store {
    projects: HashMap<String, Project>,
    wells: HashMap<String, Well>,
    surveys: HashMap<String, Survey>,
    bhas: HashMap<String, Bha>,
    drilling_logs: HashMap<String, DrillingLog>,
}

impl Store {
    fn require_well(&self, well_id: &str) -> Result<&Well, StorageError> {
        self.wells
            .get(well_id)
            .ok_or_else(|| StorageError::not_found("well", well_id))
    }

    fn purge_well(&mut self, well_id: &str) {
        self.surveys.retain(|_, s| s.well_id != well_id);
        self.bhas.retain(|_, b| b.well_id != well_id);
        self.drilling_logs.remove(well_id);
        self.wells.remove(well_id);
    }
}

#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store>, StorageError> {
        self.store
            .read()
            .map_err(|e| StorageError::Database(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Store>, StorageError> {
        self.store
            .write()
            .map_err(|e| StorageError::Database(e.to_string()))
    }
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl FnMut(&T) -> K) -> Vec<T> {
    items.sort_by_key(key);
    items
}

impl ProjectRepository for InMemoryRepository {
    fn create_project(&self, project: &Project) -> Result<(), StorageError> {
        project.validate()?;
        let mut store = self.write()?;
        if store.projects.contains_key(&project.project_id) {
            return Err(StorageError::Conflict(format!(
                "project {} already exists",
                project.project_id
            )));
        }
        store.projects.insert(project.project_id.clone(), project.clone());
        Ok(())
    }

    fn get_project(&self, project_id: &str) -> Result<Project, StorageError> {
        self.read()?
            .projects
            .get(project_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("project", project_id))
    }

    fn list_projects(&self) -> Result<Vec<Project>, StorageError> {
        let projects = self.read()?.projects.values().cloned().collect();
        Ok(sorted_by(projects, |p: &Project| p.created_date))
    }

    fn update_project(&self, project: &Project) -> Result<(), StorageError> {
        project.validate()?;
        let mut store = self.write()?;
        match store.projects.get_mut(&project.project_id) {
            Some(existing) => {
                *existing = project.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("project", &project.project_id)),
        }
    }

    fn delete_project(&self, project_id: &str) -> Result<(), StorageError> {
        let mut store = self.write()?;
        let project = store
            .projects
            .remove(project_id)
            .ok_or_else(|| StorageError::not_found("project", project_id))?;
        for well_id in &project.well_ids {
            store.purge_well(well_id);
        }
        Ok(())
    }

    fn create_well(&self, project_id: &str, well: &Well) -> Result<(), StorageError> {
        well.validate()?;
        let mut store = self.write()?;
        if !store.projects.contains_key(project_id) {
            return Err(StorageError::not_found("project", project_id));
        }
        if store.wells.contains_key(&well.well_id) {
            return Err(StorageError::Conflict(format!(
                "well {} already exists",
                well.well_id
            )));
        }
        store.wells.insert(well.well_id.clone(), well.clone());
        if let Some(project) = store.projects.get_mut(project_id) {
            project.add_well(&well.well_id);
        }
        Ok(())
    }

    fn get_well(&self, well_id: &str) -> Result<Well, StorageError> {
        self.read()?.require_well(well_id).cloned()
    }

    fn list_wells(&self, project_id: &str) -> Result<Vec<Well>, StorageError> {
        let store = self.read()?;
        let project = store
            .projects
            .get(project_id)
            .ok_or_else(|| StorageError::not_found("project", project_id))?;
        Ok(project
            .well_ids
            .iter()
            .filter_map(|id| store.wells.get(id).cloned())
            .collect())
    }

    fn update_well(&self, well: &Well) -> Result<(), StorageError> {
        well.validate()?;
        let mut store = self.write()?;
        match store.wells.get_mut(&well.well_id) {
            Some(existing) => {
                *existing = well.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("well", &well.well_id)),
        }
    }

    fn delete_well(&self, well_id: &str) -> Result<(), StorageError> {
        let mut store = self.write()?;
        store.require_well(well_id)?;
        store.purge_well(well_id);
        for project in store.projects.values_mut() {
            if project.well_ids.iter().any(|w| w == well_id) {
                project.remove_well(well_id);
            }
        }
        Ok(())
    }

    fn save_survey(&self, survey: &Survey) -> Result<(), StorageError> {
        survey.validate()?;
        let mut store = self.write()?;
        store.require_well(&survey.well_id)?;
        store.surveys.insert(survey.survey_id.clone(), survey.clone());
        Ok(())
    }

    fn get_survey(&self, survey_id: &str) -> Result<Survey, StorageError> {
        self.read()?
            .surveys
            .get(survey_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("survey", survey_id))
    }

    fn list_surveys(&self, well_id: &str) -> Result<Vec<Survey>, StorageError> {
        let store = self.read()?;
        store.require_well(well_id)?;
        let surveys = store
            .surveys
            .values()
            .filter(|s| s.well_id == well_id)
            .cloned()
            .collect();
        Ok(sorted_by(surveys, |s: &Survey| s.created_date))
    }

    fn delete_survey(&self, survey_id: &str) -> Result<(), StorageError> {
        self.write()?
            .surveys
            .remove(survey_id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found("survey", survey_id))
    }

    fn save_bha(&self, bha: &Bha) -> Result<(), StorageError> {
        bha.validate()?;
        let mut store = self.write()?;
        store.require_well(&bha.well_id)?;
        store.bhas.insert(bha.bha_id.clone(), bha.clone());
        Ok(())
    }

    fn get_bha(&self, bha_id: &str) -> Result<Bha, StorageError> {
        let mut bha = self
            .read()?
            .bhas
            .get(bha_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("bha", bha_id))?;
        bha.sort_components();
        Ok(bha)
    }

    fn list_bhas(&self, well_id: &str) -> Result<Vec<Bha>, StorageError> {
        let store = self.read()?;
        store.require_well(well_id)?;
        let bhas = store
            .bhas
            .values()
            .filter(|b| b.well_id == well_id)
            .cloned()
            .collect();
        let mut bhas = sorted_by(bhas, |b: &Bha| b.created_date);
        for bha in &mut bhas {
            bha.sort_components();
        }
        Ok(bhas)
    }

    fn delete_bha(&self, bha_id: &str) -> Result<(), StorageError> {
        self.write()?
            .bhas
            .remove(bha_id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found("bha", bha_id))
    }

    fn get_drilling_log(&self, well_id: &str) -> Result<Option<DrillingLog>, StorageError> {
        let store = self.read()?;
        store.require_well(well_id)?;
        Ok(store.drilling_logs.get(well_id).cloned())
    }

    fn save_drilling_log(&self, log: &DrillingLog) -> Result<(), StorageError> {
        for entry in &log.entries {
            entry.validate()?;
        }
        let mut store = self.write()?;
        store.require_well(&log.well_id)?;
        store.drilling_logs.insert(log.well_id.clone(), log.clone());
        Ok(())
    }

    fn append_parameters(
        &self,
        well_id: &str,
        params: DrillingParameters,
    ) -> Result<DrillingLog, StorageError> {
        params.validate()?;
        let mut store = self.write()?;
        let unit_system = store.require_well(well_id)?.unit_system;
        let log = store
            .drilling_logs
            .entry(well_id.to_string())
            .or_insert_with(|| DrillingLog::new(well_id, unit_system));
        log.push(params);
        Ok(log.clone())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
