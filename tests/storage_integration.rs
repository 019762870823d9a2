//! Storage Integration Tests
//!
//! Exercises the sled backend through `open_repository()`: persistence
//! across reopen, project backup/restore between databases and the
//! process lock.

use wormdriller::config::{defaults, StorageBackend, StorageConfig};
use wormdriller::storage::{self, ProcessLock, StorageError};
use wormdriller::types::{DrillingParameters, Project, Survey, SurveyStation, UnitSystem, Well};

fn sled_config(dir: &std::path::Path) -> StorageConfig {
    StorageConfig {
        data_dir: dir.to_path_buf(),
        backend: StorageBackend::Sled,
    }
}

fn seed(repo: &dyn storage::ProjectRepository) -> (Project, Well, Survey) {
    let project = Project::new("Bakken Pad 7", "Prairie Oil");
    repo.create_project(&project).unwrap();
    let well = Well::new("Pad7-3H", "Prairie Oil");
    repo.create_well(&project.project_id, &well).unwrap();

    let mut survey = Survey::new(&well.well_id, UnitSystem::Imperial);
    for (md, inc, azi) in [(0.0, 0.0, 0.0), (5000.0, 0.5, 120.0), (6000.0, 35.0, 175.0)] {
        survey.add_station(SurveyStation::new(md, inc, azi));
    }
    repo.save_survey(&survey).unwrap();
    repo.append_parameters(&well.well_id, DrillingParameters::at_depth(6000.0))
        .unwrap();
    (project, well, survey)
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = sled_config(dir.path());

    let (project, well, survey) = {
        let repo = storage::SledRepository::open(dir.path().join(defaults::DB_DIR_NAME)).unwrap();
        let seeded = seed(&repo);
        repo.flush().unwrap();
        seeded
    };

    let repo = storage::open_repository(&cfg).unwrap();
    assert_eq!(repo.get_project(&project.project_id).unwrap().well_ids, vec![well.well_id.clone()]);
    assert_eq!(repo.get_survey(&survey.survey_id).unwrap().stations.len(), 3);
    assert_eq!(
        repo.get_drilling_log(&well.well_id).unwrap().unwrap().entries.len(),
        1
    );
    assert!(dir.path().join(defaults::DB_DIR_NAME).exists());
}

#[test]
fn delete_project_cascades_to_wells() {
    let dir = tempfile::tempdir().unwrap();
    let repo = storage::open_repository(&sled_config(dir.path())).unwrap();
    let (project, well, survey) = seed(repo.as_ref());

    repo.delete_project(&project.project_id).unwrap();
    assert!(matches!(repo.get_well(&well.well_id), Err(StorageError::NotFound { .. })));
    assert!(matches!(repo.get_survey(&survey.survey_id), Err(StorageError::NotFound { .. })));
    assert!(repo.list_projects().unwrap().is_empty());
}

#[test]
fn backup_restores_into_another_database() {
    let source_dir = tempfile::tempdir().unwrap();
    let target_dir = tempfile::tempdir().unwrap();
    let backups = tempfile::tempdir().unwrap();

    let source = storage::open_repository(&sled_config(source_dir.path())).unwrap();
    let (project, well, survey) = seed(source.as_ref());
    let archive = storage::backup_project(source.as_ref(), &project.project_id, backups.path()).unwrap();
    assert_eq!(archive.extension().and_then(|e| e.to_str()), Some("zip"));

    let target = storage::open_repository(&sled_config(target_dir.path())).unwrap();
    let restored = storage::restore_project(target.as_ref(), &archive).unwrap();
    assert_eq!(restored.name, "Bakken Pad 7");
    assert_eq!(target.list_wells(&project.project_id).unwrap()[0].well_id, well.well_id);
    assert_eq!(target.get_survey(&survey.survey_id).unwrap().stations[2].inc, 35.0);
}

#[test]
fn process_lock_is_released_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let lock = ProcessLock::acquire(dir.path()).unwrap();
    let pid = std::fs::read_to_string(lock.path()).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());

    let path = lock.path().to_path_buf();
    drop(lock);
    assert!(!path.exists());
}

#[test]
fn stale_lock_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    // PID 0 never belongs to a running service
    std::fs::write(dir.path().join(".wormdriller.lock"), "0\n").unwrap();

    let lock = ProcessLock::acquire(dir.path()).unwrap();
    let pid = std::fs::read_to_string(lock.path()).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
}
