//! Project backup and restore as zip archives
//!
//! Archive layout:
//!
//! ```text
//! project.json
//! wells/<well_id>.json
//! surveys/<survey_id>.json
//! bha/<bha_id>.json
//! drilling_params/<well_id>.json
//! ```

use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::repository::{ProjectRepository, StorageError};
use crate::types::{Bha, DrillingLog, Project, Survey, Well};

const PROJECT_ENTRY: &str = "project.json";
const WELLS_DIR: &str = "wells/";
const SURVEYS_DIR: &str = "surveys/";
const BHA_DIR: &str = "bha/";
const PARAMS_DIR: &str = "drilling_params/";

/// Archive file name: `<name>_backup_<YYYYmmdd_HHMMSS>.zip`.
fn backup_file_name(project_name: &str) -> String {
    let safe: String = project_name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{safe}_backup_{}.zip", Local::now().format("%Y%m%d_%H%M%S"))
}

fn write_entry<W, T>(zip: &mut ZipWriter<W>, name: &str, value: &T) -> Result<(), StorageError>
where
    W: Write + Seek,
    T: Serialize,
{
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(name, options)?;
    zip.write_all(&serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

/// Write a project, its wells and everything attached to them into a zip
/// archive under `dir`. Returns the archive path.
pub fn backup_project(
    repo: &dyn ProjectRepository,
    project_id: &str,
    dir: &Path,
) -> Result<PathBuf, StorageError> {
    let project = repo.get_project(project_id)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(backup_file_name(&project.name));

    let mut zip = ZipWriter::new(File::create(&path)?);
    write_entry(&mut zip, PROJECT_ENTRY, &project)?;

    let wells = repo.list_wells(project_id)?;
    let mut surveys = 0usize;
    for well in &wells {
        write_entry(&mut zip, &format!("{WELLS_DIR}{}.json", well.well_id), well)?;

        for survey in repo.list_surveys(&well.well_id)? {
            write_entry(&mut zip, &format!("{SURVEYS_DIR}{}.json", survey.survey_id), &survey)?;
            surveys += 1;
        }
        for bha in repo.list_bhas(&well.well_id)? {
            write_entry(&mut zip, &format!("{BHA_DIR}{}.json", bha.bha_id), &bha)?;
        }
        if let Some(log) = repo.get_drilling_log(&well.well_id)? {
            write_entry(&mut zip, &format!("{PARAMS_DIR}{}.json", well.well_id), &log)?;
        }
    }
    zip.finish()?;

    tracing::info!(
        project_id,
        wells = wells.len(),
        surveys,
        path = %path.display(),
        "Project backup written"
    );
    Ok(path)
}

fn read_entry<R, T>(archive: &mut ZipArchive<R>, name: &str) -> Result<T, StorageError>
where
    R: Read + Seek,
    T: DeserializeOwned,
{
    let mut entry = archive.by_name(name)?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    serde_json::from_slice(&buf).map_err(|e| StorageError::InvalidBackup(format!("{name}: {e}")))
}

fn entries_under(names: &[String], prefix: &str) -> Vec<String> {
    names
        .iter()
        .filter(|n| n.starts_with(prefix) && n.ends_with(".json"))
        .cloned()
        .collect()
}

/// Restore a project from an archive written by [`backup_project`].
///
/// An existing project with the same id is replaced, as are wells with
/// matching ids.
pub fn restore_project(repo: &dyn ProjectRepository, archive_path: &Path) -> Result<Project, StorageError> {
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();

    if !names.iter().any(|n| n == PROJECT_ENTRY) {
        return Err(StorageError::InvalidBackup(format!(
            "{PROJECT_ENTRY} missing from {}",
            archive_path.display()
        )));
    }
    let mut project: Project = read_entry(&mut archive, PROJECT_ENTRY)?;

    let mut wells = Vec::new();
    for name in entries_under(&names, WELLS_DIR) {
        wells.push(read_entry::<_, Well>(&mut archive, &name)?);
    }
    let mut surveys = Vec::new();
    for name in entries_under(&names, SURVEYS_DIR) {
        surveys.push(read_entry::<_, Survey>(&mut archive, &name)?);
    }
    let mut bhas = Vec::new();
    for name in entries_under(&names, BHA_DIR) {
        bhas.push(read_entry::<_, Bha>(&mut archive, &name)?);
    }
    let mut logs = Vec::new();
    for name in entries_under(&names, PARAMS_DIR) {
        logs.push(read_entry::<_, DrillingLog>(&mut archive, &name)?);
    }

    // Keep the archived well order, dropping ids with no well entry
    let order: Vec<String> = project
        .well_ids
        .iter()
        .filter(|id| wells.iter().any(|w| &w.well_id == *id))
        .cloned()
        .collect();
    wells.sort_by_key(|w| order.iter().position(|id| *id == w.well_id).unwrap_or(usize::MAX));

    match repo.delete_project(&project.project_id) {
        Ok(()) => tracing::info!(project_id = %project.project_id, "Replacing existing project"),
        Err(StorageError::NotFound { .. }) => {}
        Err(e) => return Err(e),
    }
    for well in &wells {
        match repo.delete_well(&well.well_id) {
            Ok(()) | Err(StorageError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    project.well_ids.clear();
    repo.create_project(&project)?;
    for well in &wells {
        repo.create_well(&project.project_id, well)?;
    }
    for survey in &surveys {
        repo.save_survey(survey)?;
    }
    for bha in &bhas {
        repo.save_bha(bha)?;
    }
    for log in &logs {
        repo.save_drilling_log(log)?;
    }

    let restored = repo.get_project(&project.project_id)?;
    tracing::info!(
        project_id = %restored.project_id,
        wells = wells.len(),
        surveys = surveys.len(),
        bhas = bhas.len(),
        "Project restored from backup"
    );
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryRepository;
    use crate::types::{BhaComponent, ComponentType, DrillingParameters, SurveyStation, UnitSystem};
    use tempfile::tempdir;

    fn populated() -> (InMemoryRepository, Project, Well, Survey) {
        let repo = InMemoryRepository::new();
        let project = Project::new("North Sea/Phase 2", "Operator");
        repo.create_project(&project).unwrap();
        let well = Well::new("NS-01", "Operator");
        repo.create_well(&project.project_id, &well).unwrap();

        let mut survey = Survey::new(&well.well_id, UnitSystem::Metric);
        survey.add_station(SurveyStation::new(0.0, 0.0, 0.0));
        survey.add_station(SurveyStation::new(300.0, 5.0, 90.0));
        repo.save_survey(&survey).unwrap();

        let mut bha = Bha::new(&well.well_id, "Run 1", UnitSystem::Metric);
        bha.add_component(BhaComponent::new("Bit", ComponentType::Bit, 0.3, 216.0, 0.0));
        repo.save_bha(&bha).unwrap();
        repo.append_parameters(&well.well_id, DrillingParameters::at_depth(300.0))
            .unwrap();
        (repo, project, well, survey)
    }

    #[test]
    fn test_backup_file_name() {
        let name = backup_file_name("North Sea/Phase 2");
        assert!(name.starts_with("North_Sea_Phase_2_backup_"));
        assert!(name.ends_with(".zip"));
        // _backup_ + YYYYmmdd_HHMMSS + .zip
        assert_eq!(name.len(), "North_Sea_Phase_2".len() + 8 + 15 + 4);
    }

    #[test]
    fn test_archive_layout() {
        let (repo, project, well, survey) = populated();
        let dir = tempdir().unwrap();
        let path = backup_project(&repo, &project.project_id, dir.path()).unwrap();

        let archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"project.json"));
        assert!(names.contains(&format!("wells/{}.json", well.well_id).as_str()));
        assert!(names.contains(&format!("surveys/{}.json", survey.survey_id).as_str()));
        assert!(names.contains(&format!("drilling_params/{}.json", well.well_id).as_str()));
        assert_eq!(names.iter().filter(|n| n.starts_with("bha/")).count(), 1);
    }

    #[test]
    fn test_restore_into_empty_repository() {
        let (repo, project, well, survey) = populated();
        let dir = tempdir().unwrap();
        let path = backup_project(&repo, &project.project_id, dir.path()).unwrap();

        let target = InMemoryRepository::new();
        let restored = restore_project(&target, &path).unwrap();
        assert_eq!(restored.project_id, project.project_id);
        assert_eq!(restored.well_ids, vec![well.well_id.clone()]);
        assert_eq!(target.get_survey(&survey.survey_id).unwrap().stations.len(), 2);
        assert_eq!(target.list_bhas(&well.well_id).unwrap().len(), 1);
        assert!(target.get_drilling_log(&well.well_id).unwrap().is_some());
    }

    #[test]
    fn test_restore_replaces_existing_project() {
        let (repo, project, well, survey) = populated();
        let dir = tempdir().unwrap();
        let path = backup_project(&repo, &project.project_id, dir.path()).unwrap();

        repo.delete_survey(&survey.survey_id).unwrap();
        let mut renamed = repo.get_project(&project.project_id).unwrap();
        renamed.name = "Changed".to_string();
        repo.update_project(&renamed).unwrap();

        let restored = restore_project(&repo, &path).unwrap();
        assert_eq!(restored.name, "North Sea/Phase 2");
        assert_eq!(repo.list_surveys(&well.well_id).unwrap().len(), 1);
        assert_eq!(repo.list_projects().unwrap().len(), 1);
    }

    #[test]
    fn test_archive_without_project_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.zip");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("readme.txt", FileOptions::default()).unwrap();
        zip.write_all(b"nothing here").unwrap();
        zip.finish().unwrap();

        let err = restore_project(&InMemoryRepository::new(), &path).unwrap_err();
        assert!(matches!(err, StorageError::InvalidBackup(_)));
    }
}
