//! Project Data Storage
//!
//! Persistent storage for projects, wells, surveys, BHAs and drilling
//! parameter logs, plus zip backup/restore of whole projects.

pub mod backup;
pub mod lockfile;
mod memory;
mod repository;
mod sled_store;

pub use backup::{backup_project, restore_project};
pub use lockfile::ProcessLock;
pub use memory::InMemoryRepository;
pub use repository::{ProjectRepository, StorageError};
pub use sled_store::SledRepository;

use std::sync::Arc;

use crate::config::{defaults, StorageBackend, StorageConfig};

/// Open the configured backend.
///
/// The caller is expected to hold a [`ProcessLock`] on `data_dir` for the
/// sled backend.
pub fn open_repository(cfg: &StorageConfig) -> Result<Arc<dyn ProjectRepository>, StorageError> {
    match cfg.backend {
        StorageBackend::Sled => {
            let path = cfg.data_dir.join(defaults::DB_DIR_NAME);
            Ok(Arc::new(SledRepository::open(path)?))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data will not survive a restart");
            Ok(Arc::new(InMemoryRepository::new()))
        }
    }
}
