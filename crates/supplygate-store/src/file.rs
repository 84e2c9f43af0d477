//! `PolicyStore` backed by a JSON file.
//!
//! Saves write a sibling `<name>.tmp` file and rename it over the target, so
//! a reader never sees a half-written snapshot and a crash mid-save leaves
//! the previous snapshot intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use supplygate_contracts::error::{GateError, GateResult};
use supplygate_core::{policy::PolicySnapshot, traits::PolicyStore};

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "gate-state".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PolicyStore for FileStore {
    /// `Ok(None)` when the file does not exist yet.
    fn load(&self) -> GateResult<Option<PolicySnapshot>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(GateError::StorageFailed {
                    reason: format!("failed to read state file '{}': {}", self.path.display(), e),
                })
            }
        };

        let snapshot = serde_json::from_str(&contents).map_err(|e| GateError::StorageFailed {
            reason: format!("corrupt state file '{}': {}", self.path.display(), e),
        })?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &PolicySnapshot) -> GateResult<()> {
        let json = serde_json::to_vec_pretty(snapshot).map_err(|e| GateError::StorageFailed {
            reason: format!("failed to serialize snapshot: {}", e),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| GateError::StorageFailed {
                reason: format!("failed to create '{}': {}", parent.display(), e),
            })?;
        }

        let temp = self.temp_path();
        fs::write(&temp, &json).map_err(|e| GateError::StorageFailed {
            reason: format!("failed to write '{}': {}", temp.display(), e),
        })?;
        fs::rename(&temp, &self.path).map_err(|e| GateError::StorageFailed {
            reason: format!(
                "failed to move '{}' into place at '{}': {}",
                temp.display(),
                self.path.display(),
                e
            ),
        })?;

        debug!(path = %self.path.display(), gate_id = %snapshot.gate_id, "snapshot saved");
        Ok(())
    }

    /// Removing a file that is already gone is not an error.
    fn clear(&self) -> GateResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "snapshot removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GateError::StorageFailed {
                reason: format!("failed to remove state file '{}': {}", self.path.display(), e),
            }),
        }
    }
}
