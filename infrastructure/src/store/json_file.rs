//! JSON file project store
//!
//! Each project lives in `<directory>/<project-id>.json`. Writes go to a
//! temporary sibling first and are renamed into place, so a reader never
//! sees a half-written document.

use async_trait::async_trait;
use stagegate_application::ports::project_store::{ProjectStore, StoreError};
use stagegate_domain::ProjectSnapshot;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project store backed by a directory of JSON documents.
///
/// # Examples
///
/// ```
/// use stagegate_infrastructure::JsonFileProjectStore;
///
/// let store = JsonFileProjectStore::new("projects");
/// assert!(store.directory().ends_with("projects"));
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileProjectStore {
    directory: PathBuf,
}

impl JsonFileProjectStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Location of a project's document; ids are plain file stems
    pub fn path_for(&self, project_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !project_id.is_empty()
            && !project_id.starts_with('.')
            && project_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::Io(format!("invalid project id: {:?}", project_id)));
        }
        Ok(self.directory.join(format!("{}.json", project_id)))
    }
}

#[async_trait]
impl ProjectStore for JsonFileProjectStore {
    async fn load(&self, project_id: &str) -> Result<ProjectSnapshot, StoreError> {
        let path = self.path_for(project_id)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(project_id.to_string()));
            }
            Err(e) => return Err(StoreError::Io(format!("{}: {}", path.display(), e))),
        };

        let mut project: ProjectSnapshot = serde_json::from_str(&text)
            .map_err(|e| StoreError::Serialization(format!("{}: {}", path.display(), e)))?;
        if project.id.is_empty() {
            project.id = project_id.to_string();
        }
        debug!("Loaded project {} from {}", project_id, path.display());
        Ok(project)
    }

    async fn save(&self, project: &ProjectSnapshot) -> Result<(), StoreError> {
        let path = self.path_for(&project.id)?;
        let text = serde_json::to_string_pretty(project)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", self.directory.display(), e)))?;

        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, text)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", staging.display(), e)))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;

        debug!("Saved project {} to {}", project.id, path.display());
        Ok(())
    }
}
