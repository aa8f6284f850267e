//! Project store port
//!
//! Reads and writes project documents (per-stage records with status,
//! quality metrics and content).

use async_trait::async_trait;
use stagegate_domain::ProjectSnapshot;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn load(&self, project_id: &str) -> Result<ProjectSnapshot, StoreError>;

    /// Replace the stored document with `project`
    async fn save(&self, project: &ProjectSnapshot) -> Result<(), StoreError>;
}
