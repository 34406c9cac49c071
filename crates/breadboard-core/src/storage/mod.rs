//! Project persistence.

mod file;
mod memory;
mod session;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::{FlushOutcome, ProjectSession, SessionMode};

use crate::BoxFuture;
use crate::project::{NewProject, Project, ProjectUpdate};
use thiserror::Error;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unreachable: {0}")]
    Unreachable(String),
    #[error("Project not found: {0}")]
    NotFound(String),
    #[error("Project already exists: {0}")]
    Conflict(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for project storage backends.
///
/// Note: implementations must be Send + Sync so a store can be shared
/// between the editor session and background tooling.
pub trait ProjectStore: Send + Sync {
    /// All projects, most recently updated first.
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<Project>>>;

    /// Load a project.
    fn load(&self, id: &str) -> BoxFuture<'_, StoreResult<Project>>;

    /// Create a project; the store assigns id and timestamps.
    fn create(&self, new: NewProject) -> BoxFuture<'_, StoreResult<Project>>;

    /// Apply a partial update and return the stored result.
    fn update(&self, id: &str, update: ProjectUpdate) -> BoxFuture<'_, StoreResult<Project>>;

    /// Delete a project. Deleting a missing project is not an error.
    fn delete(&self, id: &str) -> BoxFuture<'_, StoreResult<()>>;

    /// Store a complete project under its own id.
    fn import(&self, project: Project) -> BoxFuture<'_, StoreResult<Project>>;

    /// Copy a project under a new id.
    fn duplicate(&self, id: &str, new_name: Option<String>) -> BoxFuture<'_, StoreResult<Project>> {
        let id = id.to_string();
        Box::pin(async move {
            let original = self.load(&id).await?;
            let copy = original.duplicate(new_name.as_deref());
            log::info!("Duplicating project {} as {}", id, copy.id);
            self.import(copy).await
        })
    }
}

/// Sort projects most recently updated first.
fn sort_recent_first(projects: &mut [Project]) {
    projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
