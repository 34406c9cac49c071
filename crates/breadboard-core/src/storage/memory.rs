//! In-memory project store.

use super::{ProjectStore, StoreError, StoreResult, sort_recent_first};
use crate::BoxFuture;
use crate::project::{NewProject, Project, ProjectUpdate};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory store for tests, offline fallback and ephemeral use.
pub struct MemoryStore {
    projects: RwLock<HashMap<String, Project>>,
    reachable: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            projects: RwLock::new(HashMap::new()),
            reachable: AtomicBool::new(true),
        }
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store going offline or coming back.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> StoreResult<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unreachable("memory store is offline".to_string()))
        }
    }

    /// Insert or replace a project without any checks.
    pub(crate) fn put(&self, project: Project) -> StoreResult<()> {
        let mut projects = self
            .projects
            .write()
            .map_err(|e| StoreError::Unreachable(format!("Lock error: {}", e)))?;
        projects.insert(project.id.clone(), project);
        Ok(())
    }
}

impl ProjectStore for MemoryStore {
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<Project>>> {
        Box::pin(async move {
            self.check_reachable()?;
            let projects = self
                .projects
                .read()
                .map_err(|e| StoreError::Unreachable(format!("Lock error: {}", e)))?;
            let mut list: Vec<Project> = projects.values().cloned().collect();
            sort_recent_first(&mut list);
            Ok(list)
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StoreResult<Project>> {
        let id = id.to_string();
        Box::pin(async move {
            self.check_reachable()?;
            let projects = self
                .projects
                .read()
                .map_err(|e| StoreError::Unreachable(format!("Lock error: {}", e)))?;
            projects.get(&id).cloned().ok_or(StoreError::NotFound(id))
        })
    }

    fn create(&self, new: NewProject) -> BoxFuture<'_, StoreResult<Project>> {
        Box::pin(async move {
            self.check_reachable()?;
            let project = Project::create(new);
            self.put(project.clone())?;
            Ok(project)
        })
    }

    fn update(&self, id: &str, update: ProjectUpdate) -> BoxFuture<'_, StoreResult<Project>> {
        let id = id.to_string();
        Box::pin(async move {
            self.check_reachable()?;
            let mut projects = self
                .projects
                .write()
                .map_err(|e| StoreError::Unreachable(format!("Lock error: {}", e)))?;
            let project = projects.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            project.apply(update);
            Ok(project.clone())
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StoreResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.check_reachable()?;
            let mut projects = self
                .projects
                .write()
                .map_err(|e| StoreError::Unreachable(format!("Lock error: {}", e)))?;
            projects.remove(&id);
            Ok(())
        })
    }

    fn import(&self, project: Project) -> BoxFuture<'_, StoreResult<Project>> {
        Box::pin(async move {
            self.check_reachable()?;
            let mut projects = self
                .projects
                .write()
                .map_err(|e| StoreError::Unreachable(format!("Lock error: {}", e)))?;
            if projects.contains_key(&project.id) {
                return Err(StoreError::Conflict(project.id));
            }
            projects.insert(project.id.clone(), project.clone());
            Ok(project)
        })
    }
}
