//! Persistence session for the open project.
//!
//! The session forwards committed editor changes to a primary store. When
//! the primary store is unreachable it keeps working against a local
//! in-memory copy: failed writes stay queued (coalesced, last commit wins)
//! and are retried on the next flush. The live scene is never rolled back.

use super::{MemoryStore, ProjectStore, StoreError, StoreResult};
use crate::notice::Notice;
use crate::project::{NewProject, Project, ProjectUpdate};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Whether the session is talking to the primary store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Online,
    Offline,
}

/// Result of a flush.
#[derive(Debug, Clone, PartialEq)]
pub enum FlushOutcome {
    /// Nothing was pending, or no project is open.
    Idle,
    /// The primary store accepted the update.
    Saved(Project),
    /// The write failed and stays queued.
    Queued(StoreError),
}

/// Manages persistence of the open project.
pub struct ProjectSession<S: ProjectStore + ?Sized> {
    /// Primary store.
    primary: Arc<S>,
    /// Local copy used while the primary store is unreachable.
    local: MemoryStore,
    /// Open project id.
    project_id: Option<String>,
    mode: SessionMode,
    /// Coalesced updates not yet accepted by the primary store.
    pending: Option<ProjectUpdate>,
    /// Last successful write to the primary store.
    last_save: Option<DateTime<Utc>>,
    notices: Vec<Notice>,
}

impl<S: ProjectStore + ?Sized> ProjectSession<S> {
    /// Create a session over a primary store.
    pub fn new(primary: Arc<S>) -> Self {
        Self {
            primary,
            local: MemoryStore::new(),
            project_id: None,
            mode: SessionMode::Online,
            pending: None,
            last_save: None,
            notices: Vec::new(),
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Get the open project id.
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Check if there are changes the primary store has not accepted.
    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_save(&self) -> Option<DateTime<Utc>> {
        self.last_save
    }

    /// The local fallback store.
    pub fn local(&self) -> &MemoryStore {
        &self.local
    }

    /// Create and open a project, locally if the primary store is unreachable.
    pub async fn create(&mut self, new: NewProject) -> StoreResult<Project> {
        let project = match self.primary.create(new.clone()).await {
            Ok(project) => project,
            Err(StoreError::Unreachable(reason)) => {
                self.go_offline(&reason);
                self.local.create(new).await?
            }
            Err(e) => return Err(e),
        };
        self.open(&project)?;
        Ok(project)
    }

    /// Load and open a project, from the local copy if the primary store is unreachable.
    pub async fn load(&mut self, id: &str) -> StoreResult<Project> {
        let project = match self.primary.load(id).await {
            Ok(project) => project,
            Err(StoreError::Unreachable(reason)) => {
                self.go_offline(&reason);
                self.local.load(id).await?
            }
            Err(e) => return Err(e),
        };
        self.open(&project)?;
        Ok(project)
    }

    fn open(&mut self, project: &Project) -> StoreResult<()> {
        self.local.put(project.clone())?;
        self.project_id = Some(project.id.clone());
        self.pending = None;
        log::info!("Opened project {} ({})", project.name, project.id);
        Ok(())
    }

    /// Queue a committed change for the next flush.
    pub fn enqueue(&mut self, update: ProjectUpdate) {
        if update.is_empty() {
            return;
        }
        match &mut self.pending {
            Some(pending) => pending.merge(update),
            None => self.pending = Some(update),
        }
    }

    /// Send queued changes to the primary store.
    ///
    /// Failures never propagate: the update stays queued, is mirrored to
    /// the local copy and a notice is emitted.
    pub async fn flush(&mut self) -> FlushOutcome {
        let Some(id) = self.project_id.clone() else {
            return FlushOutcome::Idle;
        };
        let Some(update) = self.pending.take() else {
            return FlushOutcome::Idle;
        };

        let result = match self.primary.update(&id, update.clone()).await {
            Err(StoreError::NotFound(_)) => self.push_local_copy(&id, &update).await,
            other => other,
        };

        match result {
            Ok(project) => {
                if let Err(e) = self.local.put(project.clone()) {
                    log::warn!("Failed to mirror project {} locally: {}", id, e);
                }
                self.last_save = Some(Utc::now());
                if self.mode == SessionMode::Offline {
                    self.mode = SessionMode::Online;
                    log::info!("Project store reachable again");
                    self.notices
                        .push(Notice::success("Back Online", "Your changes have been saved."));
                }
                FlushOutcome::Saved(project)
            }
            Err(e) => {
                log::warn!("Failed to persist project {}: {}", id, e);
                if let Err(local_err) = self.local.update(&id, update.clone()).await {
                    log::warn!("Failed to update local copy of {}: {}", id, local_err);
                }
                self.pending = Some(update);
                match &e {
                    StoreError::Unreachable(reason) => self.go_offline(reason),
                    other => self
                        .notices
                        .push(Notice::error("Save Failed", other.to_string())),
                }
                FlushOutcome::Queued(e)
            }
        }
    }

    /// The primary store does not know the project (it was created offline):
    /// send the whole local copy instead of a patch.
    async fn push_local_copy(&self, id: &str, update: &ProjectUpdate) -> StoreResult<Project> {
        let mut project = self.local.load(id).await?;
        project.apply(update.clone());
        log::info!("Uploading locally created project {}", id);
        self.primary.import(project).await
    }

    fn go_offline(&mut self, reason: &str) {
        if self.mode == SessionMode::Online {
            log::warn!("Project store unreachable, working offline: {}", reason);
            self.mode = SessionMode::Offline;
            self.notices.push(Notice::warning(
                "Working Offline",
                "Changes are kept locally and will be saved when the connection returns.",
            ));
        }
    }

    /// Take all notices emitted since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;
    use pollster::block_on;

    fn rename(name: &str) -> ProjectUpdate {
        ProjectUpdate {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_flush_online() {
        let store = Arc::new(MemoryStore::new());
        let mut session = ProjectSession::new(store.clone());
        let project = block_on(session.create(NewProject::named("Blinky"))).unwrap();

        assert_eq!(block_on(session.flush()), FlushOutcome::Idle);
        session.enqueue(rename("Blinky v2"));
        assert!(session.is_dirty());
        assert!(matches!(block_on(session.flush()), FlushOutcome::Saved(_)));
        assert!(!session.is_dirty());
        assert!(session.last_save().is_some());
        assert_eq!(block_on(store.load(&project.id)).unwrap().name, "Blinky v2");
    }

    #[test]
    fn test_failed_flush_stays_queued() {
        let store = Arc::new(MemoryStore::new());
        let mut session = ProjectSession::new(store.clone());
        let project = block_on(session.create(NewProject::named("Blinky"))).unwrap();

        store.set_reachable(false);
        session.enqueue(rename("first"));
        assert!(matches!(
            block_on(session.flush()),
            FlushOutcome::Queued(StoreError::Unreachable(_))
        ));
        assert_eq!(session.mode(), SessionMode::Offline);
        assert!(session.is_dirty());
        // The local copy tracks the latest state.
        assert_eq!(block_on(session.local().load(&project.id)).unwrap().name, "first");

        session.enqueue(rename("second"));
        store.set_reachable(true);
        assert!(matches!(block_on(session.flush()), FlushOutcome::Saved(_)));
        assert_eq!(block_on(store.load(&project.id)).unwrap().name, "second");
        assert_eq!(session.mode(), SessionMode::Online);

        let levels: Vec<NoticeLevel> = session.drain_notices().iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![NoticeLevel::Warning, NoticeLevel::Success]);
        assert!(session.drain_notices().is_empty());
    }

    #[test]
    fn test_create_offline_then_upload() {
        let store = Arc::new(MemoryStore::new());
        store.set_reachable(false);
        let mut session = ProjectSession::new(store.clone());

        let project = block_on(session.create(NewProject::named("Offline draft"))).unwrap();
        assert_eq!(session.mode(), SessionMode::Offline);
        assert_eq!(session.project_id(), Some(project.id.as_str()));

        store.set_reachable(true);
        session.enqueue(rename("Uploaded"));
        assert!(matches!(block_on(session.flush()), FlushOutcome::Saved(_)));
        assert_eq!(block_on(store.load(&project.id)).unwrap().name, "Uploaded");
    }

    #[test]
    fn test_load_falls_back_to_local_copy() {
        let store = Arc::new(MemoryStore::new());
        let mut session = ProjectSession::new(store.clone());
        let project = block_on(session.create(NewProject::named("Blinky"))).unwrap();

        store.set_reachable(false);
        let loaded = block_on(session.load(&project.id)).unwrap();
        assert_eq!(loaded.id, project.id);
        assert_eq!(session.mode(), SessionMode::Offline);
    }
}
