//! File-based project store.

use super::{ProjectStore, StoreError, StoreResult, sort_recent_first};
use crate::BoxFuture;
use crate::project::{NewProject, Project, ProjectUpdate};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each project as a JSON file named after its id.
pub struct FileStore {
    /// Base directory for project files.
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new file store with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StoreResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StoreError::Unreachable(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a file store in the default location.
    ///
    /// On Linux: `~/.local/share/breadboard/projects/`
    /// On Windows: `%LOCALAPPDATA%\breadboard\projects\`
    pub fn default_location() -> StoreResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| {
                StoreError::Unreachable("Could not determine home directory".to_string())
            })?;
        Self::new(base.join("breadboard").join("projects"))
    }

    /// Get the file path for a project id.
    fn project_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", file_stem(id)))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Read the project stored under `id`.
    fn read(path: &Path, id: &str) -> StoreResult<Project> {
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let project = Self::read_any(path)?;
        if project.id != id {
            log::warn!("{} holds project {}, not {}", path.display(), project.id, id);
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(project)
    }

    fn read_any(path: &Path) -> StoreResult<Project> {
        let json = fs::read_to_string(path).map_err(|e| {
            StoreError::Unreachable(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Project::from_json(&json).map_err(|e| {
            StoreError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn write(path: &Path, project: &Project) -> StoreResult<()> {
        let json = project
            .to_json()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(path, json).map_err(|e| {
            StoreError::Unreachable(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

/// Encode an id as a file stem, one-to-one.
///
/// ASCII letters, digits, `-` and `_` are kept; every other byte becomes
/// `%XX`.
fn file_stem(id: &str) -> String {
    let mut stem = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

impl ProjectStore for FileStore {
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<Project>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base).map_err(|e| {
                StoreError::Unreachable(format!("Failed to read directory: {}", e))
            })?;

            let mut projects = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.extension().is_some_and(|e| e == "json") {
                    continue;
                }
                match Self::read_any(&path) {
                    Ok(project) => projects.push(project),
                    Err(e) => log::warn!("Skipping unreadable project {}: {}", path.display(), e),
                }
            }
            sort_recent_first(&mut projects);
            Ok(projects)
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StoreResult<Project>> {
        let path = self.project_path(id);
        let id = id.to_string();
        Box::pin(async move { Self::read(&path, &id) })
    }

    fn create(&self, new: NewProject) -> BoxFuture<'_, StoreResult<Project>> {
        Box::pin(async move {
            let project = Project::create(new);
            Self::write(&self.project_path(&project.id), &project)?;
            log::info!("Created project {} ({})", project.name, project.id);
            Ok(project)
        })
    }

    fn update(&self, id: &str, update: ProjectUpdate) -> BoxFuture<'_, StoreResult<Project>> {
        let path = self.project_path(id);
        let id = id.to_string();
        Box::pin(async move {
            let mut project = Self::read(&path, &id)?;
            project.apply(update);
            Self::write(&path, &project)?;
            Ok(project)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StoreResult<()>> {
        let path = self.project_path(id);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StoreError::Unreachable(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn import(&self, project: Project) -> BoxFuture<'_, StoreResult<Project>> {
        let path = self.project_path(&project.id);
        Box::pin(async move {
            if path.exists() {
                return Err(StoreError::Conflict(project.id));
            }
            Self::write(&path, &project)?;
            Ok(project)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use kurbo::Point;
    use pollster::block_on;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_create_load() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let mut scene = Scene::new();
        scene.add_part("led-red", Point::new(120.0, 80.0));
        let new = NewProject {
            name: "Test Project".to_string(),
            parts: scene.parts.clone(),
            ..Default::default()
        };

        let created = block_on(store.create(new)).unwrap();
        let loaded = block_on(store.load(&created.id)).unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.scene(), scene);
    }

    #[test]
    fn test_file_store_not_found() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(store.load("nonexistent"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_file_store_list_skips_garbage() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        block_on(store.create(NewProject::named("One"))).unwrap();
        block_on(store.create(NewProject::named("Two"))).unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let list = block_on(store.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[0].updated_at >= list[1].updated_at);
    }

    #[test]
    fn test_file_store_update_delete() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let project = block_on(store.create(NewProject::named("Draft"))).unwrap();
        let update = ProjectUpdate {
            description: Some("Breadboard layout".into()),
            ..Default::default()
        };
        block_on(store.update(&project.id, update)).unwrap();
        assert_eq!(
            block_on(store.load(&project.id)).unwrap().description,
            "Breadboard layout"
        );

        block_on(store.delete(&project.id)).unwrap();
        assert!(matches!(
            block_on(store.load(&project.id)),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_file_store_import_and_duplicate() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let project = Project::create(NewProject::named("Imported"));
        block_on(store.import(project.clone())).unwrap();
        assert!(matches!(
            block_on(store.import(project.clone())),
            Err(StoreError::Conflict(_))
        ));

        let copy = block_on(store.duplicate(&project.id, Some("Fork".into()))).unwrap();
        assert_eq!(copy.name, "Fork");
        assert_eq!(block_on(store.list()).unwrap().len(), 2);
    }

    #[test]
    fn test_file_stem_is_reversible() {
        assert_eq!(file_stem("4f1c-9a_b"), "4f1c-9a_b");
        assert_eq!(file_stem("demo.1"), "demo%2E1");
        assert_eq!(file_stem("a%2E"), "a%252E");
        assert_eq!(file_stem("../x"), "%2E%2E%2Fx");
        assert_ne!(file_stem("demo.1"), file_stem("demo_1"));
    }

    #[test]
    fn test_file_store_ids_do_not_collide() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let mut dotted = Project::create(NewProject::named("Dotted"));
        dotted.id = "demo.1".into();
        let mut underscored = Project::create(NewProject::named("Underscored"));
        underscored.id = "demo_1".into();

        block_on(store.import(dotted)).unwrap();
        block_on(store.import(underscored)).unwrap();
        assert_eq!(block_on(store.load("demo_1")).unwrap().name, "Underscored");
        assert_eq!(block_on(store.load("demo.1")).unwrap().name, "Dotted");
        assert_eq!(block_on(store.list()).unwrap().len(), 2);
    }

    #[test]
    fn test_file_store_rejects_mismatched_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let project = block_on(store.create(NewProject::named("Moved"))).unwrap();
        fs::rename(
            dir.path().join(format!("{}.json", project.id)),
            dir.path().join("other.json"),
        )
        .unwrap();
        assert!(matches!(
            block_on(store.load("other")),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(block_on(store.list()).unwrap().len(), 1);
    }
}
