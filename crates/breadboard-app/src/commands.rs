//! Command handlers.

use crate::AppResult;
use crate::cli::{Cli, Command, ProjectsCommand};
use breadboard_core::catalog::{ALL_FAMILIES, sample_assets};
use breadboard_core::input::Shortcut;
use breadboard_core::{
    ConnectorRef, DirectoryAssets, Editor, EditorConfig, FileStore, FzpDirectory, Modifiers,
    MouseButton, NewProject, PartCatalog, PartFilter, Project, ProjectSession, ProjectStore,
    ShortcutRegistry, ToolMode,
};
use kurbo::Point;
use pollster::block_on;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Run a parsed command line with its config and project store.
pub fn run(cli: Cli, out: &mut impl Write) -> AppResult<()> {
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let store = match cli.projects_dir {
        Some(path) => FileStore::new(path)?,
        None => FileStore::default_location()?,
    };
    log::debug!("Using project directory {}", store.base_path().display());
    execute(cli.command, out, Arc::new(store), config)
}

/// Run a command against an explicit store and config.
pub fn execute<S>(
    command: Command,
    out: &mut impl Write,
    store: Arc<S>,
    config: EditorConfig,
) -> AppResult<()>
where
    S: ProjectStore + 'static,
{
    match command {
        Command::Parts {
            dir,
            family,
            search,
        } => list_parts(dir.as_deref(), family, search, out),
        Command::Families { dir } => list_families(dir.as_deref(), out),
        Command::Shortcuts => list_shortcuts(out),
        Command::Projects(command) => projects(command, out, store.as_ref()),
        Command::Demo { name } => demo(&name, out, store, config),
    }
}

/// Catalog from a descriptor directory, or the built-in samples.
fn load_catalog(dir: Option<&Path>) -> PartCatalog {
    match dir {
        Some(dir) => {
            let source = FzpDirectory::new(dir);
            log::info!("Loading parts from {}", source.path().display());
            PartCatalog::load_or_samples(&source, &DirectoryAssets::new(dir))
        }
        None => PartCatalog::samples(),
    }
}

fn list_parts(
    dir: Option<&Path>,
    family: Option<String>,
    search: Option<String>,
    out: &mut impl Write,
) -> AppResult<()> {
    let catalog = load_catalog(dir);
    let filter = PartFilter {
        search,
        family,
        ..Default::default()
    };
    let parts = catalog.list_parts(&filter);
    for part in &parts {
        writeln!(
            out,
            "{:<24} {:<32} {:<12} {} connector(s)",
            part.id,
            part.title,
            part.family().unwrap_or("-"),
            part.connectors.len()
        )?;
    }
    writeln!(out, "{} part(s)", parts.len())?;
    Ok(())
}

fn list_families(dir: Option<&Path>, out: &mut impl Write) -> AppResult<()> {
    for family in load_catalog(dir).family_options() {
        if family == ALL_FAMILIES {
            continue;
        }
        writeln!(out, "{}", family)?;
    }
    Ok(())
}

fn list_shortcuts(out: &mut impl Write) -> AppResult<()> {
    for Shortcut {
        key, description, ..
    } in ShortcutRegistry::all()
    {
        writeln!(out, "{:<10} {}", key, description)?;
    }
    Ok(())
}

fn projects<S>(command: ProjectsCommand, out: &mut impl Write, store: &S) -> AppResult<()>
where
    S: ProjectStore + ?Sized,
{
    match command {
        ProjectsCommand::List => {
            for project in block_on(store.list())? {
                writeln!(
                    out,
                    "{}  {:<32} {} part(s), {} wire(s)  updated {}",
                    project.id,
                    project.name,
                    project.parts.len(),
                    project.wires.len(),
                    project.updated_at.format("%Y-%m-%d %H:%M")
                )?;
            }
        }
        ProjectsCommand::Show { id } => {
            let project = block_on(store.load(&id))?;
            writeln!(out, "{}", project.to_json()?)?;
        }
        ProjectsCommand::Import { file } => {
            let json = std::fs::read_to_string(&file)?;
            let project = block_on(store.import(Project::from_json(&json)?))?;
            log::info!("Imported project {} from {}", project.id, file.display());
            writeln!(out, "{}", project.id)?;
        }
        ProjectsCommand::Export { id, file } => {
            let project = block_on(store.load(&id))?;
            std::fs::write(&file, project.to_json()?)?;
        }
        ProjectsCommand::Duplicate { id, name } => {
            let copy = block_on(store.duplicate(&id, name))?;
            writeln!(out, "{}", copy.id)?;
        }
        ProjectsCommand::Delete { id } => {
            block_on(store.delete(&id))?;
        }
    }
    Ok(())
}

/// Build an LED and resistor circuit through the editor and save it.
fn demo<S>(name: &str, out: &mut impl Write, store: Arc<S>, config: EditorConfig) -> AppResult<()>
where
    S: ProjectStore + 'static,
{
    let mut session = ProjectSession::new(store);
    let project = block_on(session.create(NewProject::named(name)))?;

    let mut editor = Editor::from_project(&project, config, PartCatalog::samples());
    let led = editor.place_part("led-red", Point::new(100.0, 100.0));
    let resistor = editor.place_part("resistor-330", Point::new(300.0, 100.0));
    block_on(editor.load_footprints(&sample_assets()));

    if let (Some(led), Some(resistor)) = (led, resistor) {
        editor.set_mode(ToolMode::Wire);
        for endpoint in [
            ConnectorRef::new(led, "connector1"),
            ConnectorRef::new(resistor, "connector0"),
        ] {
            let Some(world) = editor.connector_position(&endpoint) else {
                log::warn!("Connector {:?} did not resolve", endpoint);
                continue;
            };
            let screen = editor.viewport().world_to_screen(world);
            editor.pointer_down(screen, MouseButton::Left, Modifiers::default());
            editor.pointer_up(screen, MouseButton::Left);
        }
    }

    editor.persist_canvas_settings();
    if let Some(update) = editor.take_update() {
        session.enqueue(update);
    }
    block_on(session.flush());

    for notice in editor.drain_notices().into_iter().chain(session.drain_notices()) {
        writeln!(out, "[{:?}] {}: {}", notice.level, notice.title, notice.message)?;
    }
    writeln!(out, "{}", project.id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;
    use breadboard_core::MemoryStore;
    use clap::Parser;
    use tempfile::tempdir;

    fn run_memory(args: &[&str], store: &Arc<MemoryStore>) -> AppResult<String> {
        let cli = Cli::try_parse_from(std::iter::once("breadboard").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        execute(cli.command, &mut out, store.clone(), EditorConfig::default())?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parts_search() {
        let store = Arc::new(MemoryStore::new());
        let output = run_memory(&["parts", "led"], &store).unwrap();
        assert!(output.contains("led-red"));
        assert!(output.ends_with("1 part(s)\n"));

        let output = run_memory(&["parts", "--family", "Arduino"], &store).unwrap();
        assert!(output.contains("arduino-uno"));
        assert!(!output.contains("led-red"));
    }

    #[test]
    fn test_parts_from_empty_directory_falls_back_to_samples() {
        let dir = tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let output =
            run_memory(&["parts", "--dir", dir.path().to_str().unwrap()], &store).unwrap();
        assert!(output.ends_with("3 part(s)\n"));
    }

    #[test]
    fn test_families_and_shortcuts() {
        let store = Arc::new(MemoryStore::new());
        let output = run_memory(&["families"], &store).unwrap();
        assert_eq!(output, "Arduino\nLED\nResistor\n");

        let output = run_memory(&["shortcuts"], &store).unwrap();
        assert!(output.contains("Escape"));
    }

    #[test]
    fn test_demo_saves_wired_project() {
        let store = Arc::new(MemoryStore::new());
        let output = run_memory(&["demo", "Blinky"], &store).unwrap();
        assert!(output.contains("Wire Connected"));

        let projects = block_on(store.list()).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Blinky");
        assert_eq!(projects[0].parts.len(), 2);
        assert_eq!(projects[0].wires.len(), 1);
        assert_eq!(projects[0].canvas_settings.show_grid, Some(true));
    }

    #[test]
    fn test_export_import_round_trip() {
        let dir = tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let id = run_memory(&["demo"], &store).unwrap();
        let id = id.lines().last().unwrap();

        let file = dir.path().join("blinky.json");
        let file = file.to_str().unwrap();
        run_memory(&["projects", "export", id, file], &store).unwrap();

        let other = Arc::new(MemoryStore::new());
        let imported = run_memory(&["projects", "import", file], &other).unwrap();
        assert_eq!(imported.trim(), id);
        assert!(matches!(
            run_memory(&["projects", "import", file], &other),
            Err(AppError::Store(_))
        ));
    }

    #[test]
    fn test_duplicate_and_delete() {
        let store = Arc::new(MemoryStore::new());
        let id = run_memory(&["demo"], &store).unwrap();
        let id = id.lines().last().unwrap().to_string();

        let copy = run_memory(&["projects", "duplicate", &id, "Fork"], &store).unwrap();
        run_memory(&["projects", "delete", &id], &store).unwrap();
        let list = run_memory(&["projects", "list"], &store).unwrap();
        assert!(list.contains(copy.trim()));
        assert!(list.contains("Fork"));
        assert!(!list.contains(&id));
    }
}
