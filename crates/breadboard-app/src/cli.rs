//! Command-line definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "breadboard")]
#[command(version, about = "Browse parts and manage Breadboard circuit projects")]
pub struct Cli {
    /// Editor config JSON file
    #[arg(long, global = true, env = "BREADBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding project files
    #[arg(long, global = true, env = "BREADBOARD_PROJECTS")]
    pub projects_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List catalog parts
    Parts {
        /// Directory of .fzp descriptors (defaults to the built-in samples)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Only parts of this family
        #[arg(long)]
        family: Option<String>,

        /// Text to match against title, description and tags
        search: Option<String>,
    },

    /// List part families
    Families {
        /// Directory of .fzp descriptors (defaults to the built-in samples)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// List keyboard shortcuts
    Shortcuts,

    /// Manage stored projects
    #[command(subcommand)]
    Projects(ProjectsCommand),

    /// Build an LED and resistor circuit and store it
    Demo {
        /// Project name
        #[arg(default_value = "Blinky")]
        name: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProjectsCommand {
    /// List stored projects, most recent first
    List,

    /// Print a project as JSON
    Show { id: String },

    /// Store an exported project file
    Import { file: PathBuf },

    /// Write a project to a file
    Export { id: String, file: PathBuf },

    /// Copy a project
    Duplicate {
        id: String,
        /// Name of the copy (defaults to "<name> (Copy)")
        name: Option<String>,
    },

    /// Delete a project
    Delete { id: String },
}
