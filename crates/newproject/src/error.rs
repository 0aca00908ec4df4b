//! Errors raised while scaffolding a project

use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort project creation
#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("Directory already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("Template directory not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("No file starting with '{prefix}' at the top of template {}", .template.display())]
    MainSourceNotFound { prefix: String, template: PathBuf },

    #[error("More than one main source candidate in template: {}", .0.join(", "))]
    AmbiguousMainSource(Vec<String>),

    #[error("Invalid plugin name: {0}")]
    InvalidPluginName(String),
}
