//! Project file loading and settings management

mod hierarchical_loader;
mod loader;

pub use hierarchical_loader::{HierarchicalSettingsLoader, Settings, SETTINGS_FILE};
pub use loader::{is_project_file, DocumentFormat, ProjectFile, DEFAULT_PROJECT_FILES};
