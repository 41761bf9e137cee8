//! CLI command implementations

pub mod scan;
pub mod show;
pub mod validate;
pub mod version;

use anyhow::Result;
use camino::Utf8Path;
use genconf_core::{ConfigValidator, ProjectFile, Settings, ValidationErrors};
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Modify, Style, Width},
    Table, Tabled,
};

/// Effective settings shared by all commands
pub struct Context {
    pub settings: Settings,
    pub validator: ConfigValidator,
}

/// Load `file`, or search for one of the configured project file names
pub(crate) fn load_project(file: Option<&Utf8Path>, settings: &Settings) -> Result<ProjectFile> {
    let project = match file {
        Some(path) => ProjectFile::load(path)?,
        None => ProjectFile::discover(&settings.project_files)?,
    };
    Ok(project)
}

#[derive(Debug, Tabled, Serialize)]
pub(crate) struct ErrorRow {
    path: String,
    kind: String,
    message: String,
}

impl std::fmt::Display for ErrorRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

pub(crate) fn error_rows(errors: &ValidationErrors) -> Vec<ErrorRow> {
    errors
        .iter()
        .map(|e| ErrorRow {
            path: if e.path.is_root() {
                "(root)".to_string()
            } else {
                e.path.to_string()
            },
            kind: e.kind.to_string(),
            message: e.message.clone(),
        })
        .collect()
}

/// Print validation errors as a `path | kind | message` table
pub(crate) fn print_error_table(errors: &ValidationErrors) {
    let mut table = Table::new(error_rows(errors));
    table
        .with(Style::sharp())
        .with(Modify::new(Columns::new(2..3)).with(Width::wrap(80).keep_words(true)));
    println!("{}", table);
}
