//! Project file loading and parsing

use crate::error::{Error, Result};
use crate::types::{SchemaKind, ValidatedConfig};
use crate::validate::ConfigValidator;
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use std::fs;
use tracing::{debug, info};

/// Project file names searched for by default
pub const DEFAULT_PROJECT_FILES: &[&str] = &["generator.yml", "generator.yaml"];

/// Extensions recognised as project documents
const PROJECT_EXTENSIONS: &[&str] = &["yml", "yaml", "json"];

/// Syntax of a project document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Format implied by the file extension; anything but `.json` is YAML
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    /// Decode content into a JSON value
    pub fn parse(&self, content: &str) -> Result<Value> {
        Ok(match self {
            Self::Yaml => serde_yaml_ng::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        })
    }
}

/// Whether a path looks like a project document (`.yml`, `.yaml` or `.json`)
pub fn is_project_file(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| PROJECT_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// A decoded project document
#[derive(Debug, Clone)]
pub struct ProjectFile {
    /// Path to the document
    pub path: Utf8PathBuf,

    pub format: DocumentFormat,

    /// Decoded, not yet validated content
    pub document: Value,
}

impl ProjectFile {
    /// Load and decode a document
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        info!(%path, "loading project file");
        Self::parse(path, &content)
    }

    /// Decode content that was read from `path`
    pub fn parse(path: &Utf8Path, content: &str) -> Result<Self> {
        let format = DocumentFormat::from_path(path);
        let document = format.parse(content)?;

        Ok(Self {
            path: path.to_owned(),
            format,
            document,
        })
    }

    /// Search `start` and its parent directories for one of `names`
    pub fn find<S: AsRef<str>>(start: &Utf8Path, names: &[S]) -> Option<Utf8PathBuf> {
        let mut current = Some(start);

        while let Some(dir) = current {
            for name in names {
                let path = dir.join(name.as_ref());
                if path.is_file() {
                    debug!(%path, "found project file");
                    return Some(path);
                }
            }
            current = dir.parent();
        }

        None
    }

    /// Find and load a project file starting from the current directory
    pub fn discover<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let cwd = Utf8PathBuf::try_from(cwd)
            .map_err(|_| Error::invalid_settings("Current directory path is not valid UTF-8"))?;

        match Self::find(&cwd, names) {
            Some(path) => Self::load(&path),
            None => {
                let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
                Err(Error::config_not_found(format!(
                    "{} (searched current and parent directories)",
                    names.join(" or ")
                )))
            }
        }
    }

    /// Validate the document against a schema kind
    pub fn validate(&self, validator: &ConfigValidator, kind: SchemaKind) -> Result<ValidatedConfig> {
        Ok(validator.validate(kind, &self.document)?)
    }

    /// Load a document and validate it
    pub fn load_and_validate(
        path: &Utf8Path,
        validator: &ConfigValidator,
        kind: SchemaKind,
    ) -> Result<ValidatedConfig> {
        Self::load(path)?.validate(validator, kind)
    }
}
