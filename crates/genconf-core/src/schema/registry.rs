//! Embedded JSON Schemas for plugin bodies and condition payloads
//!
//! Each `*.schema.json` file under the workspace `schemas/` directory holds
//! a `$defs` table. Every definition is compiled as its own entry point, so
//! `input/cron` validates a cron body and `condition/gt` validates the
//! payload of a `gt` condition.

use crate::error::{Error, Result};
use crate::schema::PathSegment;
use jsonschema::Validator;
use rust_embed::RustEmbed;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use tracing::debug;

/// Embedded schema files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../schemas/"]
#[prefix = ""]
struct EmbeddedSchemas;

const DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Global registry instance
static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();

/// Schema file a definition belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaFamily {
    Condition,
    Input,
    Event,
    Output,
    Generator,
}

impl SchemaFamily {
    /// File stem under `schemas/`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Condition => "condition",
            Self::Input => "input",
            Self::Event => "event",
            Self::Output => "output",
            Self::Generator => "generator",
        }
    }
}

/// Definitions of one schema file with their compiled validators
#[derive(Debug)]
struct SchemaFile {
    defs: Map<String, Value>,
    validators: HashMap<String, Validator>,
}

impl SchemaFile {
    fn compile(stem: &str, document: &Value) -> Result<Self> {
        let Some(Value::Object(defs)) = document.get("$defs") else {
            return Err(Error::schema_compile(stem, "missing '$defs' table"));
        };

        let mut validators = HashMap::with_capacity(defs.len());
        for name in defs.keys() {
            // Sibling definitions stay reachable through local `$ref`s
            let entry = json!({
                "$schema": DRAFT,
                "$defs": defs,
                "$ref": format!("#/$defs/{}", name),
            });
            let compiled = jsonschema::validator_for(&entry).map_err(|e| {
                Error::schema_compile(format!("{}/{}", stem, name), e.to_string())
            })?;
            validators.insert(name.clone(), compiled);
        }

        Ok(Self {
            defs: defs.clone(),
            validators,
        })
    }
}

/// Compiled schemas by file stem
#[derive(Debug)]
pub struct SchemaRegistry {
    files: BTreeMap<String, SchemaFile>,
}

impl SchemaRegistry {
    /// Compile every embedded schema file
    pub fn new() -> Result<Self> {
        let mut files = BTreeMap::new();

        for file in EmbeddedSchemas::iter() {
            let Some(stem) = file.strip_suffix(".schema.json") else {
                continue;
            };
            let Some(content) = EmbeddedSchemas::get(&file) else {
                continue;
            };

            debug!("Loading embedded schema: {}", stem);
            let document: Value = serde_json::from_slice(&content.data)?;
            files.insert(stem.to_string(), SchemaFile::compile(stem, &document)?);
        }

        if files.is_empty() {
            return Err(Error::schema_not_found("*.schema.json"));
        }

        Ok(Self { files })
    }

    /// Get the global registry instance
    pub fn global() -> &'static SchemaRegistry {
        REGISTRY.get_or_init(|| {
            SchemaRegistry::new().expect("Failed to initialize embedded schema registry")
        })
    }

    /// File stems of the loaded schemas, sorted
    pub fn families(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Definition names of one schema file, in file order
    pub fn definitions(&self, family: SchemaFamily) -> Vec<&str> {
        self.files
            .get(family.as_str())
            .map(|file| file.defs.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub(crate) fn schema(&self, family: SchemaFamily, name: &str) -> Option<Schema<'_>> {
        let file = self.files.get(family.as_str())?;
        let (name, validator) = file.validators.get_key_value(name)?;
        Some(Schema {
            file,
            name,
            validator,
        })
    }
}

/// One compiled entry point together with the definitions it refers to
#[derive(Debug, Clone, Copy)]
pub(crate) struct Schema<'r> {
    file: &'r SchemaFile,
    name: &'r str,
    validator: &'r Validator,
}

impl<'r> Schema<'r> {
    pub(crate) fn validator(&self) -> &'r Validator {
        self.validator
    }

    /// Follow local `#/$defs/...` references
    pub(crate) fn resolve(&self, mut node: &'r Value) -> &'r Value {
        // Bounded so a reference cycle cannot loop forever
        for _ in 0..8 {
            let Some(target) = node
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/$defs/"))
                .and_then(|name| self.file.defs.get(name))
            else {
                break;
            };
            node = target;
        }
        node
    }

    /// Subschema that applies to the instance at `segments`
    ///
    /// Follows `properties`, `additionalProperties` and `items`, which is all
    /// the embedded schemas nest through.
    pub(crate) fn node_at(&self, segments: &[PathSegment]) -> Option<&'r Value> {
        let mut node = self.resolve(self.file.defs.get(self.name)?);

        for segment in segments {
            let next = match segment {
                PathSegment::Key(key) => node
                    .get("properties")
                    .and_then(|properties| properties.get(key))
                    .or_else(|| node.get("additionalProperties").filter(|a| a.is_object())),
                PathSegment::Index(_) => node.get("items"),
            };
            node = self.resolve(next?);
        }

        Some(node)
    }
}
