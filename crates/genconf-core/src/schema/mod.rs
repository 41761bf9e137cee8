//! Schema-driven validation over decoded JSON values
//!
//! Shapes, types and bounds live in the embedded JSON Schemas (see
//! [`SchemaRegistry`]). [`Checker`] dispatches on discriminant keys, runs
//! the matching compiled schema, maps every violation to a [`FieldError`]
//! and builds typed values with serde once a document conforms. It does
//! not stop at the first failure, so a single pass reports every invalid
//! field.
//!
//! Convention: a method that returns `None` has already reported at
//! least one error.

mod path;
mod registry;
mod report;

pub use path::{ErrorKind, FieldError, FieldPath, PathSegment, ValidationErrors};
pub use registry::{SchemaFamily, SchemaRegistry};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Default limit for nested conditions
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Tunables for a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Maximum nesting of `and`/`or`/`not` conditions
    pub max_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ValidationOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A closed set of string values accepted in documents
pub trait Keyword: Sized + Copy + 'static {
    /// Every accepted spelling, in documentation order
    const NAMES: &'static [&'static str];

    fn from_name(name: &str) -> Option<Self>;

    fn name(&self) -> &'static str;
}

/// JSON type name used in error messages
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        previous = current;
    }

    previous[b.len()]
}

/// Closest accepted spelling for a misspelled key, if any is close enough
pub(crate) fn closest<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|candidate| (edit_distance(input, candidate), *candidate))
        .filter(|(distance, candidate)| {
            *distance <= (candidate.len().max(input.len()) / 3).max(1)
                || (!input.is_empty() && candidate.starts_with(input))
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

/// Error-collecting walker over a JSON document
#[derive(Debug)]
pub(crate) struct Checker {
    options: ValidationOptions,
    errors: Vec<FieldError>,
    depth: usize,
}

impl Checker {
    pub(crate) fn new(options: ValidationOptions) -> Self {
        Self {
            options,
            errors: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn report(&mut self, path: &FieldPath, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(FieldError {
            path: path.clone(),
            kind,
            message: message.into(),
        });
    }

    #[cfg(test)]
    pub(crate) fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Turn the outcome of a run into a result
    ///
    /// A value is only returned when nothing was reported, so checks that
    /// run after construction (cross references) still fail the run.
    pub(crate) fn finish<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ if self.errors.is_empty() => Err(ValidationErrors::new(vec![FieldError {
                path: FieldPath::root(),
                kind: ErrorKind::Constraint,
                message: "value was rejected".to_string(),
            }])),
            _ => Err(ValidationErrors::new(self.errors)),
        }
    }

    /// Run `f` one nesting level deeper, refusing to exceed `max_depth`
    pub(crate) fn nested<T>(
        &mut self,
        path: &FieldPath,
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        if self.depth >= self.options.max_depth {
            self.report(
                path,
                ErrorKind::DepthExceeded,
                format!(
                    "conditions are nested deeper than the maximum of {}",
                    self.options.max_depth
                ),
            );
            return None;
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn type_mismatch(&mut self, path: &FieldPath, expected: &str, value: &Value) {
        self.report(
            path,
            ErrorKind::InvalidType,
            format!("expected {}, found {}", expected, type_name(value)),
        );
    }

    pub(crate) fn unknown_variant(
        &mut self,
        path: &FieldPath,
        what: &str,
        name: &str,
        expected: &[&str],
    ) {
        let mut message = format!(
            "unknown {} '{}', expected one of: {}",
            what,
            name,
            expected.join(", ")
        );
        if let Some(suggestion) = closest(name, expected) {
            message.push_str(&format!("; did you mean '{}'?", suggestion));
        }
        self.report(path, ErrorKind::UnknownVariant, message);
    }

    pub(crate) fn map<'v>(
        &mut self,
        value: &'v Value,
        path: &FieldPath,
    ) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.type_mismatch(path, "an object", other);
                None
            }
        }
    }

    /// Object with exactly one entry, used for every discriminant-first dispatch
    ///
    /// `expected` lists the accepted keys for the empty-object message.
    pub(crate) fn single_entry<'v>(
        &mut self,
        value: &'v Value,
        path: &FieldPath,
        what: &str,
        expected: &[&str],
    ) -> Option<(&'v str, &'v Value)> {
        let map = self.map(value, path)?;
        let mut entries = map.iter();

        match (entries.next(), entries.next()) {
            (Some((key, inner)), None) => Some((key.as_str(), inner)),
            (None, _) => {
                let mut message = format!("expected exactly one {}, found an empty object", what);
                if !expected.is_empty() {
                    message.push_str(&format!(" (expected one of: {})", expected.join(", ")));
                }
                self.report(path, ErrorKind::MissingField, message);
                None
            }
            _ => {
                let keys: Vec<String> = map.keys().map(|k| format!("'{}'", k)).collect();
                self.report(
                    path,
                    ErrorKind::Ambiguous,
                    format!(
                        "expected exactly one {}, found {} keys: {}",
                        what,
                        keys.len(),
                        keys.join(", ")
                    ),
                );
                None
            }
        }
    }

    /// String discriminant field of an object, e.g. `mode` or `format`
    pub(crate) fn discriminant<K: Keyword>(
        &mut self,
        value: &Value,
        path: &FieldPath,
        field: &str,
        what: &str,
    ) -> Option<K> {
        let map = self.map(value, path)?;
        let field_path = path.key(field);

        match map.get(field) {
            Some(Value::String(name)) => {
                let keyword = K::from_name(name);
                if keyword.is_none() {
                    self.unknown_variant(&field_path, what, name, K::NAMES);
                }
                keyword
            }
            Some(other) => {
                self.type_mismatch(&field_path, "a string", other);
                None
            }
            None => {
                self.report(&field_path, ErrorKind::MissingField, "missing required field");
                None
            }
        }
    }

    /// Check `value` against the embedded schema `family/name`
    ///
    /// Every violation is reported; returns whether there were none.
    pub(crate) fn conform(
        &mut self,
        family: SchemaFamily,
        name: &str,
        value: &Value,
        path: &FieldPath,
    ) -> bool {
        let Some(schema) = SchemaRegistry::global().schema(family, name) else {
            self.report(
                path,
                ErrorKind::Constraint,
                format!("no schema is registered for {}/{}", family.as_str(), name),
            );
            return false;
        };

        let violations = report::violations(schema, value, path);
        let conforms = violations.is_empty();
        self.errors.extend(violations);
        conforms
    }

    /// Build a typed value from a document that already conforms
    pub(crate) fn typed<T: DeserializeOwned>(&mut self, value: &Value, path: &FieldPath) -> Option<T> {
        match T::deserialize(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                self.report(path, ErrorKind::InvalidType, e.to_string());
                None
            }
        }
    }

    /// [`Checker::conform`] followed by [`Checker::typed`]
    pub(crate) fn parse<T: DeserializeOwned>(
        &mut self,
        family: SchemaFamily,
        name: &str,
        value: &Value,
        path: &FieldPath,
    ) -> Option<T> {
        if self.conform(family, name, value, path) {
            self.typed(value, path)
        } else {
            None
        }
    }
}
