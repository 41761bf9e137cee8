//! Field paths and structured validation errors

use serde::Serialize;
use std::fmt;

/// One step into a document: an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a validated document
///
/// Displays as `or[1].eq["locals.x"]`. Keys that are not plain identifiers
/// are quoted so state field names stay readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Path to a key of the object at this path
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    /// Path to an element of the array at this path
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

fn is_identifier(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if is_identifier(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", key)?;
                }
                PathSegment::Key(key) => write!(f, "[{:?}]", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Category of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Value has the wrong JSON type
    InvalidType,
    /// A required field is absent
    MissingField,
    /// Object carries a field the shape does not declare
    UnknownField,
    /// Discriminant names no known variant
    UnknownVariant,
    /// Several keys present where exactly one is required
    Ambiguous,
    /// Value has the right type but violates a refinement
    Constraint,
    /// Value names something that is not declared elsewhere in the document
    InvalidReference,
    /// Nesting exceeds the configured maximum depth
    DepthExceeded,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidType => "invalid_type",
            Self::MissingField => "missing_field",
            Self::UnknownField => "unknown_field",
            Self::UnknownVariant => "unknown_variant",
            Self::Ambiguous => "ambiguous",
            Self::Constraint => "constraint",
            Self::InvalidReference => "invalid_reference",
            Self::DepthExceeded => "depth_exceeded",
        };
        write!(f, "{}", name)
    }
}

/// A single validation failure at a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: FieldPath,
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Non-empty, ordered list of validation failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        debug_assert!(!errors.is_empty(), "validation errors must not be empty");
        Self(errors)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }

    /// Errors whose path displays as `path` (e.g. `or[1].eq`)
    pub fn at(&self, path: &str) -> Vec<&FieldError> {
        self.0
            .iter()
            .filter(|e| e.path.to_string() == path)
            .collect()
    }

    /// Whether any error of `kind` is reported at `path`
    pub fn has(&self, path: &str, kind: ErrorKind) -> bool {
        self.at(path).iter().any(|e| e.kind == kind)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(|e| format!("  - {}", e)).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display_mixes_keys_and_indexes() {
        let path = FieldPath::root().key("or").index(1).key("eq");
        assert_eq!(path.to_string(), "or[1].eq");
    }

    #[test]
    fn test_path_display_quotes_dotted_keys() {
        let path = FieldPath::root().key("eq").key("locals.counter");
        assert_eq!(path.to_string(), r#"eq["locals.counter"]"#);
    }

    #[test]
    fn test_root_path_is_empty() {
        assert!(FieldPath::root().is_root());
        assert_eq!(FieldPath::root().to_string(), "");
    }

    #[test]
    fn test_path_serializes_as_segment_array() {
        let path = FieldPath::root().key("templates").index(0).key("a");
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json, serde_json::json!(["templates", 0, "a"]));
    }

    #[test]
    fn test_field_error_serialization() {
        let error = FieldError {
            path: FieldPath::root().key("count"),
            kind: ErrorKind::Constraint,
            message: "must be greater than or equal to 1, got 0".to_string(),
        };
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["path"], serde_json::json!(["count"]));
        assert_eq!(json["kind"], "constraint");
    }

    #[test]
    fn test_errors_lookup_by_path() {
        let errors = ValidationErrors::new(vec![
            FieldError {
                path: FieldPath::root().key("a"),
                kind: ErrorKind::MissingField,
                message: "missing required field".to_string(),
            },
            FieldError {
                path: FieldPath::root().key("b").index(2),
                kind: ErrorKind::InvalidType,
                message: "expected a string, found number".to_string(),
            },
        ]);

        assert_eq!(errors.len(), 2);
        assert!(errors.has("a", ErrorKind::MissingField));
        assert!(errors.has("b[2]", ErrorKind::InvalidType));
        assert!(!errors.has("b[2]", ErrorKind::Constraint));
        assert!(errors.to_string().contains("  - b[2]: expected a string"));
    }
}
