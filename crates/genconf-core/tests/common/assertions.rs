//! Assertion helpers for validation errors

use genconf_core::{ErrorKind, ValidationErrors};

/// Assert that `errors` holds an error of `kind` at `path`, printing all errors otherwise
pub fn assert_has(errors: &ValidationErrors, path: &str, kind: ErrorKind) {
    assert!(
        errors.has(path, kind),
        "expected {} at '{}', got:\n{}",
        kind,
        path,
        errors
    );
}

/// Displayed paths of all errors, in report order
pub fn paths(errors: &ValidationErrors) -> Vec<String> {
    errors.iter().map(|e| e.path.to_string()).collect()
}
