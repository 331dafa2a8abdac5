/*!
 * Error Types
 * Container errors with thiserror, miette, and serde support
 *
 * Absence (empty pops, lookups of missing keys through `get`) is reported
 * with `Option` and never reaches this module. Only precondition failures do.
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Precondition failures raised by the synchronized adapters
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ContainerError {
    #[error("Key not found: {0}")]
    #[diagnostic(
        code(container::key_not_found),
        help("Use `get` or `contains_key` when the key may legitimately be absent.")
    )]
    KeyNotFound(String),

    #[error("Requested {requested} elements but only {available} available")]
    #[diagnostic(
        code(container::insufficient_elements),
        help("`try_pop_require` is all-or-nothing. Use `try_pop` to accept a partial batch.")
    )]
    InsufficientElements { requested: usize, available: usize },
}

impl ContainerError {
    /// Build a `KeyNotFound` from any debuggable key
    pub fn key_not_found<Q: std::fmt::Debug + ?Sized>(key: &Q) -> Self {
        ContainerError::KeyNotFound(format!("{:?}", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_renders_key() {
        let err = ContainerError::key_not_found("alpha");
        assert_eq!(err.to_string(), "Key not found: \"alpha\"");
    }

    #[test]
    fn test_insufficient_elements_message() {
        let err = ContainerError::InsufficientElements {
            requested: 5,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Requested 5 elements but only 2 available"
        );
    }

    #[test]
    fn test_diagnostic_code() {
        let err = ContainerError::key_not_found(&7u32);
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("container::key_not_found"));
    }
}
