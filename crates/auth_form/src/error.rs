//! Error taxonomy of the form engine.
//!
//! Field-level validation failures travel as an [`ErrorMap`] (field name →
//! first failing rule message). Construction and submission failures are
//! tagged enums that keep their origin; the renderer collapses any submission
//! failure into one generic user-facing banner message.

use std::collections::BTreeMap;

use thiserror::Error;

/// Field name → human-readable message. A non-empty map blocks submission.
pub type ErrorMap = BTreeMap<String, String>;

/// Errors raised while constructing a form from descriptors.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    #[error("field name must not be empty")]
    EmptyFieldName,

    #[error("select field {0:?} has no options")]
    MissingOptions(String),
}

/// Errors raised by the password hasher.
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("invalid work factor: {0}")]
    InvalidWorkFactor(u32),

    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("invalid password hash: {0}")]
    Parse(String),
}

/// Outcome of a failed submission attempt. Each variant keeps its origin;
/// use [`SubmitError::user_message`] for the single generic display string.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form validation failed")]
    ValidationFailed(ErrorMap),

    #[error("password hashing failed")]
    Hashing(#[source] PasswordHashError),

    #[error("submit handler failed: {0}")]
    Handler(String),

    #[error("a submission is already in progress")]
    AlreadySubmitting,
}

impl SubmitError {
    /// The generic banner message shown to the user regardless of cause.
    pub fn user_message(&self) -> &'static str {
        "Submission failed. Please try again."
    }

    /// Per-field messages, when the failure carries them.
    pub fn field_errors(&self) -> Option<&ErrorMap> {
        match self {
            SubmitError::ValidationFailed(map) => Some(map),
            _ => None,
        }
    }
}

/// Merge schema failures over caller-injected errors.
///
/// Injected entries survive unless a fresh schema failure addresses the same
/// field; schema messages win per key. Called fresh on every validation pass
/// so error-lifetime policy stays with the caller of the pipeline.
pub fn merge_errors(schema_errors: ErrorMap, injected: &ErrorMap) -> ErrorMap {
    let mut merged = injected.clone();
    merged.extend(schema_errors);
    merged
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn map(entries: &[(&str, &str)]) -> ErrorMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn merge_keeps_injected_entries() {
        let merged = merge_errors(
            map(&[("email", "Invalid email format")]),
            &map(&[("account", "Account is locked")]),
        );
        assert_eq!(
            merged,
            map(&[
                ("account", "Account is locked"),
                ("email", "Invalid email format"),
            ])
        );
    }

    #[test]
    fn schema_message_wins_per_field() {
        let merged = merge_errors(
            map(&[("email", "Invalid email format")]),
            &map(&[("email", "Server rejected address")]),
        );
        assert_eq!(merged, map(&[("email", "Invalid email format")]));
    }

    #[test]
    fn validation_failure_exposes_field_map() {
        let err = SubmitError::ValidationFailed(map(&[("password", "Password is required")]));
        assert!(err.field_errors().is_some());
        assert_eq!(err.user_message(), "Submission failed. Please try again.");
        assert!(SubmitError::AlreadySubmitting.field_errors().is_none());
    }
}
