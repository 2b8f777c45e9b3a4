//! Shared plumbing: the fault type, the expected-failure taxonomy and the structured
//! outcome every shell operation returns.

pub mod utils;

use thiserror::Error;

/// Host I/O faults (disk full, OS-level permission denied, cross-device errors).
/// They abort the current command, never the session.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Expected, recoverable conditions local to a single command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    #[error("'{0}' does not exist.")]
    NotFound(String),

    #[error("'{0}' already exists.")]
    AlreadyExists(String),

    #[error("'{name}' is not a {expected}.")]
    WrongKind { name: String, expected: &'static str },

    #[error("{0}")]
    InvalidArgument(String),
}

impl Failure {
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Failure::NotFound(name.into())
    }

    pub fn already_exists<S: Into<String>>(name: S) -> Self {
        Failure::AlreadyExists(name.into())
    }

    pub fn not_a_file<S: Into<String>>(name: S) -> Self {
        Failure::WrongKind {
            name: name.into(),
            expected: "file",
        }
    }

    pub fn not_a_directory<S: Into<String>>(name: S) -> Self {
        Failure::WrongKind {
            name: name.into(),
            expected: "directory",
        }
    }

    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Failure::InvalidArgument(message.into())
    }
}

/// Result of a shell operation that ran to completion: either done with a payload and a
/// human-readable message, or failed with a [`Failure`] (whose `Display` is the message).
#[derive(Debug)]
pub struct Outcome<T = ()> {
    result: std::result::Result<T, Failure>,
    message: String,
}

impl<T> Outcome<T> {
    pub fn done<S: Into<String>>(value: T, message: S) -> Self {
        Self {
            result: Ok(value),
            message: message.into(),
        }
    }

    pub fn failed(failure: Failure) -> Self {
        let message = failure.to_string();
        Self {
            result: Err(failure),
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.result.as_ref().err()
    }

    pub fn into_result(self) -> std::result::Result<T, Failure> {
        self.result
    }
}

impl Outcome<()> {
    pub fn ok<S: Into<String>>(message: S) -> Self {
        Self::done((), message)
    }
}

impl<T> From<Failure> for Outcome<T> {
    fn from(failure: Failure) -> Self {
        Outcome::failed(failure)
    }
}

/// Returns a failed outcome for `failure`, logging the refusal.
pub(crate) fn refuse<T>(failure: Failure) -> Result<Outcome<T>> {
    tracing::warn!(%failure, "operation refused");
    Ok(Outcome::failed(failure))
}

/// Unwraps a `std::result::Result<T, Failure>` inside a function returning
/// `Result<Outcome<_>>`, turning the failure into a failed outcome.
macro_rules! checked {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(failure) => return $crate::core::refuse(failure),
        }
    };
}

pub(crate) use checked;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_done_outcome_carries_value_and_message() {
        let outcome = Outcome::done(42, "answer found");
        assert!(outcome.is_success());
        assert_eq!(outcome.value(), Some(&42));
        assert_eq!(outcome.message(), "answer found");
        assert!(outcome.failure().is_none());
    }

    #[test]
    fn test_failed_outcome_uses_failure_display() {
        let outcome: Outcome<u8> = Failure::not_found("a.txt").into();
        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), "'a.txt' does not exist.");
        assert_eq!(outcome.failure(), Some(&Failure::NotFound("a.txt".into())));
        assert!(outcome.value().is_none());
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            Failure::already_exists("b").to_string(),
            "'b' already exists."
        );
        assert_eq!(Failure::not_a_file("dir").to_string(), "'dir' is not a file.");
        assert_eq!(
            Failure::not_a_directory("f").to_string(),
            "'f' is not a directory."
        );
        assert_eq!(Failure::invalid("bad value").to_string(), "bad value");
    }
}
