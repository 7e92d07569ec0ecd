//! Typed success/failure result crossing the workflow boundary.

use orderflow_core::DomainError;

/// Result type returned by every workflow operation.
pub type AppResult<T> = Result<T, Failure>;

/// A workflow failure carrying one or more human-readable messages.
///
/// Both expected business-rule violations and unexpected infrastructure
/// errors end up here; the caller (HTTP/CLI layer) renders the messages
/// without needing to know which kind occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    errors: Vec<String>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    pub fn many(errors: Vec<String>) -> Self {
        Self { errors }
    }

    /// The first (primary) error message.
    pub fn message(&self) -> &str {
        self.errors.first().map(String::as_str).unwrap_or("")
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl core::fmt::Display for Failure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.errors.join("; "))
    }
}

impl From<DomainError> for Failure {
    fn from(err: DomainError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("unexpected error: {err}"))
    }
}
