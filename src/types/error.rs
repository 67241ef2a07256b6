use thiserror::Error;

/// Errors raised while constructing a [`Rule`](super::Rule) record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule {field} may not be empty")]
    MissingField { field: &'static str },
}
