use thiserror::Error;

/// A rule expression that the bundled language could not read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error: {message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The parser's description, without the `parse error:` prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
