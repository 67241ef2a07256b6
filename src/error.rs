use std::fmt;

use thiserror::Error;

use crate::{ActionError, Fqn, RuleError};

/// Boxed error from a pluggable collaborator (evaluator or action), kept as is.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What a duplicated name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Rule,
    Action,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::Rule => write!(f, "rule"),
            NameKind::Action => write!(f, "action"),
        }
    }
}

/// Errors raised by [`Engine`](crate::Engine) construction, matching and
/// action dispatch.
///
/// Evaluator and action failures are wrapped with the rule or action they
/// came from; the original error is available unmodified through
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: NameKind, name: String },

    #[error(
        "unable to replace #{token} in rule '{rule}': no rule or subrule named '{reference}'"
    )]
    NoSuchSubrule {
        rule: Fqn,
        token: String,
        reference: Fqn,
    },

    #[error("cyclic reference detected: {}", .path.join(" -> "))]
    CyclicReference { path: Vec<String> },

    #[error("failed to compile rule '{rule}'")]
    Compile {
        rule: Fqn,
        #[source]
        source: BoxError,
    },

    #[error("invalid namespace pattern")]
    NamespacePattern(#[from] regex::Error),

    #[error("evaluation of rule '{rule}' failed")]
    Evaluation {
        rule: Fqn,
        #[source]
        source: BoxError,
    },

    #[error("no matching rule found")]
    NoMatchingRule,

    #[error("best matching rule '{rule}' declares no outcome")]
    MissingOutcome { rule: Fqn },

    #[error("no action has been associated with the outcome \"{outcome}\"")]
    NoActionFound { outcome: String },

    #[error("action '{action}' failed")]
    Action {
        action: String,
        #[source]
        source: ActionError,
    },
}
