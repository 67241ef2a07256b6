use thiserror::Error;

use crate::evaluate::{Scope, eval};
use crate::parse::{ParseError, parse};
use crate::{Context, Expr, Value};

/// Name under which the caller's input is bound unless configured otherwise.
pub const DEFAULT_INPUT_NAME: &str = "input";

/// The expression language an [`Engine`](crate::Engine) matches with.
///
/// Every rule expression is compiled once when the engine is built and then
/// evaluated against each input. Implementations must be free of shared
/// mutable state for concurrent matching on one engine to stay deterministic.
pub trait Evaluator: Send + Sync {
    /// The object rules are evaluated against.
    type Input;
    /// Pre-processed form of one expression.
    type Compiled: Send + Sync;
    type Error: std::error::Error + Send + Sync + 'static;

    /// # Errors
    ///
    /// Returns an error if `expression` is malformed.
    fn compile(&self, expression: &str) -> Result<Self::Compiled, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if evaluation fails or does not produce a boolean.
    fn evaluate(
        &self,
        compiled: &Self::Compiled,
        input: &Self::Input,
    ) -> Result<bool, Self::Error>;
}

/// Errors produced by [`ExprEvaluator`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error("syntax error in expression '{expression}'")]
    Syntax {
        expression: String,
        #[source]
        source: ParseError,
    },

    #[error("expression evaluated to {found}, not a boolean")]
    NotBoolean { found: Value },

    #[error("unknown identifier '{name}'")]
    UnknownIdentifier { name: String },

    #[error("operator '{op}' cannot be applied to {left}{}", .right.map(|r| format!(" and {r}")).unwrap_or_default())]
    TypeMismatch {
        op: String,
        left: &'static str,
        right: Option<&'static str>,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,
}

/// The bundled expression language.
///
/// Operates on a [`Context`] bound under [`DEFAULT_INPUT_NAME`] (configurable
/// with [`with_input_name`](Self::with_input_name)). Supports `&&`, `||`, `!`,
/// comparisons, arithmetic, string/number/bool/`null` literals and paths such
/// as `input.person.age` or `input.map["travelClass"]`.
///
/// # Example
///
/// ```
/// use rulebook::{Context, Evaluator, ExprEvaluator};
///
/// let evaluator = ExprEvaluator::new().with_static("ADULT", 18_i64);
/// let compiled = evaluator.compile("input.age >= ADULT").unwrap();
/// let input = Context::new().set("age", 35_i64);
/// assert!(evaluator.evaluate(&compiled, &input).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct ExprEvaluator {
    input_name: String,
    statics: Context,
}

impl Default for ExprEvaluator {
    fn default() -> Self {
        Self {
            input_name: DEFAULT_INPUT_NAME.to_owned(),
            statics: Context::new(),
        }
    }
}

impl ExprEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the input under `name` instead of `input`.
    #[must_use]
    pub fn with_input_name(mut self, name: impl Into<String>) -> Self {
        self.input_name = name.into();
        self
    }

    /// Make a constant visible to every expression at a dot-separated path.
    #[must_use]
    pub fn with_static(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.statics.insert(path, value.into());
        self
    }

    #[must_use]
    pub fn input_name(&self) -> &str {
        &self.input_name
    }
}

impl Evaluator for ExprEvaluator {
    type Input = Context;
    type Compiled = Expr;
    type Error = ExprError;

    fn compile(&self, expression: &str) -> Result<Expr, ExprError> {
        parse(expression).map_err(|source| ExprError::Syntax {
            expression: expression.to_owned(),
            source,
        })
    }

    fn evaluate(&self, compiled: &Expr, input: &Context) -> Result<bool, ExprError> {
        let scope = Scope {
            input_name: &self.input_name,
            input,
            statics: &self.statics,
        };
        match eval(compiled, &scope)? {
            Value::Bool(b) => Ok(b),
            found => Err(ExprError::NotBoolean { found }),
        }
    }
}
