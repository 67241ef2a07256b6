mod dispatch;
mod engine;
mod error;
mod evaluate;
mod evaluator;
pub mod parse;
mod resolve;
mod types;

pub use engine::{Engine, EngineBuilder, RuleBuilder};
pub use error::{BoxError, EngineError, NameKind};
pub use evaluator::{DEFAULT_INPUT_NAME, Evaluator, ExprError, ExprEvaluator};
pub use parse::ParseError;
pub use resolve::{REFERENCE_BOUNDARIES, REFERENCE_MARKER};
pub use types::{
    Action, ActionError, ArithOp, CompareOp, Context, Expr, FQN_SEPARATOR, FnAction, Fqn,
    MatchReport, Rule, RuleError, RuleKind, SUBRULE_PRIORITY, Value, action,
};
