mod action;
mod context;
mod error;
mod expr;
mod match_report;
mod rule;
mod value;

pub use action::{Action, ActionError, FnAction, action};
pub use context::Context;
pub use error::RuleError;
pub use expr::{ArithOp, CompareOp, Expr};
pub use match_report::MatchReport;
pub use rule::{FQN_SEPARATOR, Fqn, Rule, RuleKind, SUBRULE_PRIORITY};
pub use value::Value;
