use std::fmt;

use super::Value;

/// Comparison operators supported in rule expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Arithmetic operators supported in rule expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Parsed form of an expression in the bundled language.
///
/// Produced by [`ExprEvaluator::compile`](crate::Evaluator::compile) once per
/// rule at engine construction and interpreted on every match.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// A root identifier followed by zero or more member/index segments.
    Path {
        root: String,
        segments: Vec<String>,
    },
    Compare {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
    Arith {
        left: Box<Expr>,
        op: ArithOp,
        right: Box<Expr>,
    },
    Neg(Box<Expr>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithOp::Add => write!(f, "+"),
            ArithOp::Sub => write!(f, "-"),
            ArithOp::Mul => write!(f, "*"),
            ArithOp::Div => write!(f, "/"),
            ArithOp::Rem => write!(f, "%"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Path { root, segments } => {
                write!(f, "{root}")?;
                for segment in segments {
                    write!(f, "[\"{segment}\"]")?;
                }
                Ok(())
            }
            Expr::Compare { left, op, right } => write!(f, "({left} {op} {right})"),
            Expr::Arith { left, op, right } => write!(f, "({left} {op} {right})"),
            Expr::Neg(inner) => write!(f, "(-{inner})"),
            Expr::Not(inner) => write!(f, "(!{inner})"),
            Expr::And(a, b) => write!(f, "({a} && {b})"),
            Expr::Or(a, b) => write!(f, "({a} || {b})"),
        }
    }
}

impl Expr {
    pub(crate) fn path(root: &str, segments: Vec<String>) -> Expr {
        Expr::Path {
            root: root.to_owned(),
            segments,
        }
    }

    /// Number of nodes on the longest path from this node to a leaf.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1_usize)];
        while let Some((expr, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            match expr {
                Expr::Literal(_) | Expr::Path { .. } => {}
                Expr::Neg(inner) | Expr::Not(inner) => pending.push((inner.as_ref(), depth + 1)),
                Expr::Compare { left, right, .. }
                | Expr::Arith { left, right, .. }
                | Expr::And(left, right)
                | Expr::Or(left, right) => {
                    pending.push((left.as_ref(), depth + 1));
                    pending.push((right.as_ref(), depth + 1));
                }
            }
        }
        deepest
    }
}
