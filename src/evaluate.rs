use crate::evaluator::ExprError;
use crate::{ArithOp, Context, Expr, Value};

/// Named roots an expression can navigate from.
pub(crate) struct Scope<'a> {
    pub(crate) input_name: &'a str,
    pub(crate) input: &'a Context,
    pub(crate) statics: &'a Context,
}

impl Scope<'_> {
    fn resolve(&self, root: &str, segments: &[String]) -> Result<Value, ExprError> {
        if root == self.input_name {
            return Ok(lookup(self.input, segments));
        }
        if self.statics.contains_key(root) {
            let mut path = Vec::with_capacity(segments.len() + 1);
            path.push(root.to_owned());
            path.extend(segments.iter().cloned());
            return Ok(lookup(self.statics, &path));
        }
        Err(ExprError::UnknownIdentifier {
            name: root.to_owned(),
        })
    }
}

fn lookup(ctx: &Context, segments: &[String]) -> Value {
    ctx.get_segments(segments).cloned().unwrap_or(Value::Null)
}

pub(crate) fn eval(expr: &Expr, scope: &Scope<'_>) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Path { root, segments } => scope.resolve(root, segments),
        Expr::Compare { left, op, right } => {
            let l = eval(left, scope)?;
            let r = eval(right, scope)?;
            Ok(Value::Bool(l.compare(*op, &r)))
        }
        Expr::Arith { left, op, right } => {
            let l = eval(left, scope)?;
            let r = eval(right, scope)?;
            arith(*op, l, r)
        }
        Expr::Neg(inner) => match eval(inner, scope)? {
            Value::Int(i) => i.checked_neg().map(Value::Int).ok_or(ExprError::Overflow),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(ExprError::TypeMismatch {
                op: "-".to_owned(),
                left: other.kind(),
                right: None,
            }),
        },
        Expr::Not(inner) => Ok(Value::Bool(!eval_bool(inner, scope, "!")?)),
        Expr::And(a, b) => {
            Ok(Value::Bool(eval_bool(a, scope, "&&")? && eval_bool(b, scope, "&&")?))
        }
        Expr::Or(a, b) => {
            Ok(Value::Bool(eval_bool(a, scope, "||")? || eval_bool(b, scope, "||")?))
        }
    }
}

fn eval_bool(expr: &Expr, scope: &Scope<'_>, op: &str) -> Result<bool, ExprError> {
    match eval(expr, scope)? {
        Value::Bool(b) => Ok(b),
        other => Err(ExprError::TypeMismatch {
            op: op.to_owned(),
            left: other.kind(),
            right: None,
        }),
    }
}

#[allow(clippy::cast_precision_loss)]
fn arith(op: ArithOp, left: Value, right: Value) -> Result<Value, ExprError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            let result = match op {
                ArithOp::Add => a.checked_add(b),
                ArithOp::Sub => a.checked_sub(b),
                ArithOp::Mul => a.checked_mul(b),
                ArithOp::Div | ArithOp::Rem if b == 0 => return Err(ExprError::DivisionByZero),
                ArithOp::Div => a.checked_div(b),
                ArithOp::Rem => a.checked_rem(b),
            };
            result.map(Value::Int).ok_or(ExprError::Overflow)
        }
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(float_arith(op, a as f64, b))),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(float_arith(op, a, b as f64))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_arith(op, a, b))),
        (Value::String(a), Value::String(b)) if op == ArithOp::Add => Ok(Value::String(a + &b)),
        (l, r) => Err(ExprError::TypeMismatch {
            op: op.to_string(),
            left: l.kind(),
            right: Some(r.kind()),
        }),
    }
}

fn float_arith(op: ArithOp, a: f64, b: f64) -> f64 {
    match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
        ArithOp::Rem => a % b,
    }
}
