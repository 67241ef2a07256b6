use std::cmp::Ordering;
use std::fmt;

use super::expr::CompareOp;

/// Values produced and consumed by the bundled expression language.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// A UTF-8 string.
    String(String),
    /// Absence of a value. Missing fields resolve to `Null`.
    Null,
}

impl Value {
    /// Compare this value to another using the given operator.
    ///
    /// Values of different kinds are never equal. Ordering operators on
    /// incompatible kinds (or on bools and nulls) yield `false`.
    #[must_use]
    pub fn compare(&self, op: CompareOp, other: &Value) -> bool {
        match op {
            CompareOp::Eq => self.partial_cmp_value(other) == Some(Ordering::Equal),
            CompareOp::Neq => self.partial_cmp_value(other) != Some(Ordering::Equal),
            CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte => {
                if !self.is_ordered() || !other.is_ordered() {
                    return false;
                }
                match self.partial_cmp_value(other) {
                    Some(ord) => match op {
                        CompareOp::Gt => ord == Ordering::Greater,
                        CompareOp::Gte => ord != Ordering::Less,
                        CompareOp::Lt => ord == Ordering::Less,
                        _ => ord != Ordering::Greater,
                    },
                    None => false,
                }
            }
        }
    }

    /// Short name of the value's kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Null => "null",
        }
    }

    fn is_ordered(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::String(_))
    }

    #[allow(clippy::cast_precision_loss)]
    fn partial_cmp_value(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
            Value::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_conversions() {
        assert_eq!(Value::from(42_i64), Value::Int(42));
        assert_eq!(Value::from(7_i32), Value::Int(7));
        assert_eq!(Value::from(2.5_f64), Value::Float(2.5));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("hello"), Value::String("hello".to_owned()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_owned()));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::String("hello".into()).to_string(), "\"hello\"");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn compare_int() {
        let a = Value::Int(10);
        let b = Value::Int(20);
        assert!(!a.compare(CompareOp::Eq, &b));
        assert!(a.compare(CompareOp::Neq, &b));
        assert!(a.compare(CompareOp::Lt, &b));
        assert!(a.compare(CompareOp::Lte, &b));
        assert!(!a.compare(CompareOp::Gt, &b));
        assert!(!a.compare(CompareOp::Gte, &b));
        assert!(a.compare(CompareOp::Gte, &a));
        assert!(a.compare(CompareOp::Lte, &a));
    }

    #[test]
    fn compare_int_float_cross_type() {
        let i = Value::Int(10);
        let f = Value::Float(10.0);
        assert!(i.compare(CompareOp::Eq, &f));
        assert!(f.compare(CompareOp::Eq, &i));
        assert!(i.compare(CompareOp::Lt, &Value::Float(10.5)));
    }

    #[test]
    fn compare_string() {
        let a = Value::String("apple".into());
        let b = Value::String("banana".into());
        assert!(a.compare(CompareOp::Lt, &b));
        assert!(!a.compare(CompareOp::Eq, &b));
    }

    #[test]
    fn compare_bool_only_equality() {
        let t = Value::Bool(true);
        let f = Value::Bool(false);
        assert!(t.compare(CompareOp::Eq, &t));
        assert!(t.compare(CompareOp::Neq, &f));
        assert!(!t.compare(CompareOp::Gt, &f));
    }

    #[test]
    fn compare_mismatched_kinds() {
        let i = Value::Int(1);
        let s = Value::String("1".into());
        assert!(!i.compare(CompareOp::Eq, &s));
        assert!(i.compare(CompareOp::Neq, &s));
        assert!(!i.compare(CompareOp::Lt, &s));
        assert!(!i.compare(CompareOp::Gt, &s));
    }

    #[test]
    fn compare_null() {
        assert!(Value::Null.compare(CompareOp::Eq, &Value::Null));
        assert!(!Value::Null.compare(CompareOp::Eq, &Value::Int(0)));
        assert!(!Value::Null.compare(CompareOp::Lt, &Value::Int(0)));
        assert!(!Value::Int(0).compare(CompareOp::Gte, &Value::Null));
    }
}
