use winnow::ascii::digit1;
use winnow::combinator::{alt, cut_err, delimited, not, opt, preceded, repeat, terminated};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use super::MAX_DEPTH;
use crate::{ArithOp, CompareOp, Expr, Value};

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace())
        .void()
        .parse_next(input)
}

// -- Identifiers & paths ----------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_' || c == '$'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '$'
        }),
    )
        .take()
        .parse_next(input)
}

fn index_key(input: &mut &str) -> ModalResult<String> {
    alt((string_literal, digit1.map(|d: &str| d.to_owned()))).parse_next(input)
}

fn segment(input: &mut &str) -> ModalResult<String> {
    alt((
        preceded('.', cut_err(ident)).map(|s: &str| s.to_owned()),
        delimited(('[', ws), cut_err(index_key), (ws, cut_err(']'))),
    ))
    .parse_next(input)
}

fn path_or_keyword(input: &mut &str) -> ModalResult<Expr> {
    let root = ident.parse_next(input)?;
    let segments: Vec<String> = repeat(0.., segment).parse_next(input)?;
    if segments.is_empty() {
        match root {
            "true" => return Ok(Expr::Literal(Value::Bool(true))),
            "false" => return Ok(Expr::Literal(Value::Bool(false))),
            "null" => return Ok(Expr::Literal(Value::Null)),
            _ => {}
        }
    }
    Ok(Expr::path(root, segments))
}

// -- Literals ---------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    let quote = alt(('"', '\'')).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = cut_err(any).parse_next(input)?;
        match ch {
            c if c == quote => return Ok(s),
            '\\' => {
                let esc = cut_err(any).parse_next(input)?;
                match esc {
                    '"' | '\'' | '\\' => s.push(esc),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn number(input: &mut &str) -> ModalResult<Value> {
    let text = (digit1, opt(('.', digit1))).take().parse_next(input)?;
    if text.contains('.') {
        let f: f64 = text
            .parse()
            .map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(Value::Float(f))
    } else {
        let i: i64 = text
            .parse()
            .map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(Value::Int(i))
    }
}

// -- Operators --------------------------------------------------------------

fn compare_op(input: &mut &str) -> ModalResult<CompareOp> {
    ws.parse_next(input)?;
    alt((
        ">=".value(CompareOp::Gte),
        ">".value(CompareOp::Gt),
        "<=".value(CompareOp::Lte),
        "<".value(CompareOp::Lt),
        "==".value(CompareOp::Eq),
        "!=".value(CompareOp::Neq),
    ))
    .parse_next(input)
}

fn add_op(input: &mut &str) -> ModalResult<ArithOp> {
    ws.parse_next(input)?;
    alt(('+'.value(ArithOp::Add), '-'.value(ArithOp::Sub))).parse_next(input)
}

fn mul_op(input: &mut &str) -> ModalResult<ArithOp> {
    ws.parse_next(input)?;
    alt((
        '*'.value(ArithOp::Mul),
        '/'.value(ArithOp::Div),
        '%'.value(ArithOp::Rem),
    ))
    .parse_next(input)
}

// -- Depth bookkeeping ------------------------------------------------------
//
// Trees are built bottom-up and every new node is checked against
// MAX_DEPTH, so no tree deeper than the limit is ever allocated.

fn within_depth(input: &mut &str, depth: usize) -> ModalResult<()> {
    if depth > MAX_DEPTH {
        return Err(ErrMode::from_input(input).cut());
    }
    Ok(())
}

fn fold_binary<T>(
    input: &mut &str,
    first: Expr,
    rest: Vec<(T, Expr)>,
    node: impl Fn(Expr, T, Expr) -> Expr,
) -> ModalResult<Expr> {
    let mut depth = first.depth();
    let mut acc = first;
    for (op, right) in rest {
        depth = depth.max(right.depth()) + 1;
        within_depth(input, depth)?;
        acc = node(acc, op, right);
    }
    Ok(acc)
}

fn fold_prefix<T>(
    input: &mut &str,
    ops: Vec<T>,
    operand: Expr,
    node: impl Fn(Box<Expr>) -> Expr,
) -> ModalResult<Expr> {
    within_depth(input, operand.depth() + ops.len())?;
    Ok(ops
        .into_iter()
        .fold(operand, |inner, _| node(Box::new(inner))))
}

fn arith_node(left: Expr, op: ArithOp, right: Expr) -> Expr {
    Expr::Arith {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

// -- Expressions (precedence: || < && < ! < comparison < + - < * / % < unary -)

fn primary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((
        delimited('(', cut_err(expr), (ws, cut_err(')'))),
        string_literal.map(|s| Expr::Literal(Value::String(s))),
        number.map(Expr::Literal),
        path_or_keyword,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

fn negation(input: &mut &str) -> ModalResult<Expr> {
    let signs: Vec<char> = repeat(0.., preceded(ws, '-')).parse_next(input)?;
    let operand = if signs.is_empty() {
        primary(input)?
    } else {
        cut_err(primary).parse_next(input)?
    };
    fold_prefix(input, signs, operand, Expr::Neg)
}

fn multiplicative(input: &mut &str) -> ModalResult<Expr> {
    let first = negation(input)?;
    let rest: Vec<(ArithOp, Expr)> = repeat(0.., (mul_op, cut_err(negation))).parse_next(input)?;
    fold_binary(input, first, rest, arith_node)
}

fn additive(input: &mut &str) -> ModalResult<Expr> {
    let first = multiplicative(input)?;
    let rest: Vec<(ArithOp, Expr)> =
        repeat(0.., (add_op, cut_err(multiplicative))).parse_next(input)?;
    fold_binary(input, first, rest, arith_node)
}

fn comparison(input: &mut &str) -> ModalResult<Expr> {
    let left = additive(input)?;
    if let Some(op) = opt(compare_op).parse_next(input)? {
        let right = cut_err(additive).parse_next(input)?;
        within_depth(input, left.depth().max(right.depth()) + 1)?;
        Ok(Expr::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    } else {
        Ok(left)
    }
}

fn unary(input: &mut &str) -> ModalResult<Expr> {
    let bangs: Vec<(char, ())> = repeat(0.., preceded(ws, ('!', not('=')))).parse_next(input)?;
    let operand = if bangs.is_empty() {
        comparison(input)?
    } else {
        cut_err(comparison).parse_next(input)?
    };
    fold_prefix(input, bangs, operand, Expr::Not)
}

fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = unary(input)?;
    let rest: Vec<((), Expr)> =
        repeat(0.., ((ws, "&&").void(), cut_err(unary))).parse_next(input)?;
    fold_binary(input, first, rest, |a, (), b| Expr::And(Box::new(a), Box::new(b)))
}

fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = and_expr(input)?;
    let rest: Vec<((), Expr)> =
        repeat(0.., ((ws, "||").void(), cut_err(and_expr))).parse_next(input)?;
    fold_binary(input, first, rest, |a, (), b| Expr::Or(Box::new(a), Box::new(b)))
}

fn expr(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Top-level parser -------------------------------------------------------

pub(crate) fn expression(input: &mut &str) -> ModalResult<Expr> {
    terminated(expr, ws).parse_next(input)
}
