mod error;
mod grammar;

pub use error::ParseError;

use crate::Expr;

/// Deepest parenthesised grouping accepted by [`parse`]. Every inlined
/// subrule adds one level.
pub const MAX_NESTING: usize = 64;

/// Deepest operator tree accepted by [`parse`], counting every node from the
/// root to the deepest leaf.
pub const MAX_DEPTH: usize = 256;

/// Parse an expression of the bundled language into an [`Expr`].
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a complete, valid expression,
/// nests groups deeper than [`MAX_NESTING`] or builds a tree deeper than
/// [`MAX_DEPTH`].
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    use winnow::Parser;

    let nesting = group_nesting(input);
    if nesting > MAX_NESTING {
        return Err(ParseError::new(format!(
            "groups nested {nesting} deep, at most {MAX_NESTING} allowed"
        )));
    }
    grammar::expression
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}

/// Deepest `(` nesting outside string literals. Unbalanced input is left for
/// the grammar to report.
fn group_nesting(input: &str) -> usize {
    let mut open = 0_usize;
    let mut deepest = 0_usize;
    let mut quote = None;
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => {
                open += 1;
                deepest = deepest.max(open);
            }
            (None, ')') => open = open.saturating_sub(1),
            (None, _) => {}
        }
    }
    deepest
}
