//! Compile-time inlining of `#name` references.
//!
//! A reference is the [`REFERENCE_MARKER`] followed by a short name in the
//! referencing rule's namespace. The character right after the marker always
//! belongs to the name; the name then runs until one of
//! [`REFERENCE_BOUNDARIES`] or the end of the expression. Each reference is
//! replaced by the referenced expression wrapped in parentheses, leaving the
//! surrounding text untouched.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::NameKind;
use crate::{EngineError, Fqn, Rule};

/// Marks the start of a reference inside an expression.
pub const REFERENCE_MARKER: char = '#';

/// Characters that terminate the name of a reference.
pub const REFERENCE_BOUNDARIES: &[char] = &[
    ' ', '&', '|', '.', '(', ')', '[', ']', '{', '}', '+', '-', '/', '*', '=', '!',
];

type Key<'a> = (&'a str, &'a str);

/// One `#name` occurrence. `start..end` covers the marker and the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Reference<'a> {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) token: &'a str,
}

fn find_reference(expression: &str, from: usize) -> Option<Reference<'_>> {
    let start = from + expression[from..].find(REFERENCE_MARKER)?;
    let token_start = start + REFERENCE_MARKER.len_utf8();
    let end = match expression[token_start..].chars().next() {
        None => token_start,
        Some(first) => {
            let scan_from = token_start + first.len_utf8();
            expression[scan_from..]
                .find(REFERENCE_BOUNDARIES)
                .map_or(expression.len(), |i| scan_from + i)
        }
    };
    Some(Reference {
        start,
        end,
        token: &expression[token_start..end],
    })
}

pub(crate) fn first_reference(expression: &str) -> Option<Reference<'_>> {
    find_reference(expression, 0)
}

/// All references in `expression`, left to right.
pub(crate) fn references(expression: &str) -> impl Iterator<Item = Reference<'_>> {
    std::iter::successors(first_reference(expression), move |prev| {
        find_reference(expression, prev.end)
    })
}

/// Replace exactly the `reference` span with `(replacement)`.
pub(crate) fn splice(expression: &str, reference: &Reference<'_>, replacement: &str) -> String {
    let mut out = String::with_capacity(expression.len() + replacement.len() + 2);
    out.push_str(&expression[..reference.start]);
    out.push('(');
    out.push_str(replacement);
    out.push(')');
    out.push_str(&expression[reference.end..]);
    out
}

/// Inline every reference and drop subrules, keeping declaration order.
pub(crate) fn resolve(rules: &[Rule]) -> Result<Vec<Rule>, EngineError> {
    let rule_map = index_rules(rules)?;
    check_references(rules, &rule_map)?;
    check_cycles(rules, &rule_map)?;

    let expanded = expand(rules, &rule_map);
    Ok(expanded.into_iter().filter(|r| !r.is_subrule()).collect())
}

fn key(rule: &Rule) -> Key<'_> {
    (rule.namespace(), rule.name())
}

fn index_rules(rules: &[Rule]) -> Result<HashMap<Key<'_>, &Rule>, EngineError> {
    let mut rule_map = HashMap::with_capacity(rules.len());
    for rule in rules {
        if rule_map.insert(key(rule), rule).is_some() {
            return Err(EngineError::DuplicateName {
                kind: NameKind::Rule,
                name: rule.fqn().to_string(),
            });
        }
    }
    Ok(rule_map)
}

fn check_references(rules: &[Rule], rule_map: &HashMap<Key<'_>, &Rule>) -> Result<(), EngineError> {
    for rule in rules {
        for reference in references(rule.expression()) {
            if !rule_map.contains_key(&(rule.namespace(), reference.token)) {
                return Err(EngineError::NoSuchSubrule {
                    rule: rule.fqn(),
                    token: reference.token.to_owned(),
                    reference: Fqn::new(rule.namespace(), reference.token),
                });
            }
        }
    }
    Ok(())
}

/// Rewrite passes until no expression contains a reference. Each pass inlines
/// only the first reference of every expression. Terminates because the
/// reference graph was checked to be acyclic.
fn expand(rules: &[Rule], rule_map: &HashMap<Key<'_>, &Rule>) -> Vec<Rule> {
    let mut working = rules.to_vec();
    let mut passes = 0_usize;

    loop {
        let mut rewritten = 0_usize;
        for rule in &mut working {
            let Some(reference) = first_reference(rule.expression()) else {
                continue;
            };
            let target = rule_map[&(rule.namespace(), reference.token)];
            let expression = splice(rule.expression(), &reference, target.expression());
            *rule = rule.rewritten(expression);
            rewritten += 1;
        }
        if rewritten == 0 {
            break;
        }
        passes += 1;
        trace!(pass = passes, rewritten, "inlined subrule references");
    }

    debug!(passes, "subrule references resolved");
    working
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DfsState {
    Unvisited,
    InStack,
    Done,
}

fn check_cycles(rules: &[Rule], rule_map: &HashMap<Key<'_>, &Rule>) -> Result<(), EngineError> {
    let mut adj: HashMap<Key<'_>, Vec<Key<'_>>> = HashMap::with_capacity(rules.len());
    for rule in rules {
        let deps = references(rule.expression())
            .filter_map(|r| rule_map.get(&(rule.namespace(), r.token)).copied().map(key))
            .collect();
        adj.insert(key(rule), deps);
    }

    let mut state: HashMap<Key<'_>, DfsState> =
        rules.iter().map(|r| (key(r), DfsState::Unvisited)).collect();

    for rule in rules {
        let node = key(rule);
        if state.get(&node) == Some(&DfsState::Unvisited)
            && let Some(cycle) = dfs(node, &adj, &mut state)
        {
            return Err(EngineError::CyclicReference {
                path: cycle
                    .into_iter()
                    .map(|(ns, name)| Fqn::new(ns, name).to_string())
                    .collect(),
            });
        }
    }
    Ok(())
}

/// Walk the graph from `start` with an explicit stack. Returns the first
/// cycle found, first node repeated at the end.
fn dfs<'a>(
    start: Key<'a>,
    adj: &HashMap<Key<'a>, Vec<Key<'a>>>,
    state: &mut HashMap<Key<'a>, DfsState>,
) -> Option<Vec<Key<'a>>> {
    let mut path = vec![start];
    let mut next_edge = vec![0_usize];
    state.insert(start, DfsState::InStack);

    while let Some(&node) = path.last() {
        let top = next_edge.len() - 1;
        let Some(&neighbor) = adj.get(&node).and_then(|n| n.get(next_edge[top])) else {
            path.pop();
            next_edge.pop();
            state.insert(node, DfsState::Done);
            continue;
        };
        next_edge[top] += 1;
        match state.get(&neighbor) {
            Some(DfsState::InStack) => {
                let pos = path.iter().position(|&n| n == neighbor)?;
                let mut cycle = path[pos..].to_vec();
                cycle.push(neighbor);
                return Some(cycle);
            }
            Some(DfsState::Unvisited) | None => {
                state.insert(neighbor, DfsState::InStack);
                path.push(neighbor);
                next_edge.push(0);
            }
            Some(DfsState::Done) => {}
        }
    }
    None
}
