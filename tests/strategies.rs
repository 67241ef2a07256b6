#![allow(dead_code)]

use proptest::prelude::*;
use proptest::sample::Index;
use rulebook::{Context, Rule};

// --- Fixed input schema ---
// input.age    : i64 (0..=120)
// input.status : string, one of {"active", "inactive", "suspended"}
// input.banned : bool

pub const NAMESPACE: &str = "ch.maxant.generated";
pub const NAMESPACES: &[&str] = &["v1.namespace", "v2.namespace", "v10.other"];

const STATUSES: &[&str] = &["active", "inactive", "suspended"];
const OUTCOMES: &[&str] = &["A", "B", "C", "D"];

/// Generate an input that aligns with the fixed schema.
pub fn arb_context() -> impl Strategy<Value = Context> {
    (0_i64..=120, prop::sample::select(STATUSES), any::<bool>()).prop_map(
        |(age, status, banned)| {
            Context::new()
                .set("age", age)
                .set("status", status)
                .set("banned", banned)
        },
    )
}

/// A single comparison on one field of the schema.
fn arb_leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        (
            prop::sample::select(&["==", "!=", ">", ">=", "<", "<="][..]),
            0_i64..=120
        )
            .prop_map(|(op, val)| format!("input.age {op} {val}")),
        (prop::sample::select(STATUSES), prop::bool::ANY).prop_map(|(val, is_eq)| {
            let op = if is_eq { "==" } else { "!=" };
            format!("input.status {op} \"{val}\"")
        }),
        any::<bool>().prop_map(|val| format!("input.banned == {val}")),
    ]
}

/// A boolean expression over the schema, without references, bounded depth.
pub fn arb_expression() -> impl Strategy<Value = String> {
    arb_leaf().prop_recursive(2, 8, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a}) && ({b})")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a}) || ({b})")),
            inner.prop_map(|a| format!("!({a})")),
        ]
    })
}

/// An expression as declared (with `#name` references) and the text it must
/// resolve to.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub source: String,
    pub inlined: String,
}

impl Fragment {
    fn plain(expression: String) -> Self {
        Self {
            source: expression.clone(),
            inlined: expression,
        }
    }

    /// Combine `expression` with a reference to `target`. `shape` picks the
    /// position of the reference; 3 means no reference.
    fn with_reference(expression: String, target: Option<(&str, &Fragment)>, shape: u8) -> Self {
        let Some((name, target)) = target else {
            return Self::plain(expression);
        };
        let inlined = &target.inlined;
        match shape {
            0 => Self {
                source: format!("#{name} && ({expression})"),
                inlined: format!("({inlined}) && ({expression})"),
            },
            1 => Self {
                source: format!("({expression}) || #{name}"),
                inlined: format!("({expression}) || ({inlined})"),
            },
            2 => Self {
                source: format!("!#{name}"),
                inlined: format!("!({inlined})"),
            },
            _ => Self::plain(expression),
        }
    }
}

/// A generated rule.
#[derive(Debug, Clone)]
pub struct GenRule {
    pub namespace: &'static str,
    pub name: String,
    pub expression: Fragment,
    pub priority: i32,
    pub outcome: &'static str,
}

impl GenRule {
    fn record(&self, expression: &str) -> Rule {
        Rule::new(self.namespace, self.name.as_str(), expression)
            .expect("generated rule should be valid")
            .with_outcome(self.outcome)
            .with_priority(self.priority)
    }
}

/// A generated rule book: subrules first, then rules, all in [`NAMESPACE`].
#[derive(Debug, Clone)]
pub struct GenBook {
    pub subrules: Vec<(String, Fragment)>,
    pub rules: Vec<GenRule>,
}

impl GenBook {
    /// Records as they would be declared.
    #[must_use]
    pub fn records(&self) -> Vec<Rule> {
        let subrules = self.subrules.iter().map(|(name, fragment)| {
            Rule::subrule(NAMESPACE, name.as_str(), fragment.source.as_str())
                .expect("generated subrule should be valid")
        });
        let rules = self.rules.iter().map(|r| r.record(&r.expression.source));
        subrules.chain(rules).collect()
    }

    /// The same rules with every reference already inlined by hand.
    #[must_use]
    pub fn inlined_records(&self) -> Vec<Rule> {
        self.rules
            .iter()
            .map(|r| r.record(&r.expression.inlined))
            .collect()
    }
}

/// Generate a book where subrule `i` may reference any subrule before it and
/// every rule may reference any subrule. Priorities come from a small range
/// so ties are common.
pub fn arb_book() -> impl Strategy<Value = GenBook> {
    let subrule_shapes =
        prop::collection::vec((arb_expression(), any::<Index>(), 0_u8..4), 0..=4);
    let rule_shapes = prop::collection::vec(
        (
            arb_expression(),
            any::<Index>(),
            0_u8..4,
            0_i32..3,
            prop::sample::select(OUTCOMES),
        ),
        1..=6,
    );

    (subrule_shapes, rule_shapes).prop_map(|(subrule_shapes, rule_shapes)| {
        let mut subrules: Vec<(String, Fragment)> = Vec::new();
        for (i, (expression, target, shape)) in subrule_shapes.into_iter().enumerate() {
            let fragment = {
                let target = (i > 0).then(|| {
                    let (name, fragment) = &subrules[target.index(i)];
                    (name.as_str(), fragment)
                });
                Fragment::with_reference(expression, target, shape)
            };
            subrules.push((format!("s{i}"), fragment));
        }

        let rules = rule_shapes
            .into_iter()
            .enumerate()
            .map(|(i, (expression, target, shape, priority, outcome))| {
                let target = (!subrules.is_empty()).then(|| {
                    let (name, fragment) = &subrules[target.index(subrules.len())];
                    (name.as_str(), fragment)
                });
                GenRule {
                    namespace: NAMESPACE,
                    name: format!("r{i}"),
                    expression: Fragment::with_reference(expression, target, shape),
                    priority,
                    outcome,
                }
            })
            .collect();

        GenBook { subrules, rules }
    })
}

/// Generate 1..=8 reference-free rules spread over [`NAMESPACES`].
pub fn arb_flat_rules() -> impl Strategy<Value = Vec<GenRule>> {
    prop::collection::vec(
        (
            prop::sample::select(NAMESPACES),
            arb_expression(),
            0_i32..3,
            prop::sample::select(OUTCOMES),
        ),
        1..=8,
    )
    .prop_map(|shapes| {
        shapes
            .into_iter()
            .enumerate()
            .map(|(i, (namespace, expression, priority, outcome))| GenRule {
                namespace,
                name: format!("r{i}"),
                expression: Fragment::plain(expression),
                priority,
                outcome,
            })
            .collect()
    })
}

/// Records for reference-free rules.
#[must_use]
pub fn flat_records(rules: &[GenRule]) -> Vec<Rule> {
    rules
        .iter()
        .map(|r| r.record(&r.expression.source))
        .collect()
}
