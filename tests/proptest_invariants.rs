mod strategies;

use proptest::prelude::*;
use rulebook::{Context, Engine, EngineError, NameKind, Rule};
use strategies::{
    GenBook, NAMESPACE, arb_book, arb_context, arb_flat_rules, flat_records,
};

fn names<'a>(rules: &[&'a Rule]) -> Vec<&'a str> {
    rules.iter().map(|&r| r.name()).collect()
}

fn declaration_index(engine: &Engine, rule: &Rule) -> usize {
    engine
        .rules()
        .iter()
        .position(|r| r.fqn() == rule.fqn())
        .expect("matched rule must be compiled")
}

fn build(book: &GenBook) -> Engine {
    Engine::new(book.records()).expect("generated book should build")
}

// ---------------------------------------------------------------------------
// Invariant 1: Construction
//
// A book with unique names and resolvable references builds. The compiled
// list holds exactly the rules (no subrules) in declaration order, and every
// reference is replaced by the parenthesised text it names.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn compiled_rules_keep_declaration_order(book in arb_book()) {
        let engine = build(&book);
        let compiled: Vec<&str> = engine.rules().iter().map(Rule::name).collect();
        let declared: Vec<&str> = book.rules.iter().map(|r| r.name.as_str()).collect();
        prop_assert_eq!(compiled, declared);
        prop_assert!(engine.rules().iter().all(|r| !r.is_subrule()));
    }

    #[test]
    fn inlining_is_exact_and_complete(book in arb_book()) {
        let engine = build(&book);
        for (rule, generated) in engine.rules().iter().zip(&book.rules) {
            prop_assert!(!rule.expression().contains('#'), "unresolved: {}", rule);
            prop_assert_eq!(rule.expression(), generated.expression.inlined.as_str());
        }
    }

    #[test]
    fn resolution_preserves_attributes(book in arb_book()) {
        let engine = build(&book);
        for (rule, generated) in engine.rules().iter().zip(&book.rules) {
            prop_assert_eq!(rule.outcome(), Some(generated.outcome));
            prop_assert_eq!(rule.priority(), generated.priority);
            prop_assert_eq!(rule.namespace(), NAMESPACE);
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Inlined references match like hand-written expressions
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn references_match_like_inlined_text(book in arb_book(), ctx in arb_context()) {
        let referenced = build(&book);
        let by_hand = Engine::new(book.inlined_records()).expect("inlined book should build");

        let a = referenced.matches(&ctx, None).unwrap();
        let b = by_hand.matches(&ctx, None).unwrap();
        prop_assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn matching_is_deterministic(book in arb_book(), ctx in arb_context()) {
        let engine = build(&book);
        let first = names(&engine.matches(&ctx, None).unwrap());
        for _ in 0..5 {
            let again = names(&engine.matches(&ctx, None).unwrap());
            prop_assert_eq!(&first, &again);
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Ranking
//
// Matches are ordered by priority descending; equal priorities keep
// declaration order. The best outcome is the outcome of the first match.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn ranking_is_priority_descending_and_stable(rules in arb_flat_rules(), ctx in arb_context()) {
        let engine = Engine::new(flat_records(&rules)).unwrap();
        let matched = engine.matches(&ctx, None).unwrap();

        for pair in matched.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(a.priority() >= b.priority(), "{} ranked before {}", a, b);
            if a.priority() == b.priority() {
                prop_assert!(declaration_index(&engine, a) < declaration_index(&engine, b));
            }
        }

        match engine.best_outcome(&ctx, None) {
            Ok(outcome) => prop_assert_eq!(outcome, matched[0].outcome()),
            Err(EngineError::NoMatchingRule) => prop_assert!(matched.is_empty()),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn report_accounts_for_every_rule(rules in arb_flat_rules(), ctx in arb_context()) {
        let engine = Engine::new(flat_records(&rules)).unwrap();
        let report = engine.matches_detailed(&ctx, Some("^v1")).unwrap();
        prop_assert_eq!(report.evaluated() + report.filtered_out(), engine.len());
        prop_assert_eq!(
            names(report.matched()),
            names(&engine.matches(&ctx, Some("^v1")).unwrap())
        );
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: Namespace scoping
//
// Filtering keeps exactly the matches whose namespace contains the pattern,
// in the same relative order.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn namespace_filter_is_a_subsequence(rules in arb_flat_rules(), ctx in arb_context()) {
        let engine = Engine::new(flat_records(&rules)).unwrap();
        let all = engine.matches(&ctx, None).unwrap();

        for pattern in [r"v1\.namespace", "namespace", "^v1", "other$"] {
            let regex = regex::Regex::new(pattern).unwrap();
            let expected: Vec<&str> = all
                .iter()
                .filter(|r| regex.is_match(r.namespace()))
                .map(|&r| r.name())
                .collect();
            let scoped = engine.matches(&ctx, Some(pattern)).unwrap();
            prop_assert_eq!(names(&scoped), expected, "pattern {}", pattern);
        }
    }

    #[test]
    fn v1_filter_excludes_v2(rules in arb_flat_rules(), ctx in arb_context()) {
        let engine = Engine::new(flat_records(&rules)).unwrap();
        let scoped = engine.matches(&ctx, Some(r"v1\.namespace")).unwrap();
        prop_assert!(scoped.iter().all(|r| r.namespace() == "v1.namespace"));
    }
}

// ---------------------------------------------------------------------------
// Invariant 5: Duplicate names are rejected
//
// Between two rules, two subrules, or one of each.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn duplicate_fqn_is_rejected(
        book in arb_book(),
        pick in any::<prop::sample::Index>(),
        as_subrule in any::<bool>(),
    ) {
        let mut records = book.records();
        let original = &records[pick.index(records.len())];
        let duplicate = if as_subrule {
            Rule::subrule(original.namespace(), original.name(), "true").unwrap()
        } else {
            Rule::new(original.namespace(), original.name(), "true")
                .unwrap()
                .with_outcome("A")
        };
        let fqn = original.fqn().to_string();
        records.push(duplicate);

        match Engine::new(records) {
            Err(EngineError::DuplicateName { kind: NameKind::Rule, name }) => {
                prop_assert_eq!(name, fqn);
            }
            other => prop_assert!(false, "expected DuplicateName, got {:?}", other.map(|e| e.len())),
        }
    }
}

#[test]
fn empty_rule_set_matches_nothing() {
    let engine = Engine::new(flat_records(&[])).unwrap();
    assert!(engine.matches(&Context::new(), None).unwrap().is_empty());
}
