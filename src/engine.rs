use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::time::Instant;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::evaluator::{Evaluator, ExprEvaluator};
use crate::resolve::resolve;
use crate::{EngineError, Fqn, MatchReport, Rule, RuleError};

/// Builder for constructing an [`Engine`].
///
/// Rules are declared in order; declaration order is the tie-break between
/// equal priorities when matching.
///
/// # Example
///
/// ```
/// use rulebook::{Context, Engine};
///
/// let engine = Engine::builder()
///     .subrule("tarifs", "Youth", |r| r.when("input.person.age < 26"))
///     .rule("tarifs", "YouthTarif", |r| {
///         r.when("#Youth").outcome("YT2011").priority(3)
///     })
///     .rule("tarifs", "DefaultTarif", |r| {
///         r.when("!#Youth").outcome("DT2011").priority(3)
///     })
///     .build()
///     .unwrap();
///
/// let input = Context::new().set("person.age", 35_i64);
/// assert_eq!(engine.best_outcome(&input, None).unwrap(), Some("DT2011"));
/// ```
#[derive(Debug)]
pub struct EngineBuilder<E = ExprEvaluator> {
    rules: Vec<Rule>,
    error: Option<RuleError>,
    evaluator: E,
    fail_on_compile_error: bool,
}

/// Intermediate builder passed to the rule definition closure.
#[derive(Debug, Default)]
pub struct RuleBuilder {
    expression: String,
    outcome: Option<String>,
    priority: Option<i32>,
    description: Option<String>,
}

impl RuleBuilder {
    /// Set the expression. A rule without one fails to build with
    /// [`RuleError::MissingField`].
    #[must_use]
    pub fn when(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    #[must_use]
    pub fn outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = Some(outcome.into());
        self
    }

    /// Higher priorities rank first.
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn finish(self, mut rule: Rule) -> Rule {
        if let Some(outcome) = self.outcome {
            rule = rule.with_outcome(outcome);
        }
        if let Some(priority) = self.priority {
            rule = rule.with_priority(priority);
        }
        if let Some(description) = self.description {
            rule = rule.with_description(description);
        }
        rule
    }
}

impl Default for EngineBuilder<ExprEvaluator> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            error: None,
            evaluator: ExprEvaluator::default(),
            fail_on_compile_error: true,
        }
    }
}

impl<E: Evaluator> EngineBuilder<E> {
    /// Declare a rule.
    #[must_use]
    pub fn rule(
        self,
        namespace: &str,
        name: &str,
        f: impl FnOnce(RuleBuilder) -> RuleBuilder,
    ) -> Self {
        let builder = f(RuleBuilder::default());
        let rule = Rule::new(namespace, name, builder.expression.as_str())
            .map(|rule| builder.finish(rule));
        self.record(rule)
    }

    /// Declare a subrule. Outcome and priority set in the closure are ignored.
    #[must_use]
    pub fn subrule(
        self,
        namespace: &str,
        name: &str,
        f: impl FnOnce(RuleBuilder) -> RuleBuilder,
    ) -> Self {
        let builder = f(RuleBuilder::default());
        let rule = Rule::subrule(namespace, name, builder.expression.as_str())
            .map(|rule| builder.finish(rule));
        self.record(rule)
    }

    /// Append an already constructed record.
    #[must_use]
    pub fn push(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Swap the expression language.
    #[must_use]
    pub fn evaluator<F: Evaluator>(self, evaluator: F) -> EngineBuilder<F> {
        EngineBuilder {
            rules: self.rules,
            error: self.error,
            evaluator,
            fail_on_compile_error: self.fail_on_compile_error,
        }
    }

    /// When `false`, rules whose expression does not compile are logged and
    /// left out of the engine instead of failing the build.
    #[must_use]
    pub fn fail_on_compile_error(mut self, fail: bool) -> Self {
        self.fail_on_compile_error = fail;
        self
    }

    /// Resolve subrule references and compile every rule.
    ///
    /// # Errors
    ///
    /// Returns the first record error, then any [`EngineError`] raised by
    /// resolution or compilation.
    pub fn build(self) -> Result<Engine<E>, EngineError> {
        if let Some(err) = self.error {
            return Err(err.into());
        }
        Engine::<E>::compile(self.rules, self.evaluator, self.fail_on_compile_error)
    }

    fn record(mut self, rule: Result<Rule, RuleError>) -> Self {
        match rule {
            Ok(rule) => self.rules.push(rule),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }
}

/// An immutable set of compiled rules.
///
/// Construction inlines subrule references and compiles each remaining
/// expression once. Matching never mutates the engine, so one instance can be
/// shared behind `Arc` and queried from many threads.
pub struct Engine<E: Evaluator = ExprEvaluator> {
    rules: Vec<Rule>,
    compiled: Vec<E::Compiled>,
    index: HashMap<Fqn, usize>,
    outcomes: BTreeSet<String>,
    evaluator: E,
}

impl Engine<ExprEvaluator> {
    /// Build an engine over `rules` with the bundled expression language.
    ///
    /// # Errors
    ///
    /// See [`EngineBuilder::build`].
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Result<Self, EngineError> {
        Self::builder().rules(rules).build()
    }

    #[must_use]
    pub fn builder() -> EngineBuilder<ExprEvaluator> {
        EngineBuilder::default()
    }
}

impl<E: Evaluator> Engine<E> {
    fn compile(
        rules: Vec<Rule>,
        evaluator: E,
        fail_on_compile_error: bool,
    ) -> Result<Self, EngineError> {
        let started = Instant::now();
        info!(rules = rules.len(), "initialising rule engine");

        let outcomes: BTreeSet<String> = rules
            .iter()
            .filter(|rule| !rule.is_subrule())
            .filter_map(Rule::outcome)
            .map(str::to_owned)
            .collect();
        let resolved = resolve(&rules)?;

        let mut kept = Vec::with_capacity(resolved.len());
        let mut compiled = Vec::with_capacity(resolved.len());
        for rule in resolved {
            match evaluator.compile(rule.expression()) {
                Ok(c) => {
                    debug!(rule = %rule.fqn(), expression = rule.expression(), "compiled rule");
                    kept.push(rule);
                    compiled.push(c);
                }
                Err(source) if fail_on_compile_error => {
                    return Err(EngineError::Compile {
                        rule: rule.fqn(),
                        source: Box::new(source),
                    });
                }
                Err(source) => {
                    warn!(rule = %rule.fqn(), error = %source, "skipping rule that failed to compile");
                }
            }
        }

        let index = kept
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.fqn(), i))
            .collect();

        info!(
            compiled = kept.len(),
            outcomes = outcomes.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "rule engine initialised"
        );

        Ok(Self {
            rules: kept,
            compiled,
            index,
            outcomes,
            evaluator,
        })
    }

    /// Rules whose expression is true for `input`, highest priority first.
    ///
    /// If `namespace_pattern` is given only rules whose namespace contains a
    /// match of that regular expression are evaluated. Equal priorities keep
    /// declaration order. An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NamespacePattern`] for an invalid pattern and
    /// [`EngineError::Evaluation`] if the evaluator fails on any candidate.
    pub fn matches(
        &self,
        input: &E::Input,
        namespace_pattern: Option<&str>,
    ) -> Result<Vec<&Rule>, EngineError> {
        self.partition(input, namespace_pattern)
            .map(|partition| partition.matched)
    }

    /// Like [`matches()`](Self::matches) but also reports the rules that did
    /// not match, how many were filtered out and how long it took.
    ///
    /// # Errors
    ///
    /// See [`matches()`](Self::matches).
    pub fn matches_detailed(
        &self,
        input: &E::Input,
        namespace_pattern: Option<&str>,
    ) -> Result<MatchReport<'_>, EngineError> {
        let started = Instant::now();
        let Partition {
            matched,
            unmatched,
            filtered_out,
        } = self.partition(input, namespace_pattern)?;
        Ok(MatchReport::new(
            matched,
            unmatched,
            filtered_out,
            started.elapsed(),
        ))
    }

    fn partition(
        &self,
        input: &E::Input,
        namespace_pattern: Option<&str>,
    ) -> Result<Partition<'_>, EngineError> {
        let pattern = namespace_pattern.map(Regex::new).transpose()?;

        let mut partition = Partition::default();
        for (rule, compiled) in self.rules.iter().zip(&self.compiled) {
            if let Some(pattern) = &pattern
                && !pattern.is_match(rule.namespace())
            {
                partition.filtered_out += 1;
                continue;
            }
            let hit = self
                .evaluator
                .evaluate(compiled, input)
                .map_err(|source| EngineError::Evaluation {
                    rule: rule.fqn(),
                    source: Box::new(source),
                })?;
            if hit {
                debug!(rule = %rule.fqn(), outcome = rule.outcome(), "rule matched");
                partition.matched.push(rule);
            } else {
                debug!(rule = %rule.fqn(), "rule did not match");
                partition.unmatched.push(rule);
            }
        }

        // Stable: equal priorities stay in declaration order.
        partition.matched.sort_by_key(|rule| Reverse(rule.priority()));
        Ok(partition)
    }

    /// Compiled rules in declaration order. Subrules are not included and
    /// expressions have their references inlined.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Every outcome declared by the rules the engine was built from, sorted.
    ///
    /// Includes outcomes of rules that were skipped because they failed to
    /// compile.
    #[must_use]
    pub fn outcomes(&self) -> &BTreeSet<String> {
        &self.outcomes
    }

    #[must_use]
    pub fn get(&self, fqn: &Fqn) -> Option<&Rule> {
        self.index.get(fqn).map(|&i| &self.rules[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }
}

impl<E: Evaluator> fmt::Debug for Engine<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("rules", &self.rules)
            .field("outcomes", &self.outcomes)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Partition<'a> {
    matched: Vec<&'a Rule>,
    unmatched: Vec<&'a Rule>,
    filtered_out: usize,
}
