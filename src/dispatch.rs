use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::NameKind;
use crate::evaluator::Evaluator;
use crate::{Action, Engine, EngineError};

impl<E: Evaluator> Engine<E> {
    /// Outcome of the highest ranked matching rule.
    ///
    /// `None` if that rule declares no outcome.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoMatchingRule`] if nothing matches, or any
    /// error from [`matches()`](Self::matches).
    pub fn best_outcome(
        &self,
        input: &E::Input,
        namespace_pattern: Option<&str>,
    ) -> Result<Option<&str>, EngineError> {
        let matched = self.matches(input, namespace_pattern)?;
        matched
            .first()
            .copied()
            .map(|rule| rule.outcome())
            .ok_or(EngineError::NoMatchingRule)
    }

    /// Run the action named after the best outcome and return its result.
    ///
    /// `actions` is validated before `input` is evaluated: every outcome any
    /// rule can produce must have exactly one action.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateName`] or [`EngineError::NoActionFound`]
    /// for an invalid action set, [`EngineError::NoMatchingRule`] if nothing
    /// matches, [`EngineError::MissingOutcome`] if the best rule declares no
    /// outcome and [`EngineError::Action`] if the action fails.
    pub fn execute_best_action<A>(
        &self,
        input: &E::Input,
        actions: &[A],
        namespace_pattern: Option<&str>,
    ) -> Result<A::Output, EngineError>
    where
        A: Action<E::Input>,
    {
        let by_name = self.validate_actions(actions)?;
        let matched = self.matches(input, namespace_pattern)?;
        let best = matched.first().ok_or(EngineError::NoMatchingRule)?;
        let outcome = best
            .outcome()
            .ok_or_else(|| EngineError::MissingOutcome { rule: best.fqn() })?;
        let action = by_name
            .get(outcome)
            .ok_or_else(|| EngineError::NoActionFound {
                outcome: outcome.to_owned(),
            })?;
        run(*action, input)
    }

    /// Run the action of every distinct matched outcome once, in ranked order.
    ///
    /// Matching rules that declare no outcome are skipped. Results are
    /// discarded; execution stops at the first failing action.
    ///
    /// # Errors
    ///
    /// Same validation errors as
    /// [`execute_best_action()`](Self::execute_best_action), any error from
    /// [`matches()`](Self::matches) and [`EngineError::Action`].
    pub fn execute_all_actions<A>(
        &self,
        input: &E::Input,
        actions: &[A],
        namespace_pattern: Option<&str>,
    ) -> Result<(), EngineError>
    where
        A: Action<E::Input>,
    {
        let by_name = self.validate_actions(actions)?;
        let matched = self.matches(input, namespace_pattern)?;

        let mut executed = HashSet::new();
        for outcome in matched.iter().filter_map(|rule| rule.outcome()) {
            if !executed.insert(outcome) {
                continue;
            }
            let action = by_name
                .get(outcome)
                .ok_or_else(|| EngineError::NoActionFound {
                    outcome: outcome.to_owned(),
                })?;
            run(*action, input)?;
        }
        Ok(())
    }

    fn validate_actions<'a, A>(
        &self,
        actions: &'a [A],
    ) -> Result<HashMap<&'a str, &'a A>, EngineError>
    where
        A: Action<E::Input>,
    {
        let mut by_name = HashMap::with_capacity(actions.len());
        for action in actions {
            if by_name.insert(action.name(), action).is_some() {
                return Err(EngineError::DuplicateName {
                    kind: NameKind::Action,
                    name: action.name().to_owned(),
                });
            }
        }
        if let Some(missing) = self
            .outcomes()
            .iter()
            .find(|outcome| !by_name.contains_key(outcome.as_str()))
        {
            return Err(EngineError::NoActionFound {
                outcome: missing.clone(),
            });
        }
        Ok(by_name)
    }
}

fn run<I, A: Action<I>>(action: &A, input: &I) -> Result<A::Output, EngineError> {
    debug!(action = action.name(), "executing action");
    action.execute(input).map_err(|source| EngineError::Action {
        action: action.name().to_owned(),
        source,
    })
}
