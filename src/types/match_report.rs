use std::fmt;
use std::time::Duration;

use super::rule::Rule;

/// Detailed matching report returned by
/// [`Engine::matches_detailed()`](crate::Engine::matches_detailed).
///
/// Contains the ranked matches, the candidates that evaluated to `false`,
/// how many rules the namespace filter excluded, and the wall-clock duration.
#[derive(Debug, Clone)]
#[must_use]
pub struct MatchReport<'a> {
    matched: Vec<&'a Rule>,
    unmatched: Vec<&'a Rule>,
    filtered_out: usize,
    duration: Duration,
}

impl<'a> MatchReport<'a> {
    pub(crate) fn new(
        matched: Vec<&'a Rule>,
        unmatched: Vec<&'a Rule>,
        filtered_out: usize,
        duration: Duration,
    ) -> Self {
        Self {
            matched,
            unmatched,
            filtered_out,
            duration,
        }
    }

    /// Matching rules, highest priority first. Same as
    /// [`Engine::matches()`](crate::Engine::matches).
    #[must_use]
    pub fn matched(&self) -> &[&'a Rule] {
        &self.matched
    }

    /// Candidates that evaluated to `false`, in declaration order.
    #[must_use]
    pub fn unmatched(&self) -> &[&'a Rule] {
        &self.unmatched
    }

    /// The winning rule, if any.
    #[must_use]
    pub fn best(&self) -> Option<&'a Rule> {
        self.matched.first().copied()
    }

    /// Number of rules whose expressions were evaluated.
    #[must_use]
    pub fn evaluated(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    /// Number of rules skipped because their namespace did not match the pattern.
    #[must_use]
    pub fn filtered_out(&self) -> usize {
        self.filtered_out
    }

    /// Wall-clock duration of the match.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for MatchReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.best().and_then(Rule::outcome) {
            Some(outcome) => write!(f, "best: {outcome}")?,
            None => write!(f, "best: none")?,
        }
        let matched: Vec<String> = self.matched.iter().map(|r| r.fqn().to_string()).collect();
        write!(f, ", matched: [{}]", matched.join(", "))?;
        write!(f, ", filtered out: {}", self.filtered_out)?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
