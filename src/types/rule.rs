use std::fmt;

use super::error::RuleError;

/// Separator placed between namespace and name in the textual form of a [`Fqn`].
pub const FQN_SEPARATOR: char = '.';

/// Priority carried by every subrule. Lower than any priority a caller can
/// meaningfully assign.
pub const SUBRULE_PRIORITY: i32 = i32::MIN;

/// Fully qualified name of a rule: its namespace plus its short name.
///
/// Compared and hashed as a pair, so a namespace that itself contains
/// [`FQN_SEPARATOR`] cannot collide with a different split of the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fqn {
    pub namespace: String,
    pub name: String,
}

impl Fqn {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{FQN_SEPARATOR}{}", self.namespace, self.name)
    }
}

/// Distinguishes ordinary rules from subrules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RuleKind {
    /// Independently matchable, carries an outcome and a priority.
    #[default]
    Rule,
    /// A fragment that only exists to be inlined into other expressions
    /// through a `#name` reference. Never matched on its own.
    SubRule,
}

/// A named, namespaced boolean expression with a priority and an outcome.
///
/// Subrules share this type (see [`RuleKind`]) so anything keyed by
/// [`Fqn`] treats both variants the same way.
///
/// # Example
///
/// ```
/// use rulebook::Rule;
///
/// let rule = Rule::new("ch.maxant.tarifs", "YouthTarif", "input.person.age < 26")
///     .unwrap()
///     .with_outcome("YT2011")
///     .with_priority(3);
/// assert_eq!(rule.fqn().to_string(), "ch.maxant.tarifs.YouthTarif");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RuleRecord"))]
pub struct Rule {
    namespace: String,
    name: String,
    expression: String,
    outcome: Option<String>,
    priority: i32,
    description: Option<String>,
    kind: RuleKind,
}

impl Rule {
    /// Create an ordinary rule with priority `0` and no outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::MissingField`] if `namespace`, `name` or
    /// `expression` is empty.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        expression: impl Into<String>,
    ) -> Result<Self, RuleError> {
        Self::with_kind(namespace, name, expression, RuleKind::Rule)
    }

    /// Create a subrule. Its outcome is always `None` and its priority is
    /// always [`SUBRULE_PRIORITY`].
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::MissingField`] if `namespace`, `name` or
    /// `expression` is empty.
    pub fn subrule(
        namespace: impl Into<String>,
        name: impl Into<String>,
        expression: impl Into<String>,
    ) -> Result<Self, RuleError> {
        Self::with_kind(namespace, name, expression, RuleKind::SubRule)
    }

    fn with_kind(
        namespace: impl Into<String>,
        name: impl Into<String>,
        expression: impl Into<String>,
        kind: RuleKind,
    ) -> Result<Self, RuleError> {
        let namespace = non_empty(namespace.into(), "namespace")?;
        let name = non_empty(name.into(), "name")?;
        let expression = non_empty(expression.into(), "expression")?;
        Ok(Self {
            namespace,
            name,
            expression,
            outcome: None,
            priority: match kind {
                RuleKind::Rule => 0,
                RuleKind::SubRule => SUBRULE_PRIORITY,
            },
            description: None,
            kind,
        })
    }

    /// Set the outcome. Ignored for subrules.
    #[must_use]
    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        if self.kind == RuleKind::Rule {
            self.outcome = Some(outcome.into());
        }
        self
    }

    /// Set the priority; higher values rank first. Ignored for subrules.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        if self.kind == RuleKind::Rule {
            self.priority = priority;
        }
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Same identity, outcome, priority and description with a new expression.
    pub(crate) fn rewritten(&self, expression: String) -> Self {
        Self {
            expression,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn fqn(&self) -> Fqn {
        Fqn::new(&self.namespace, &self.name)
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&str> {
        self.outcome.as_deref()
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    #[must_use]
    pub fn is_subrule(&self) -> bool {
        self.kind == RuleKind::SubRule
    }
}

/// Wire form of a [`Rule`]. Deserialized records go through the same
/// validation as [`Rule::new`] and [`Rule::subrule`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RuleRecord {
    namespace: String,
    name: String,
    expression: String,
    #[serde(default)]
    outcome: Option<String>,
    #[serde(default)]
    priority: Option<i32>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    kind: RuleKind,
}

#[cfg(feature = "serde")]
impl TryFrom<RuleRecord> for Rule {
    type Error = RuleError;

    fn try_from(record: RuleRecord) -> Result<Self, Self::Error> {
        let mut rule = Self::with_kind(
            record.namespace,
            record.name,
            record.expression,
            record.kind,
        )?;
        if let Some(outcome) = record.outcome {
            rule = rule.with_outcome(outcome);
        }
        if let Some(priority) = record.priority {
            rule = rule.with_priority(priority);
        }
        if let Some(description) = record.description {
            rule = rule.with_description(description);
        }
        Ok(rule)
    }
}

fn non_empty(value: String, field: &'static str) -> Result<String, RuleError> {
    if value.is_empty() {
        Err(RuleError::MissingField { field })
    } else {
        Ok(value)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rule [name={}, expression={}, outcome={}, priority={}, namespace={}, description={}]",
            self.name,
            self.expression,
            self.outcome.as_deref().unwrap_or("null"),
            self.priority,
            self.namespace,
            self.description.as_deref().unwrap_or("null"),
        )
    }
}
