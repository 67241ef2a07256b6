use std::fmt;

/// Error type returned by a failing [`Action`].
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// A named side effect, run when its name equals the outcome of a matched rule.
///
/// Actions are supplied per call to
/// [`Engine::execute_best_action`](crate::Engine::execute_best_action) and
/// [`Engine::execute_all_actions`](crate::Engine::execute_all_actions); the
/// engine never stores them.
pub trait Action<I> {
    type Output;

    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Whatever the action reports; the engine passes it to its caller.
    fn execute(&self, input: &I) -> Result<Self::Output, ActionError>;
}

/// An [`Action`] backed by a closure. Created by [`action()`].
pub struct FnAction<'a, I, O> {
    name: String,
    run: Box<dyn Fn(&I) -> Result<O, ActionError> + Send + Sync + 'a>,
}

impl<I, O> Action<I> for FnAction<'_, I, O> {
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, input: &I) -> Result<O, ActionError> {
        (self.run)(input)
    }
}

impl<I, O> fmt::Debug for FnAction<'_, I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction").field("name", &self.name).finish()
    }
}

/// Wrap a closure as a named [`Action`].
///
/// ```
/// use rulebook::{Action, Context, action};
///
/// let youth = action("YT2011", |_input: &Context| Ok(100));
/// assert_eq!(youth.name(), "YT2011");
/// assert_eq!(youth.execute(&Context::new()).unwrap(), 100);
/// ```
#[must_use]
pub fn action<'a, I, O>(
    name: &str,
    run: impl Fn(&I) -> Result<O, ActionError> + Send + Sync + 'a,
) -> FnAction<'a, I, O> {
    FnAction {
        name: name.to_owned(),
        run: Box::new(run),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_action_runs_closure() {
        let double = action("double", |x: &i64| Ok(x * 2));
        assert_eq!(double.name(), "double");
        assert_eq!(double.execute(&21).unwrap(), 42);
    }

    #[test]
    fn fn_action_propagates_error() {
        let failing = action("fail", |_: &i64| -> Result<(), ActionError> {
            Err("boom".into())
        });
        let err = failing.execute(&0).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn debug_shows_name() {
        let noop = action("noop", |_: &()| Ok(()));
        assert_eq!(format!("{noop:?}"), "FnAction { name: \"noop\" }");
    }
}
