//! Scoped priority context
//!
//! Tracks the "currently executing priority" so nested scheduling calls
//! can inherit or normalize it without threading an explicit parameter
//! through every call site. The value is mutated only through strictly
//! nested scopes: [`PriorityContext::enter`] returns a guard whose `Drop`
//! restores the previous value, so every scope restores exactly once even
//! when the inner code panics.

use crate::priority::PriorityLevel;
use std::cell::Cell;

/// Current-priority state for a single logical thread of execution
///
/// At any time the value equals the priority of the innermost active
/// scope, or `Normal` if no scope is active.
///
/// # Example
///
/// ```
/// use tasklane_scheduler::{PriorityContext, PriorityLevel};
///
/// let context = PriorityContext::new();
/// assert_eq!(context.current(), PriorityLevel::Normal);
///
/// {
///     let _scope = context.enter(PriorityLevel::UserBlocking);
///     assert_eq!(context.current(), PriorityLevel::UserBlocking);
/// }
/// assert_eq!(context.current(), PriorityLevel::Normal);
/// ```
#[derive(Debug)]
pub struct PriorityContext {
    current: Cell<PriorityLevel>,
}

impl PriorityContext {
    /// Create a context with no active scope
    pub fn new() -> Self {
        Self {
            current: Cell::new(PriorityLevel::default()),
        }
    }

    /// Read the priority in effect right now
    pub fn current(&self) -> PriorityLevel {
        self.current.get()
    }

    /// Enter a priority scope
    ///
    /// The returned guard restores the previous value when dropped,
    /// including during unwinding.
    pub fn enter(&self, priority: PriorityLevel) -> PriorityScope<'_> {
        let previous = self.current.replace(priority);
        PriorityScope {
            context: self,
            previous,
        }
    }
}

impl Default for PriorityContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for an active priority scope
///
/// Holding the guard keeps the scope's priority in effect; dropping it
/// restores whatever was in effect before.
#[must_use = "dropping the scope immediately restores the previous priority"]
#[derive(Debug)]
pub struct PriorityScope<'a> {
    context: &'a PriorityContext,
    previous: PriorityLevel,
}

impl Drop for PriorityScope<'_> {
    fn drop(&mut self) {
        self.context.current.set(self.previous);
    }
}
