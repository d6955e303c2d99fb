//! Slice budget tracking for cooperative yielding
//!
//! A task is allowed to run for a fixed budget before it should hand
//! control back to the host queue. The scheduler restarts the deadline
//! every time a task begins running; the callback checks `should_yield`
//! and returns a continuation promptly when the budget is spent.
//!
//! The budget deliberately does not attempt to align with frame
//! boundaries: most tasks don't need to be frame aligned, and yielding
//! several times per frame keeps the host responsive regardless.

use std::cell::Cell;
use std::time::Duration;

/// Fixed duration a task may run before it should voluntarily yield (5ms)
pub const SLICE_BUDGET: Duration = Duration::from_millis(5);

/// Process-wide yield deadline
///
/// Holds the single `next_yield_time` scalar. The value is meaningful only
/// while a task is executing; between tasks it is stale and ignorable.
///
/// # Example
///
/// ```
/// use tasklane_scheduler::Deadline;
/// use std::time::Duration;
///
/// let deadline = Deadline::new();
/// deadline.restart(Duration::from_millis(100));
///
/// assert!(!deadline.should_yield(Duration::from_millis(100)));
/// assert!(deadline.should_yield(Duration::from_millis(105)));
/// ```
#[derive(Debug)]
pub struct Deadline {
    next_yield: Cell<Duration>,
}

impl Deadline {
    /// Create a deadline with no slice in progress
    pub fn new() -> Self {
        Self {
            next_yield: Cell::new(Duration::ZERO),
        }
    }

    /// Start a new slice at `now`
    ///
    /// Called every time a task begins running, so a task that was just
    /// given control always sees a full budget.
    pub fn restart(&self, now: Duration) {
        self.next_yield.set(now + SLICE_BUDGET);
    }

    /// True once the current slice's budget is spent
    pub fn should_yield(&self, now: Duration) -> bool {
        now >= self.next_yield.get()
    }

    /// Time left in the current slice
    ///
    /// Returns `Duration::ZERO` once the budget is spent, never a negative
    /// value.
    pub fn remaining(&self, now: Duration) -> Duration {
        self.next_yield.get().saturating_sub(now)
    }

    /// The absolute time at which the current slice expires
    pub fn next_yield_time(&self) -> Duration {
        self.next_yield.get()
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_slice_has_full_budget() {
        let deadline = Deadline::new();
        deadline.restart(Duration::ZERO);

        assert!(!deadline.should_yield(Duration::ZERO));
        assert_eq!(deadline.remaining(Duration::ZERO), SLICE_BUDGET);
    }

    #[test]
    fn test_should_yield_at_budget_boundary() {
        let deadline = Deadline::new();
        deadline.restart(Duration::from_millis(10));

        assert!(!deadline.should_yield(Duration::from_millis(14)));
        assert!(deadline.should_yield(Duration::from_millis(15)));
        assert!(deadline.should_yield(Duration::from_millis(20)));
    }

    #[test]
    fn test_restart_resets_the_deadline() {
        let deadline = Deadline::new();
        deadline.restart(Duration::ZERO);
        assert!(deadline.should_yield(Duration::from_millis(5)));

        // A new task starting at t=5ms gets a full budget again.
        deadline.restart(Duration::from_millis(5));
        assert!(!deadline.should_yield(Duration::from_millis(5)));
        assert!(deadline.should_yield(Duration::from_millis(10)));
    }

    #[test]
    fn test_remaining_never_negative() {
        let deadline = Deadline::new();
        deadline.restart(Duration::ZERO);

        assert_eq!(deadline.remaining(Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn test_next_yield_time() {
        let deadline = Deadline::new();
        deadline.restart(Duration::from_millis(3));
        assert_eq!(
            deadline.next_yield_time(),
            Duration::from_millis(3) + SLICE_BUDGET
        );
    }
}
