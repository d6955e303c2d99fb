//! Task scheduler and runner
//!
//! `TaskScheduler` is the public surface: callers schedule callbacks at a
//! logical priority, the priority mapper resolves a host tier, and the
//! runner executes each slice inside the fixed budget, rescheduling
//! continuations until the chain completes or is cancelled.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::budget::Deadline;
use crate::cancel::{CancellationToken, TaskHandle};
use crate::context::PriorityContext;
use crate::priority::{HostTier, PriorityLevel};
use crate::queue::{QueueError, QueueTask, SubmitOptions, TaskQueue};
use crate::task::{erase, ErasedCallback, TaskStep};

/// Options for [`TaskScheduler::schedule_callback`]
#[derive(Debug, Clone, Default)]
pub struct ScheduleOptions {
    /// Time offset before the task becomes runnable. Defaults to zero.
    pub delay: Duration,
}

impl ScheduleOptions {
    /// Create options with no delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scheduling delay
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Scheduler statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Tasks submitted through `schedule_callback`
    pub tasks_scheduled: u64,

    /// Callback chains that ran to completion
    pub tasks_completed: u64,

    /// Continuations rescheduled after a slice yielded
    pub continuations_scheduled: u64,

    /// Aborted submissions reported by the host queue and discarded
    pub aborts_discarded: u64,

    /// Callback panics re-raised on a fresh submission
    pub panics_resurfaced: u64,
}

#[derive(Default)]
struct StatsCells {
    tasks_scheduled: Cell<u64>,
    tasks_completed: Cell<u64>,
    continuations_scheduled: Cell<u64>,
    aborts_discarded: Cell<u64>,
    panics_resurfaced: Cell<u64>,
}

impl StatsCells {
    fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            tasks_scheduled: self.tasks_scheduled.get(),
            tasks_completed: self.tasks_completed.get(),
            continuations_scheduled: self.continuations_scheduled.get(),
            aborts_discarded: self.aborts_discarded.get(),
            panics_resurfaced: self.panics_resurfaced.get(),
        }
    }
}

fn bump(counter: &Cell<u64>) {
    counter.set(counter.get() + 1);
}

/// Cooperative task scheduler over a host-supplied time-sliced queue
///
/// Single-threaded: callbacks never run in parallel, and concurrency comes
/// purely from interleaving short slices of different tasks. The scheduler
/// is a cheap handle; clones share the same context, deadline and
/// statistics, which is how callbacks running inside the queue call back
/// into `should_yield` or schedule follow-up work.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tasklane_scheduler::{
///     HostTier, PriorityLevel, QueueTask, SubmitOptions, TaskQueue, TaskScheduler,
/// };
///
/// struct NullQueue;
///
/// impl TaskQueue for NullQueue {
///     fn now(&self) -> Duration {
///         Duration::ZERO
///     }
///
///     fn submit(&self, _tier: HostTier, _task: QueueTask, _options: SubmitOptions) {}
/// }
///
/// let scheduler = TaskScheduler::new(NullQueue);
/// assert_eq!(scheduler.current_priority_level(), PriorityLevel::Normal);
///
/// let observed = scheduler.run_with_priority(PriorityLevel::UserBlocking, || {
///     scheduler.current_priority_level()
/// });
/// assert_eq!(observed, PriorityLevel::UserBlocking);
/// assert_eq!(scheduler.current_priority_level(), PriorityLevel::Normal);
/// ```
pub struct TaskScheduler<Q: TaskQueue> {
    inner: Rc<Inner<Q>>,
}

struct Inner<Q> {
    queue: Q,
    context: PriorityContext,
    deadline: Deadline,
    stats: StatsCells,
}

impl<Q: TaskQueue> Clone for TaskScheduler<Q> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Q: TaskQueue + 'static> TaskScheduler<Q> {
    /// Create a scheduler over the given host queue
    pub fn new(queue: Q) -> Self {
        Self {
            inner: Rc::new(Inner {
                queue,
                context: PriorityContext::new(),
                deadline: Deadline::new(),
                stats: StatsCells::default(),
            }),
        }
    }

    /// Schedule a callback at a logical priority
    ///
    /// Resolves the host tier, creates a fresh cancellation token, submits
    /// the task and returns its handle immediately without blocking. The
    /// callback is invoked at most once per submission; a chain of
    /// continuations invokes the logical task body once per slice.
    ///
    /// The callback receives a legacy timed-out flag, always `false`.
    pub fn schedule_callback<T, F>(
        &self,
        priority: PriorityLevel,
        callback: F,
        options: ScheduleOptions,
    ) -> TaskHandle
    where
        T: 'static,
        F: FnOnce(bool) -> TaskStep<T> + 'static,
    {
        let tier = priority.host_tier();
        let token = CancellationToken::new(tier);
        let handle = TaskHandle::new(token.clone());

        trace!(
            ?priority,
            ?tier,
            delay_ms = options.delay.as_millis() as u64,
            "scheduling callback"
        );
        bump(&self.inner.stats.tasks_scheduled);

        let task = make_task(
            self.inner.clone(),
            priority,
            token.clone(),
            erase(Box::new(callback)),
        );
        self.inner
            .queue
            .submit(tier, task, SubmitOptions::new(token).with_delay(options.delay));

        handle
    }

    /// Cancel a scheduled task
    ///
    /// Triggers the handle's token unconditionally; idempotent, and a
    /// no-op for handles whose chain already completed. The in-flight
    /// slice, if any, is not interrupted; cancellation only prevents
    /// future slices.
    pub fn cancel_callback(&self, handle: &TaskHandle) {
        trace!("cancelling task");
        handle.token().cancel();
    }

    /// True once the running task's slice budget is spent
    ///
    /// Cooperative callbacks check this and return a continuation promptly
    /// when it turns true. Meaningful only while a task is executing.
    pub fn should_yield(&self) -> bool {
        self.inner.deadline.should_yield(self.inner.queue.now())
    }

    /// Request a repaint before the next slice
    ///
    /// No-op: the scheduler already yields at the end of every slice, so
    /// the host gets a paint opportunity regardless.
    pub fn request_paint(&self) {}

    /// Placeholder for frame-rate hints; the slice budget is fixed
    pub fn force_frame_rate(&self) {}

    /// Monotonic time from the host queue
    pub fn now(&self) -> Duration {
        self.inner.queue.now()
    }

    /// Read the priority in effect right now
    pub fn current_priority_level(&self) -> PriorityLevel {
        self.inner.context.current()
    }

    /// Run `f` inside a priority scope
    ///
    /// The previous priority is restored when `f` returns or unwinds.
    pub fn run_with_priority<R>(&self, priority: PriorityLevel, f: impl FnOnce() -> R) -> R {
        let _scope = self.inner.context.enter(priority);
        f()
    }

    /// Run `f` at the priority follow-up work should inherit
    ///
    /// The current priority capped at `Normal`: urgent contexts are
    /// normalized down, low-urgency contexts are left unchanged.
    pub fn run_with_next_priority<R>(&self, f: impl FnOnce() -> R) -> R {
        let target = self.inner.context.current().capped_at_normal();
        let _scope = self.inner.context.enter(target);
        f()
    }

    /// Wrap a callback so it remembers the current priority
    ///
    /// Captures the priority at wrap time, not call time. Whenever the
    /// returned callable is invoked (possibly much later, possibly nested
    /// inside a different priority context) it temporarily reinstates the
    /// captured priority, then restores the caller's own context.
    pub fn wrap_callback<R>(&self, mut f: impl FnMut() -> R) -> impl FnMut() -> R {
        let captured = self.inner.context.current();
        let inner = self.inner.clone();
        move || {
            let _scope = inner.context.enter(captured);
            f()
        }
    }

    /// Snapshot of the scheduler's counters
    pub fn stats(&self) -> SchedulerStats {
        self.inner.stats.snapshot()
    }
}

/// Wrap one slice of a task into a submission for the host queue.
///
/// The completion channel is where the error taxonomy lives: a normal turn
/// runs the slice, while an aborted submission is expected (the caller
/// already knows it cancelled) and is deliberately discarded.
fn make_task<Q: TaskQueue + 'static>(
    inner: Rc<Inner<Q>>,
    priority: PriorityLevel,
    token: CancellationToken,
    callback: ErasedCallback,
) -> QueueTask {
    QueueTask::new(move |outcome| match outcome {
        Ok(()) => run_task(inner, priority, token, callback),
        Err(QueueError::Aborted) => {
            trace!(?priority, "discarding aborted submission");
            bump(&inner.stats.aborts_discarded);
        }
    })
}

fn run_task<Q: TaskQueue + 'static>(
    inner: Rc<Inner<Q>>,
    priority: PriorityLevel,
    token: CancellationToken,
    callback: ErasedCallback,
) {
    inner.deadline.restart(inner.queue.now());
    let _scope = inner.context.enter(priority);

    let result = panic::catch_unwind(AssertUnwindSafe(|| callback.invoke(false)));
    match result {
        Ok(Some(next)) => {
            trace!(?priority, "rescheduling continuation");
            bump(&inner.stats.continuations_scheduled);

            let task = make_task(inner.clone(), priority, token.clone(), next);
            if let Some(task) = inner.queue.try_yield(task, &token) {
                // Host has no yield primitive: full re-submission at the
                // tier the token was minted with, still bound to that
                // same token.
                inner
                    .queue
                    .submit(token.tier_hint(), task, SubmitOptions::new(token.clone()));
            }
        }
        Ok(None) => {
            bump(&inner.stats.tasks_completed);
        }
        Err(payload) => {
            // The panic must not vanish into the queue's own failure
            // channel, which the caller cannot observe. Re-raise it from a
            // fresh zero-delay submission bound to a never-cancelled
            // token, so it unwinds out of the host's drive loop instead.
            debug!(?priority, "callback panicked, resurfacing on a fresh submission");
            bump(&inner.stats.panics_resurfaced);

            let rethrow_token = CancellationToken::new(HostTier::UserBlocking);
            let rethrow = QueueTask::new(move |_| panic::resume_unwind(payload));
            inner
                .queue
                .submit(HostTier::UserBlocking, rethrow, SubmitOptions::new(rethrow_token));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_options_default() {
        let options = ScheduleOptions::new();
        assert_eq!(options.delay, Duration::ZERO);
    }

    #[test]
    fn test_schedule_options_with_delay() {
        let options = ScheduleOptions::new().with_delay(Duration::from_millis(250));
        assert_eq!(options.delay, Duration::from_millis(250));
    }

    #[test]
    fn test_stats_default_is_zeroed() {
        assert_eq!(SchedulerStats::default().tasks_scheduled, 0);
        assert_eq!(SchedulerStats::default().tasks_completed, 0);
    }
}
