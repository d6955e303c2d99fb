//! Host task queue interface
//!
//! The underlying time-sliced queue is supplied by the host environment,
//! not implemented here. The scheduler is polymorphic over the three
//! capabilities it needs: a monotonic clock, tier-ordered submission with
//! an optional delay, and (optionally) a lighter-weight yield primitive
//! for resuming continuations.

use crate::cancel::CancellationToken;
use crate::priority::HostTier;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Failure reported by the host queue for a submission
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The submission's cancellation token was triggered before it ran
    #[error("submission aborted before it ran")]
    Aborted,
}

/// A runnable handed to the host queue, paired with its completion channel
///
/// The host must invoke exactly one of [`run`](QueueTask::run) (the
/// submission's turn arrived and its token is untriggered) or
/// [`abort`](QueueTask::abort) (the token was triggered first). Dropping a
/// task without calling either loses the work silently; conforming hosts
/// never do that.
pub struct QueueTask {
    complete: Box<dyn FnOnce(Result<(), QueueError>)>,
}

impl QueueTask {
    /// Wrap a completion callback into a task the host can hold
    pub fn new(complete: impl FnOnce(Result<(), QueueError>) + 'static) -> Self {
        Self {
            complete: Box::new(complete),
        }
    }

    /// Run the submission
    pub fn run(self) {
        (self.complete)(Ok(()));
    }

    /// Report that the submission was aborted before it ran
    pub fn abort(self) {
        (self.complete)(Err(QueueError::Aborted));
    }
}

impl fmt::Debug for QueueTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueTask").finish_non_exhaustive()
    }
}

/// Options accompanying a submission
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// How long the host should hold the submission before it becomes
    /// runnable. Zero means runnable immediately.
    pub delay: Duration,

    /// Token the host must check before running the submission. If it is
    /// triggered by the time the submission's turn arrives, the host
    /// reports [`QueueError::Aborted`] instead of running.
    pub token: CancellationToken,
}

impl SubmitOptions {
    /// Create options with no delay
    pub fn new(token: CancellationToken) -> Self {
        Self {
            delay: Duration::ZERO,
            token,
        }
    }

    /// Set the submission delay
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Capabilities the scheduler requires of the host queue
///
/// Hosts guarantee tier-respecting ordering: within one tier, submission
/// order determines run order (subject to reordering for delayed
/// submissions); across tiers, higher tiers run first, modulo whatever
/// starvation prevention the host applies.
pub trait TaskQueue {
    /// Monotonic time source
    fn now(&self) -> Duration;

    /// Submit a runnable at a tier
    fn submit(&self, tier: HostTier, task: QueueTask, options: SubmitOptions);

    /// Lighter-weight resumption primitive for yielded continuations
    ///
    /// Hosts with a cheap resumption path accept the task (returning
    /// `None`) and run it ahead of full tier submissions once the current
    /// task yields, still honoring `token`. The default declines by
    /// handing the task back; the scheduler then falls back to a full
    /// [`submit`](TaskQueue::submit) at the original tier.
    fn try_yield(&self, task: QueueTask, token: &CancellationToken) -> Option<QueueTask> {
        let _ = token;
        Some(task)
    }
}

impl<Q: TaskQueue + ?Sized> TaskQueue for Rc<Q> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn submit(&self, tier: HostTier, task: QueueTask, options: SubmitOptions) {
        (**self).submit(tier, task, options)
    }

    fn try_yield(&self, task: QueueTask, token: &CancellationToken) -> Option<QueueTask> {
        (**self).try_yield(task, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_run_delivers_success() {
        let outcome = Rc::new(Cell::new(None));
        let outcome_clone = outcome.clone();

        let task = QueueTask::new(move |result| outcome_clone.set(Some(result.is_ok())));
        task.run();

        assert_eq!(outcome.get(), Some(true));
    }

    #[test]
    fn test_abort_delivers_error() {
        let outcome = Rc::new(Cell::new(None));
        let outcome_clone = outcome.clone();

        let task = QueueTask::new(move |result| outcome_clone.set(Some(result.is_ok())));
        task.abort();

        assert_eq!(outcome.get(), Some(false));
    }

    #[test]
    fn test_submit_options_builder() {
        let token = CancellationToken::new(HostTier::UserVisible);
        let options = SubmitOptions::new(token).with_delay(Duration::from_millis(10));

        assert_eq!(options.delay, Duration::from_millis(10));
    }

    #[test]
    fn test_try_yield_declines_by_default() {
        struct NoYieldQueue;

        impl TaskQueue for NoYieldQueue {
            fn now(&self) -> Duration {
                Duration::ZERO
            }

            fn submit(&self, _tier: HostTier, _task: QueueTask, _options: SubmitOptions) {}
        }

        let queue = NoYieldQueue;
        let token = CancellationToken::new(HostTier::UserVisible);
        let task = QueueTask::new(|_| {});

        assert!(queue.try_yield(task, &token).is_some());
    }
}
