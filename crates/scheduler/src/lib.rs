//! Tasklane Scheduler Library
//!
//! Cooperative task scheduler over a host-supplied time-sliced queue.
//!
//! This crate lets a host environment run low-priority or background work
//! without blocking latency-sensitive work. Five logical priority levels
//! are mapped onto the host queue's three urgency tiers, each slice of
//! work runs inside a fixed 5ms budget, and a running task can checkpoint
//! itself as a continuation so it resumes in a later slice without losing
//! progress. Tasks are cancellable through an opaque handle; cancellation
//! prevents future slices without interrupting the one in flight.
//!
//! The underlying queue is injected through the [`TaskQueue`] trait. The
//! crate never implements the queue itself, and test hosts supply
//! deterministic timing.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use tasklane_scheduler::{
//!     HostTier, PriorityLevel, QueueTask, ScheduleOptions, SubmitOptions, TaskQueue,
//!     TaskScheduler, TaskStep,
//! };
//!
//! // Toy host queue that records submissions for the example to drain.
//! #[derive(Default)]
//! struct InlineQueue {
//!     pending: RefCell<Vec<(HostTier, QueueTask, SubmitOptions)>>,
//! }
//!
//! impl TaskQueue for InlineQueue {
//!     fn now(&self) -> Duration {
//!         Duration::ZERO
//!     }
//!
//!     fn submit(&self, tier: HostTier, task: QueueTask, options: SubmitOptions) {
//!         self.pending.borrow_mut().push((tier, task, options));
//!     }
//! }
//!
//! let queue = Rc::new(InlineQueue::default());
//! let scheduler = TaskScheduler::new(queue.clone());
//!
//! let ran = Rc::new(RefCell::new(false));
//! let ran_in_task = ran.clone();
//! let handle = scheduler.schedule_callback(
//!     PriorityLevel::Normal,
//!     move |_timed_out| {
//!         *ran_in_task.borrow_mut() = true;
//!         TaskStep::Done(())
//!     },
//!     ScheduleOptions::default(),
//! );
//!
//! // The host environment drives the queue when it sees fit.
//! let drained: Vec<_> = queue.pending.borrow_mut().drain(..).collect();
//! for (_tier, task, options) in drained {
//!     if options.token.is_cancelled() {
//!         task.abort();
//!     } else {
//!         task.run();
//!     }
//! }
//!
//! assert!(*ran.borrow());
//! assert!(!handle.is_cancelled());
//! ```

mod budget;
mod cancel;
mod context;
mod priority;
mod queue;
mod scheduler;
mod task;

// Re-export public API
pub use budget::{Deadline, SLICE_BUDGET};
pub use cancel::{CancellationToken, TaskHandle};
pub use context::{PriorityContext, PriorityScope};
pub use priority::{HostTier, PriorityLevel};
pub use queue::{QueueError, QueueTask, SubmitOptions, TaskQueue};
pub use scheduler::{ScheduleOptions, SchedulerStats, TaskScheduler};
pub use task::{TaskCallback, TaskStep};
