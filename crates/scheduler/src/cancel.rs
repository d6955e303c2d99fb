//! Cancellation tokens and task handles
//!
//! Every scheduled task gets a fresh cancellation token. The caller holds
//! the token indirectly through an opaque [`TaskHandle`]; the host queue
//! checks it before running a submission. A triggered token stays
//! triggered, which is what guarantees a cancelled task never executes
//! further continuations.

use crate::priority::HostTier;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cancellation token for cooperative task cancellation
///
/// Clones share the same underlying flag, so a host queue holding a clone
/// observes a cancellation made through the caller's handle. Cancelling is
/// idempotent, and once triggered the token can never revert.
///
/// # Example
///
/// ```
/// use tasklane_scheduler::{CancellationToken, HostTier};
///
/// let token = CancellationToken::new(HostTier::UserVisible);
/// let queue_side = token.clone();
///
/// assert!(!queue_side.is_cancelled());
/// token.cancel();
/// assert!(queue_side.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

#[derive(Debug)]
struct TokenInner {
    cancelled: AtomicBool,
    tier_hint: HostTier,
}

impl CancellationToken {
    /// Create a new token carrying the tier its task was submitted at
    ///
    /// The hint lets a host resubmit a continuation at the original tier
    /// from the token alone.
    pub fn new(tier_hint: HostTier) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                tier_hint,
            }),
        }
    }

    /// Trigger this token
    ///
    /// Idempotent: triggering an already-triggered token is a no-op. All
    /// clones observe the cancellation.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Check whether this token has been triggered
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// The tier the token's task was originally submitted at
    pub fn tier_hint(&self) -> HostTier {
        self.inner.tier_hint
    }

    fn ptr_eq(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Opaque handle for one logical unit of scheduled work
///
/// Returned by `schedule_callback` and consumed by `cancel_callback`.
/// Clones share identity: equality is by the underlying task, never by
/// value. Once the task's callback chain completes, the handle becomes
/// inert; cancelling it afterwards is a harmless no-op.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    token: CancellationToken,
}

impl TaskHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Check whether this handle's task has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl PartialEq for TaskHandle {
    fn eq(&self, other: &Self) -> bool {
        self.token.ptr_eq(&other.token)
    }
}

impl Eq for TaskHandle {}
