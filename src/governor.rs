//! Wall-clock budgets for governed operations
//!
//! Every governed operation deterministically ends in exactly one of three
//! ways: its own value, [`ProbeError::TimedOut`], or the failure it propagated.
//! Two flavours are provided:
//!
//! - [`TimeoutGovernor::run_with_timeout`] races a future against a timer on the
//!   caller's task. When the timer wins the future is dropped, which releases
//!   every socket or buffer it owned.
//! - [`TimeoutGovernor::run_cancellable`] moves the work onto a background task
//!   that receives a [`CancellationToken`]. On expiry the caller cancels the
//!   token and leaves; the task notices the token and throws its late result
//!   away instead of delivering it.
//!
//! Nothing here is global, so governed operations nest freely.

use crate::error::{ProbeError, ProbeResult};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// Shared cancellation flag bound to a deadline
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<TokenState>,
}

#[derive(Debug)]
struct TokenState {
    cancelled: AtomicBool,
    // None when the budget reaches past what `Instant` can represent
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// Token that expires `budget` from now; a budget too large to represent never expires
    pub fn with_budget(budget: Duration) -> Self {
        Self::new(Instant::now().checked_add(budget))
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self::new(Some(deadline))
    }

    fn new(deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(TokenState {
                cancelled: AtomicBool::new(false),
                deadline,
            }),
        }
    }

    /// Signal every holder to stop
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once cancelled explicitly or once the deadline has passed
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
            || self.inner.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Time left before the deadline
    pub fn remaining(&self) -> Duration {
        match self.inner.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        }
    }
}

/// Enforces time budgets around probe operations
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutGovernor;

impl TimeoutGovernor {
    pub fn new() -> Self {
        Self
    }

    /// Run `operation` on the current task, abandoning it once `budget` elapses.
    pub async fn run_with_timeout<T, F>(&self, operation: F, budget: Duration) -> ProbeResult<T>
    where
        F: Future<Output = ProbeResult<T>>,
    {
        match tokio::time::timeout(budget, operation).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::timed_out(budget)),
        }
    }

    /// Like [`run_with_timeout`](Self::run_with_timeout), but `None` runs the operation unbounded.
    pub async fn run_with_optional_timeout<T, F>(
        &self,
        operation: F,
        budget: Option<Duration>,
    ) -> ProbeResult<T>
    where
        F: Future<Output = ProbeResult<T>>,
    {
        match budget {
            Some(budget) => self.run_with_timeout(operation, budget).await,
            None => operation.await,
        }
    }

    /// Like [`run_with_optional_timeout`](Self::run_with_optional_timeout), also
    /// turning a panic inside `operation` into [`ProbeError::Panicked`].
    pub async fn run_isolated<T, F>(&self, operation: F, budget: Option<Duration>) -> ProbeResult<T>
    where
        F: Future<Output = ProbeResult<T>>,
    {
        let guarded = AssertUnwindSafe(operation)
            .catch_unwind()
            .map(|outcome| outcome.unwrap_or_else(|payload| Err(ProbeError::Panicked(payload_message(payload)))));
        self.run_with_optional_timeout(guarded, budget).await
    }

    /// Run the future built by `operation` on a background task that observes a
    /// cancellation token.
    ///
    /// The caller waits at most `budget`. A result produced after that point is
    /// discarded by the task itself and never reaches the caller.
    pub async fn run_cancellable<T, F, Fut>(&self, budget: Duration, operation: F) -> ProbeResult<T>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ProbeResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let token = CancellationToken::with_budget(budget);
        let task_token = token.clone();
        let work = operation(token.clone());
        let (tx, rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let result = work.await;
            if task_token.is_cancelled() {
                // The caller has already moved on
                return;
            }
            let _ = tx.send(result);
        });

        match tokio::time::timeout(budget, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => {
                // Sender dropped without a value: the task either panicked or
                // discarded a result that landed exactly on the deadline.
                match handle.await {
                    Err(join_error) if join_error.is_panic() => {
                        Err(ProbeError::Panicked(panic_message(join_error)))
                    }
                    _ => Err(ProbeError::timed_out(budget)),
                }
            }
            Err(_) => {
                token.cancel();
                Err(ProbeError::timed_out(budget))
            }
        }
    }
}

fn panic_message(error: tokio::task::JoinError) -> String {
    match error.try_into_panic() {
        Ok(payload) => payload_message(payload),
        Err(error) => error.to_string(),
    }
}

fn payload_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
