//! Execute strategies: the retry state machine behind every client call.
//!
//! A strategy owns an immutable retry-timeout sequence (index `i` is the delay
//! before retry `i + 1`; an empty sequence means a single attempt) and a
//! [`RetryPolicy`] that classifies failures and exposes observability hooks.
//! The unit of work is opaque: the strategy knows nothing about HTTP,
//! serialization, or configuration.
//!
//! [`ExecuteStrategy`] blocks the calling thread between attempts;
//! [`AsyncExecuteStrategy`] suspends on `tokio::time::sleep` instead and
//! additionally supports cancellation.

use std::future::Future;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ClientError;

/// Marker for a cancelled execution.
///
/// Converted into the unit of work's error type when a cancellation request
/// terminates an asynchronous execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cancelled;

impl From<Cancelled> for ClientError {
    fn from(_: Cancelled) -> Self {
        ClientError::Cancelled
    }
}

/// Failure classification and observability hooks for an execute strategy.
///
/// A custom policy replaces the default classification entirely; it is
/// consulted directly rather than layered on top of the default. The hooks are
/// no-ops by default and exist purely as extension points; they must not alter
/// control flow.
pub trait RetryPolicy<E>: Send + Sync {
    /// Whether a failed attempt may be retried.
    fn can_retry(&self, error: &E) -> bool;

    /// Called immediately before each inter-attempt delay.
    ///
    /// `attempt` is the 1-based attempt that just failed and `max_retries` the
    /// length of the retry-timeout sequence.
    fn on_retrying(&self, attempt: u32, max_retries: u32, error: &E) {
        let _ = (attempt, max_retries, error);
    }

    /// Called immediately before a terminal failure is returned.
    fn on_rethrowing(&self, attempt: u32, max_retries: u32, error: &E) {
        let _ = (attempt, max_retries, error);
    }
}

impl<E, P> RetryPolicy<E> for Arc<P>
where
    P: RetryPolicy<E> + ?Sized,
{
    fn can_retry(&self, error: &E) -> bool {
        (**self).can_retry(error)
    }

    fn on_retrying(&self, attempt: u32, max_retries: u32, error: &E) {
        (**self).on_retrying(attempt, max_retries, error);
    }

    fn on_rethrowing(&self, attempt: u32, max_retries: u32, error: &E) {
        (**self).on_rethrowing(attempt, max_retries, error);
    }
}

/// Default policy: delegates to [`ClientError::is_retryable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRetryPolicy;

impl RetryPolicy<ClientError> for DefaultRetryPolicy {
    fn can_retry(&self, error: &ClientError) -> bool {
        error.is_retryable()
    }
}

/// Synchronous execute strategy.
///
/// Executes a unit of work on the calling thread, blocking it with
/// `thread::sleep` between attempts. An instance is immutable after
/// construction and safe for unlimited concurrent use; the attempt counter is
/// local to each [`execute`](Self::execute) call.
#[derive(Debug, Clone)]
pub struct ExecuteStrategy<P = DefaultRetryPolicy> {
    retry_timeouts: Vec<Duration>,
    policy: P,
}

impl ExecuteStrategy<DefaultRetryPolicy> {
    /// Create a strategy with the given retry-timeout sequence and the
    /// default policy.
    pub fn new(retry_timeouts: impl Into<Vec<Duration>>) -> Self {
        Self::with_policy(retry_timeouts, DefaultRetryPolicy)
    }

    /// Create a strategy that performs a single attempt.
    pub fn single_attempt() -> Self {
        Self::new(Vec::new())
    }
}

impl<P> ExecuteStrategy<P> {
    /// Create a strategy with a custom retry policy.
    pub fn with_policy(retry_timeouts: impl Into<Vec<Duration>>, policy: P) -> Self {
        Self {
            retry_timeouts: retry_timeouts.into(),
            policy,
        }
    }

    /// The configured retry-timeout sequence.
    pub fn retry_timeouts(&self) -> &[Duration] {
        &self.retry_timeouts
    }

    /// Maximum number of retries (the length of the timeout sequence).
    pub fn max_retries(&self) -> u32 {
        self.retry_timeouts.len() as u32
    }

    /// Execute `action` against `input`, retrying per the configured policy.
    ///
    /// Returns the first successful output, or the original error of the
    /// terminal attempt, unwrapped and untranslated. The exhaustion check
    /// precedes the predicate, so the predicate is consulted at most once per
    /// configured timeout.
    pub fn execute<I, O, E, F>(&self, input: I, mut action: F) -> Result<O, E>
    where
        I: Clone,
        F: FnMut(I) -> Result<O, E>,
        P: RetryPolicy<E>,
        E: std::fmt::Display,
    {
        let max_retries = self.max_retries();
        let mut attempt: u32 = 1;

        loop {
            match action(input.clone()) {
                Ok(output) => return Ok(output),
                Err(error) => {
                    if attempt > max_retries || !self.policy.can_retry(&error) {
                        self.policy.on_rethrowing(attempt, max_retries, &error);
                        return Err(error);
                    }

                    self.policy.on_retrying(attempt, max_retries, &error);
                    let delay = self.retry_timeouts[(attempt - 1) as usize];
                    debug!(
                        attempt,
                        max_retries,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after failed attempt"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

/// Asynchronous execute strategy.
///
/// Identical contract and algorithm to [`ExecuteStrategy`], but the unit of
/// work produces a future and the inter-attempt delay suspends the calling
/// task instead of blocking a worker thread.
#[derive(Debug, Clone)]
pub struct AsyncExecuteStrategy<P = DefaultRetryPolicy> {
    retry_timeouts: Vec<Duration>,
    policy: P,
}

impl AsyncExecuteStrategy<DefaultRetryPolicy> {
    /// Create a strategy with the given retry-timeout sequence and the
    /// default policy.
    pub fn new(retry_timeouts: impl Into<Vec<Duration>>) -> Self {
        Self::with_policy(retry_timeouts, DefaultRetryPolicy)
    }

    /// Create a strategy that performs a single attempt.
    pub fn single_attempt() -> Self {
        Self::new(Vec::new())
    }
}

impl<P> AsyncExecuteStrategy<P> {
    /// Create a strategy with a custom retry policy.
    pub fn with_policy(retry_timeouts: impl Into<Vec<Duration>>, policy: P) -> Self {
        Self {
            retry_timeouts: retry_timeouts.into(),
            policy,
        }
    }

    /// The configured retry-timeout sequence.
    pub fn retry_timeouts(&self) -> &[Duration] {
        &self.retry_timeouts
    }

    /// Maximum number of retries (the length of the timeout sequence).
    pub fn max_retries(&self) -> u32 {
        self.retry_timeouts.len() as u32
    }

    /// Execute `action` against `input`, retrying per the configured policy.
    ///
    /// See [`ExecuteStrategy::execute`] for the contract; the only difference
    /// is that the delay is a non-blocking `tokio::time::sleep`.
    pub async fn execute<I, O, E, F, Fut>(&self, input: I, mut action: F) -> Result<O, E>
    where
        I: Clone,
        F: FnMut(I) -> Fut,
        Fut: Future<Output = Result<O, E>>,
        P: RetryPolicy<E>,
        E: std::fmt::Display,
    {
        let max_retries = self.max_retries();
        let mut attempt: u32 = 1;

        loop {
            match action(input.clone()).await {
                Ok(output) => return Ok(output),
                Err(error) => {
                    if attempt > max_retries || !self.policy.can_retry(&error) {
                        self.policy.on_rethrowing(attempt, max_retries, &error);
                        return Err(error);
                    }

                    self.policy.on_retrying(attempt, max_retries, &error);
                    let delay = self.retry_timeouts[(attempt - 1) as usize];
                    debug!(
                        attempt,
                        max_retries,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after failed attempt"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Execute with cancellation support.
    ///
    /// The token is checked before every invocation and raced against every
    /// inter-attempt delay. A cancellation request is its own terminal
    /// outcome: the pending delay is aborted, the retry loop short-circuits,
    /// and the rethrowing hook is not invoked.
    pub async fn execute_cancellable<I, O, E, F, Fut>(
        &self,
        input: I,
        mut action: F,
        token: &CancellationToken,
    ) -> Result<O, E>
    where
        I: Clone,
        F: FnMut(I) -> Fut,
        Fut: Future<Output = Result<O, E>>,
        P: RetryPolicy<E>,
        E: std::fmt::Display + From<Cancelled>,
    {
        let max_retries = self.max_retries();
        let mut attempt: u32 = 1;

        loop {
            if token.is_cancelled() {
                return Err(Cancelled.into());
            }

            match action(input.clone()).await {
                Ok(output) => return Ok(output),
                Err(error) => {
                    if attempt > max_retries || !self.policy.can_retry(&error) {
                        self.policy.on_rethrowing(attempt, max_retries, &error);
                        return Err(error);
                    }

                    self.policy.on_retrying(attempt, max_retries, &error);
                    let delay = self.retry_timeouts[(attempt - 1) as usize];
                    debug!(
                        attempt,
                        max_retries,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after failed attempt"
                    );
                    tokio::select! {
                        _ = token.cancelled() => return Err(Cancelled.into()),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
            }
        }
    }
}
