//! The pluggable tool-execution boundary.

use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::request::Request;
use crate::result::ExecResult;

/// The single-method capability that agent implementations must satisfy.
///
/// A handler takes a validated [`Request`] and produces an [`ExecResult`].
/// The `scope` token is the execution's cancellation scope: it fires when
/// the caller cancels or the resolved deadline elapses, and a well-behaved
/// long-running handler should observe it cooperatively.
///
/// Returning `Err` means the handler failed without producing a result; the
/// runtime classifies that as `HANDLER_ERROR` and retries within its budget.
/// To control retry behavior, return an `ExecResult` whose [`ExecError`]
/// declares whether the failure is retryable.
///
/// [`ExecError`]: crate::ExecError
#[async_trait]
pub trait Handler: Send + Sync {
    /// Process one request to a terminal result.
    async fn handle(
        &self,
        scope: CancellationToken,
        req: Request,
    ) -> Result<ExecResult, HandlerError>;
}

/// Adapter implementing [`Handler`] for a plain async function or closure.
///
/// Built with [`handler_fn`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(CancellationToken, Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ExecResult, HandlerError>> + Send,
{
    async fn handle(
        &self,
        scope: CancellationToken,
        req: Request,
    ) -> Result<ExecResult, HandlerError> {
        (self.0)(scope, req).await
    }
}

/// Wrap an async function or closure as a [`Handler`].
///
/// # Example
///
/// ```
/// use overseer_contract::{ExecResult, handler_fn};
///
/// let echo = handler_fn(|_scope, req| async move {
///     Ok(ExecResult::success(req.task_id, req.arguments))
/// });
/// # let _ = echo;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(CancellationToken, Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ExecResult, HandlerError>> + Send,
{
    FnHandler(f)
}
