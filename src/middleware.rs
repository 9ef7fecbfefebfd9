//! Per-request instrumentation middleware.
//!
//! Wraps every application route: delegate first, record exactly one
//! `add(1)` on the greetings counter once the downstream completes. The
//! recording step is armed as a drop guard *before* delegation, so it
//! fires on every exit path, including error responses, panic unwind and
//! task cancellation. Downstream errors pass through untouched.
//!
//! The counter handle is process-wide and injected through router state;
//! the middleware never creates instruments of its own. Successful and
//! faulted requests currently share one counter; a split errors counter
//! would need its own registration in [`AppMetrics`].
//!
//! [`AppMetrics`]: crate::observability::metrics::AppMetrics

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::observability::metrics::{AppMetrics, CounterHandle};

/// Records one completion when dropped.
struct CompletionGuard {
    counter: CounterHandle,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.counter.add(1);
    }
}

/// Middleware function installed via `axum::middleware::from_fn_with_state`.
pub async fn track_requests(
    State(metrics): State<AppMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let _completion = CompletionGuard {
        counter: metrics.greetings.clone(),
    };
    next.run(request).await
}
