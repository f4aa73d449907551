//! Run-scoped tracing context.
//!
//! # Design
//! - Every decommission run is tagged with one identifier (the idempotency token) so
//!   logs from all phases can be correlated with the provider's audit trail.
//! - The identifier lives in task-local storage and on an entered span.

use std::future::Future;
use std::sync::Arc;

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the top-level run span entered for the lifetime of the process.
pub struct RunContextGuard {
    _guard: Entered<'static>,
}

impl RunContextGuard {
    /// Enter the run span, recording the cluster mode and build SHA.
    #[must_use]
    pub fn new(mode: impl Into<String>) -> Self {
        let mode = mode.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "nodecull",
            mode = %mode,
            build_sha = %build_sha(),
            run_id = tracing::field::Empty
        )));
        let guard = span.enter();
        Self { _guard: guard }
    }

    /// Record the run identifier on the top-level span.
    pub fn record_run_id(&self, run_id: &str) {
        Span::current().record("run_id", tracing::field::display(run_id));
    }
}

/// Retrieve the run identifier of the enclosing [`with_run_context`] scope.
#[must_use]
pub fn current_run_id() -> Option<String> {
    ACTIVE_RUN.try_with(|run_id| run_id.to_string()).ok()
}

/// Execute `fut` with `run_id` available to [`current_run_id`].
pub async fn with_run_context<Fut, T>(run_id: impl Into<String>, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    ACTIVE_RUN.scope(Arc::from(run_id.into()), fut).await
}

tokio::task_local! {
    static ACTIVE_RUN: Arc<str>;
}
