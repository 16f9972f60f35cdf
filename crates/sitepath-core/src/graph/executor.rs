// Graph Query Executor - one session per submission, released on every exit path

use super::{GraphConnector, GraphError, GraphSession, TraversalQuery};
use sitepath_common::ResultRow;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Lifecycle of a single execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Idle,
    Connecting,
    Submitted,
    Succeeded,
    Failed,
    TimedOut,
    Closed,
}

impl ExecutionState {
    fn settled<T>(outcome: &Result<T, GraphError>) -> Self {
        match outcome {
            Ok(_) => ExecutionState::Succeeded,
            Err(e) => ExecutionState::failed(e),
        }
    }

    fn failed(error: &GraphError) -> Self {
        if error.is_timeout() {
            ExecutionState::TimedOut
        } else {
            ExecutionState::Failed
        }
    }
}

#[derive(Clone)]
pub struct GraphQueryExecutor {
    connector: Arc<dyn GraphConnector>,
}

impl GraphQueryExecutor {
    pub fn new(connector: Arc<dyn GraphConnector>) -> Self {
        Self { connector }
    }

    /// Opens a session, submits `query` once and closes the session.
    pub async fn execute(&self, query: &TraversalQuery) -> Result<Vec<ResultRow>, GraphError> {
        self.run(query, None).await
    }

    /// Like [`execute`](Self::execute), but the whole call is bounded by `timeout`.
    /// On expiry the pending I/O is dropped and [`GraphError::Timeout`] is
    /// returned; a session close that cannot finish in time completes in the
    /// background.
    pub async fn execute_with_timeout(
        &self,
        query: &TraversalQuery,
        timeout: Duration,
    ) -> Result<Vec<ResultRow>, GraphError> {
        self.run(query, Some((Instant::now() + timeout, timeout))).await
    }

    async fn run(
        &self,
        query: &TraversalQuery,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<Vec<ResultRow>, GraphError> {
        let mut state = ExecutionState::Idle;
        transition(&mut state, ExecutionState::Connecting);

        let session = match within(deadline, self.connector.connect()).await {
            Ok(session) => session,
            Err(e) => {
                transition(&mut state, ExecutionState::failed(&e));
                transition(&mut state, ExecutionState::Closed);
                return Err(e);
            }
        };

        let mut guard = SessionGuard::new(session);
        transition(&mut state, ExecutionState::Submitted);

        let outcome = within(deadline, guard.submit(query)).await;
        transition(&mut state, ExecutionState::settled(&outcome));

        // Close shares the deadline; a close still pending then is finished
        // by the guard's Drop.
        let closed_in_time = match deadline {
            Some((at, _)) => tokio::time::timeout_at(at, guard.close()).await.is_ok(),
            None => {
                guard.close().await;
                true
            }
        };
        if !closed_in_time {
            tracing::debug!("Graph session close outlived the deadline, finishing in background");
        }
        drop(guard);
        transition(&mut state, ExecutionState::Closed);

        if let Ok(rows) = &outcome {
            tracing::debug!("Graph query returned {} rows", rows.len());
        }
        outcome
    }
}

fn transition(state: &mut ExecutionState, next: ExecutionState) {
    tracing::debug!("Graph execution {:?} -> {:?}", state, next);
    *state = next;
}

async fn within<T, F>(deadline: Option<(Instant, Duration)>, fut: F) -> Result<T, GraphError>
where
    F: Future<Output = Result<T, GraphError>>,
{
    match deadline {
        Some((at, budget)) => tokio::time::timeout_at(at, fut)
            .await
            .map_err(|_| GraphError::Timeout(budget))?,
        None => fut.await,
    }
}

/// Owns the session for the duration of one execution.
///
/// If the owning future is dropped before [`SessionGuard::close`] runs, the
/// session is handed to the runtime and closed in the background.
struct SessionGuard {
    session: Option<Box<dyn GraphSession>>,
}

impl SessionGuard {
    fn new(session: Box<dyn GraphSession>) -> Self {
        Self { session: Some(session) }
    }

    async fn submit(&mut self, query: &TraversalQuery) -> Result<Vec<ResultRow>, GraphError> {
        match self.session.as_mut() {
            Some(session) => session.submit(query).await,
            None => Err(GraphError::Protocol("session already closed".into())),
        }
    }

    /// Closes the session. If this future is dropped first, the session stays
    /// in the guard and `Drop` finishes the close.
    async fn close(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if let Err(e) = session.close().await {
                tracing::warn!("Failed to close graph session: {}", e);
            }
        }
        self.session = None;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!("Graph execution abandoned, closing session in background");
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        tracing::warn!("Failed to close abandoned graph session: {}", e);
                    }
                });
            }
            Err(_) => {
                tracing::warn!("Graph session dropped outside a runtime; connection torn down without close");
            }
        }
    }
}
