// In-memory graph backend for executor and navigator tests

use super::{GraphConnector, GraphError, GraphSession, TraversalQuery};
use async_trait::async_trait;
use sitepath_common::ResultRow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum Behavior {
    Rows(Vec<ResultRow>),
    /// Submission fails with a network error carrying this message
    Fail(String),
    Hang,
    HangOnConnect,
    RefuseConnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseMode {
    Ok,
    Fail,
    Hang,
}

#[derive(Default)]
struct Record {
    opens: AtomicUsize,
    close_calls: AtomicUsize,
    closes: AtomicUsize,
    submitted: Mutex<Vec<String>>,
    session_ids: Mutex<Vec<usize>>,
}

pub struct MockConnector {
    behavior: Behavior,
    close_mode: CloseMode,
    record: Arc<Record>,
}

impl MockConnector {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Self::with_close(behavior, CloseMode::Ok)
    }

    pub fn with_failing_close(behavior: Behavior) -> Arc<Self> {
        Self::with_close(behavior, CloseMode::Fail)
    }

    pub fn with_close(behavior: Behavior, close_mode: CloseMode) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            close_mode,
            record: Arc::new(Record::default()),
        })
    }

    pub fn opens(&self) -> usize {
        self.record.opens.load(Ordering::SeqCst)
    }

    /// Close attempts, including ones that never finished.
    pub fn close_calls(&self) -> usize {
        self.record.close_calls.load(Ordering::SeqCst)
    }

    /// Completed closes.
    pub fn closes(&self) -> usize {
        self.record.closes.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<String> {
        self.record.submitted.lock().unwrap().clone()
    }

    /// Ids of the sessions that received a submission, in order.
    pub fn session_ids(&self) -> Vec<usize> {
        self.record.session_ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl GraphConnector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn GraphSession>, GraphError> {
        match self.behavior {
            Behavior::HangOnConnect => std::future::pending().await,
            Behavior::RefuseConnect => Err(GraphError::Connection("connection refused".into())),
            _ => {
                let id = self.record.opens.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(Box::new(MockSession {
                    id,
                    behavior: self.behavior.clone(),
                    close_mode: self.close_mode,
                    record: self.record.clone(),
                    closed: false,
                }))
            }
        }
    }
}

struct MockSession {
    id: usize,
    behavior: Behavior,
    close_mode: CloseMode,
    record: Arc<Record>,
    closed: bool,
}

#[async_trait]
impl GraphSession for MockSession {
    async fn submit(&mut self, query: &TraversalQuery) -> Result<Vec<ResultRow>, GraphError> {
        self.record.submitted.lock().unwrap().push(query.gremlin().to_string());
        self.record.session_ids.lock().unwrap().push(self.id);

        match &self.behavior {
            Behavior::Rows(rows) => Ok(rows.clone()),
            Behavior::Fail(msg) => Err(GraphError::Connection(msg.clone())),
            _ => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), GraphError> {
        assert!(!self.closed, "session {} closed twice", self.id);
        self.record.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.close_mode == CloseMode::Hang {
            std::future::pending::<()>().await;
        }
        self.closed = true;
        self.record.closes.fetch_add(1, Ordering::SeqCst);
        if self.close_mode == CloseMode::Fail {
            return Err(GraphError::Protocol("close frame rejected".into()));
        }
        Ok(())
    }
}
