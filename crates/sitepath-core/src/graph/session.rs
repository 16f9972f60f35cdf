use super::{GraphError, TraversalQuery};
use async_trait::async_trait;
use sitepath_common::ResultRow;

/// Opens sessions against a graph endpoint.
#[async_trait]
pub trait GraphConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn GraphSession>, GraphError>;
}

/// One authenticated session, used for a single submission and then closed.
#[async_trait]
pub trait GraphSession: Send {
    /// Submits the query and waits for the complete result set.
    async fn submit(&mut self, query: &TraversalQuery) -> Result<Vec<ResultRow>, GraphError>;

    async fn close(&mut self) -> Result<(), GraphError>;
}
