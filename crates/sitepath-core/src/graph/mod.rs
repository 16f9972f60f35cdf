// Graph Query Module Exports
//
// Path queries against a remote Gremlin endpoint: query text, session seam,
// scoped execution and result parsing.

pub mod query_builder;
pub mod session;
pub mod executor;
pub mod path;

pub use query_builder::{generate_query, PathQueryBuilder, TraversalQuery};
pub use session::{GraphConnector, GraphSession};
pub use executor::{ExecutionState, GraphQueryExecutor};
pub use path::PathResult;

use std::time::Duration;

/// Failure kinds surfaced by graph query construction and execution.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("graph configuration error: {0}")]
    Configuration(String),

    #[error("failed to connect to graph endpoint: {0}")]
    Connection(String),

    #[error("graph endpoint rejected credentials: {0}")]
    Authentication(String),

    #[error("graph query failed ({code}): {message}")]
    Submission { code: u16, message: String },

    #[error("graph protocol error: {0}")]
    Protocol(String),

    #[error("graph query timed out after {0:?}")]
    Timeout(Duration),
}

impl GraphError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GraphError::Timeout(_))
    }
}

#[cfg(test)]
pub(crate) mod testing;
