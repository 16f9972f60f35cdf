pub mod graph;
pub mod gremlin;
pub mod llm;
pub mod retrieval;
pub mod chain;
pub mod navigator;

pub use chain::ConversationalRetrievalChain;
pub use graph::{generate_query, GraphError, GraphQueryExecutor, PathResult, TraversalQuery};
pub use gremlin::GremlinConnector;
pub use llm::{LLMClient, OpenAIClient};
pub use navigator::PathNavigator;
pub use retrieval::{PineconeStore, VectorStore};

// Re-export common types for convenience
pub use sitepath_common::{ChatResponse, ChatTurn, SourceDocument};
