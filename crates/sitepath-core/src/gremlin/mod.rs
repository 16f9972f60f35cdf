// Gremlin Server client
//
// WebSocket transport with GraphSON framing and SASL PLAIN authentication,
// as spoken by Azure Cosmos DB and Apache TinkerPop servers.

pub mod protocol;
pub mod client;

pub use client::{GremlinConnector, GremlinSession};
