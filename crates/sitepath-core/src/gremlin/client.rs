use super::protocol::{
    RequestMessage, ResponseMessage, STATUS_AUTHENTICATE, STATUS_NO_CONTENT, STATUS_PARTIAL_CONTENT,
    STATUS_SUCCESS, STATUS_UNAUTHORIZED,
};
use crate::graph::{GraphConnector, GraphError, GraphSession, TraversalQuery};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use sitepath_common::config::{GraphConfig, GraphCredentials};
use sitepath_common::ResultRow;
use std::sync::Once;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

static CRYPTO_PROVIDER: Once = Once::new();

/// Installs ring as the process-wide rustls provider used for `wss://`.
fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        if rustls::crypto::ring::default_provider().install_default().is_err() {
            tracing::debug!("rustls crypto provider already installed");
        }
    });
}

/// Opens one WebSocket session per call against a Gremlin endpoint.
#[derive(Debug, Clone)]
pub struct GremlinConnector {
    credentials: GraphCredentials,
    mime_type: String,
}

impl GremlinConnector {
    pub fn new(credentials: GraphCredentials, mime_type: impl Into<String>) -> Self {
        Self {
            credentials,
            mime_type: mime_type.into(),
        }
    }

    pub fn from_config(config: &GraphConfig) -> Result<Self, GraphError> {
        let credentials = config
            .credentials()
            .map_err(|e| GraphError::Configuration(e.to_string()))?;
        Ok(Self::new(credentials, config.mime_type.clone()))
    }
}

#[async_trait]
impl GraphConnector for GremlinConnector {
    async fn connect(&self) -> Result<Box<dyn GraphSession>, GraphError> {
        install_crypto_provider();

        let endpoint = self.credentials.endpoint.as_str();
        let (stream, response) = connect_async(endpoint)
            .await
            .map_err(|e| GraphError::Connection(format!("{}: {}", endpoint, e)))?;

        tracing::debug!("Gremlin session opened to {} (HTTP {})", endpoint, response.status());

        Ok(Box::new(GremlinSession {
            stream,
            username: self.credentials.username(),
            password: self.credentials.auth_key.clone(),
            mime_type: self.mime_type.clone(),
            closed: false,
        }))
    }
}

pub struct GremlinSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    username: String,
    password: String,
    mime_type: String,
    closed: bool,
}

impl GremlinSession {
    async fn send(&mut self, request: RequestMessage) -> Result<(), GraphError> {
        let frame = request.encode(&self.mime_type)?;
        self.stream
            .send(Message::binary(frame))
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))
    }

    async fn next_response(&mut self) -> Result<ResponseMessage, GraphError> {
        loop {
            let message = self
                .stream
                .next()
                .await
                .ok_or_else(|| GraphError::Protocol("connection closed before response".into()))?
                .map_err(|e| GraphError::Connection(e.to_string()))?;

            match message {
                Message::Text(text) => return ResponseMessage::decode(text.as_bytes()),
                Message::Binary(bytes) => return ResponseMessage::decode(&bytes[..]),
                Message::Close(frame) => {
                    return Err(GraphError::Protocol(format!(
                        "server closed connection: {:?}",
                        frame
                    )))
                }
                // ping/pong are answered by tungstenite
                _ => continue,
            }
        }
    }
}

#[async_trait]
impl GraphSession for GremlinSession {
    async fn submit(&mut self, query: &TraversalQuery) -> Result<Vec<ResultRow>, GraphError> {
        let request_id = Uuid::new_v4();
        self.send(RequestMessage::eval(request_id, query)).await?;

        let mut rows = Vec::new();
        let mut challenged = false;

        loop {
            let response = self.next_response().await?;
            if response.request_id.is_some_and(|id| id != request_id) {
                tracing::debug!("Ignoring Gremlin response for unrelated request {:?}", response.request_id);
                continue;
            }

            match response.status.code {
                STATUS_AUTHENTICATE => {
                    if challenged {
                        return Err(GraphError::Authentication(
                            "server repeated the authentication challenge".into(),
                        ));
                    }
                    challenged = true;
                    let auth = RequestMessage::authentication(request_id, &self.username, &self.password);
                    self.send(auth).await?;
                }
                STATUS_PARTIAL_CONTENT => rows.extend(response.rows()),
                STATUS_SUCCESS => {
                    rows.extend(response.rows());
                    return Ok(rows);
                }
                STATUS_NO_CONTENT => return Ok(rows),
                STATUS_UNAUTHORIZED => {
                    return Err(GraphError::Authentication(response.status.message));
                }
                code => {
                    return Err(GraphError::Submission {
                        code,
                        message: response.status.message,
                    });
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), GraphError> {
        if self.closed {
            return Ok(());
        }

        // Only marked closed once the attempt settles, so an interrupted
        // close can be finished by a later call.
        let outcome = match tokio::time::timeout(CLOSE_TIMEOUT, self.stream.close(None)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(GraphError::Connection(e.to_string())),
            Err(_) => Err(GraphError::Timeout(CLOSE_TIMEOUT)),
        };
        self.closed = true;
        outcome
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
