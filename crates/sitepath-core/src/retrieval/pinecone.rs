use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sitepath_common::{DocumentMetadata, SourceDocument};
use std::time::Duration;
use super::VectorStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ScoredVector>,
}

#[derive(Debug, Clone, Deserialize)]
struct ScoredVector {
    #[allow(dead_code)]
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

/// Pinecone data-plane client for an existing index.
pub struct PineconeStore {
    client: Client,
    api_key: String,
    index_host: String,
    namespace: Option<String>,
    text_key: String,
}

impl PineconeStore {
    pub fn new(api_key: String, index_host: String, namespace: Option<String>, text_key: String) -> Self {
        let index_host = if index_host.starts_with("http") {
            index_host
        } else {
            format!("https://{}", index_host)
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            index_host,
            namespace,
            text_key,
        }
    }

    fn to_document(&self, mut metadata: Map<String, Value>) -> SourceDocument {
        let page_content = match metadata.remove(&self.text_key) {
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let source = match metadata.remove("source") {
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
            None => None,
        };

        SourceDocument {
            page_content,
            metadata: DocumentMetadata {
                source,
                extra: metadata.into_iter().collect(),
            },
        }
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn similarity_search(&self, embedding: &[f32], k: usize) -> Result<Vec<(SourceDocument, f32)>> {
        let url = format!("{}/query", self.index_host.trim_end_matches('/'));

        let req = QueryRequest {
            vector: embedding,
            top_k: k,
            namespace: self.namespace.as_deref().filter(|ns| !ns.is_empty()),
            include_metadata: true,
            include_values: false,
        };

        let res = self.client.post(&url)
            .header("Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&req)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(anyhow!("Pinecone query error ({}): {}", status, body));
        }

        let parsed: QueryResponse = serde_json::from_str(&body)
            .map_err(|e| anyhow!("Failed to parse Pinecone response: {} - body: {}", e, body))?;

        tracing::debug!("Pinecone returned {} matches", parsed.matches.len());

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| (self.to_document(m.metadata.unwrap_or_default()), m.score))
            .collect())
    }
}
