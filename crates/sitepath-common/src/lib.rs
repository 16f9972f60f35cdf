use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod config;

/// One exchange of the conversation: (human message, assistant message).
pub type ChatTurn = (String, String);

/// A single top-level value returned by the graph backend.
pub type ResultRow = serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Metadata attached to an ingested document chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Path of the file the chunk was ingested from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A retrieved document chunk, serialized the way the chat frontend expects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    pub page_content: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl SourceDocument {
    pub fn new(page_content: impl Into<String>, source: Option<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: DocumentMetadata {
                source,
                extra: HashMap::new(),
            },
        }
    }

    /// Last component of `metadata.source`, accepting both `/` and `\` separators.
    pub fn file_name(&self) -> Option<&str> {
        let source = self.metadata.source.as_deref()?;
        source_file_name(source)
    }
}

/// Extracts the file name from an ingestion path such as `docs/guides/UI Settings.pdf`.
pub fn source_file_name(path: &str) -> Option<&str> {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub text: String,
    #[serde(default)]
    pub source_documents: Vec<SourceDocument>,
}
