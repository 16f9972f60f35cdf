pub mod openai;

pub use openai::OpenAIClient;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitepath_common::config::LLMConfig;
use sitepath_common::TokenUsage;
use std::sync::Arc;

pub fn create_llm_client(config: &LLMConfig) -> Option<Arc<dyn LLMClient>> {
    let api_key = config.openai_api_key.clone()?;
    Some(Arc::new(
        OpenAIClient::new(
            api_key,
            config.model.clone(),
            config.embedding_model.clone(),
            config.base_url.clone(),
        )
        .with_temperature(config.temperature),
    ))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LLMResponse<T> {
    pub data: T,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<LLMResponse<Vec<f32>>>;

    /// Batch embed multiple texts. Returns embeddings in the same order as input.
    /// Default implementation falls back to individual embed() calls.
    async fn embed_batch(&self, texts: Vec<String>) -> Result<LLMResponse<Vec<Vec<f32>>>> {
        let mut results = Vec::new();
        let mut total_usage = TokenUsage::default();

        for text in texts {
            let res = self.embed(&text).await?;
            results.push(res.data);
            total_usage.add(&res.usage);
        }
        Ok(LLMResponse { data: results, usage: total_usage })
    }

    async fn generate(&self, prompt: &str) -> Result<LLMResponse<String>>;

    /// Single-turn completion with an optional system message.
    async fn chat(&self, system_prompt: Option<&str>, user_prompt: &str) -> Result<LLMResponse<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_llm_client_requires_key() {
        let config = LLMConfig::default();
        assert!(create_llm_client(&config).is_none());

        let config = LLMConfig {
            openai_api_key: Some("sk-test".into()),
            ..LLMConfig::default()
        };
        assert!(create_llm_client(&config).is_some());
    }
}
