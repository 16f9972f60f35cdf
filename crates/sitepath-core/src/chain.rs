// Conversational retrieval chain: condense -> retrieve -> answer

use crate::llm::LLMClient;
use crate::retrieval::VectorStore;
use anyhow::{Context, Result};
use moka::future::Cache;
use sitepath_common::{ChatResponse, ChatTurn, SourceDocument};
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 4;

fn condense_prompt(chat_history: &str, question: &str) -> String {
    format!(
        "Given the following conversation and a follow up question, \
rephrase the follow up question to be a standalone question.\n\n\
Chat History:\n{chat_history}\n\
Follow Up Input: {question}\n\
Standalone question:"
    )
}

fn qa_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful AI assistant. Use the following pieces of context \
to answer the question at the end.\n\
If you don't know the answer, just say you don't know. DO NOT try to make up an answer.\n\
If the question is not related to the context, politely respond that you are tuned to only \
answer questions that are related to the context.\n\n\
{context}\n\n\
Question: {question}\n\
Helpful answer in markdown:"
    )
}

pub struct ConversationalRetrievalChain {
    llm: Arc<dyn LLMClient>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
    embedding_cache: Cache<String, Vec<f32>>,
}

impl ConversationalRetrievalChain {
    pub fn new(llm: Arc<dyn LLMClient>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            llm,
            store,
            top_k: DEFAULT_TOP_K,
            embedding_cache: Cache::new(10_000),
        }
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k.max(1);
        self
    }

    /// Answers `question` in the context of `history`, returning the documents used.
    pub async fn call(&self, question: &str, history: &[ChatTurn]) -> Result<ChatResponse> {
        let standalone = self.standalone_question(question, history).await?;

        let documents = self.retrieve(&standalone).await?;
        tracing::debug!("Retrieved {} documents for '{}'", documents.len(), standalone);

        let prompt = qa_prompt(&format_context(&documents), &standalone);

        let answer = self
            .llm
            .generate(&prompt)
            .await
            .context("Failed to generate answer")?;

        Ok(ChatResponse {
            text: answer.data.trim().to_string(),
            source_documents: documents,
        })
    }

    async fn standalone_question(&self, question: &str, history: &[ChatTurn]) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let prompt = condense_prompt(&format_history(history), question);

        let condensed = self
            .llm
            .generate(&prompt)
            .await
            .context("Failed to condense follow-up question")?;

        let condensed = condensed.data.trim();
        if condensed.is_empty() {
            return Ok(question.to_string());
        }
        tracing::debug!("Condensed question: '{}'", condensed);
        Ok(condensed.to_string())
    }

    async fn retrieve(&self, question: &str) -> Result<Vec<SourceDocument>> {
        let key = question.to_string();
        let embedding = if let Some(cached) = self.embedding_cache.get(&key).await {
            tracing::debug!("Embedding Cache Hit for: '{}'", key);
            cached
        } else {
            let res = self.llm.embed(question).await.context("Failed to embed question")?;
            self.embedding_cache.insert(key, res.data.clone()).await;
            res.data
        };

        let matches = self
            .store
            .similarity_search(&embedding, self.top_k)
            .await
            .context("Vector store query failed")?;

        Ok(matches.into_iter().map(|(doc, _score)| doc).collect())
    }
}

fn format_history(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|(human, ai)| format!("Human: {}\nAssistant: {}", human, ai))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_context(documents: &[SourceDocument]) -> String {
    documents
        .iter()
        .map(|d| d.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
