use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use sitepath_core::ChatTurn;
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<ChatTurn>>,
}

/// Trims the question and flattens it onto a single line.
pub fn sanitize_question(question: &str) -> String {
    question.trim().replace("\r\n", " ").replace('\n', " ")
}

fn no_question() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "No question in the request" })),
    )
        .into_response()
}

pub async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let payload: ChatRequest = if body.is_empty() {
        ChatRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Rejected chat request body: {}", e);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": format!("Invalid request body: {}", e) })),
                )
                    .into_response();
            }
        }
    };

    tracing::info!("question: {:?}", payload.question);

    let question = match payload.question.as_deref() {
        Some(q) if !q.trim().is_empty() => sanitize_question(q),
        _ => return no_question(),
    };

    // Navigation logging runs detached; the reply never waits on the graph.
    if let Some(navigator) = state.navigator.clone() {
        tokio::spawn(async move {
            navigator.log_path().await;
        });
    }

    let history = payload.history.unwrap_or_default();

    match state.chain.call(&question, &history).await {
        Ok(response) => {
            for doc in &response.source_documents {
                let source = doc.metadata.source.as_deref().unwrap_or("<unknown>");
                tracing::info!("Source: {}", source);
                if let Some(file_name) = doc.file_name() {
                    tracing::info!("File name: {}", file_name);
                }
            }
            tracing::info!("response: {}", response.text);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("Chat chain failed: {:#}", e);
            let message = e.to_string();
            let message = if message.is_empty() {
                "Something went wrong".to_string()
            } else {
                message
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response()
        }
    }
}

pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}
