use axum::{
    routing::{get, post},
    Router,
};
use sitepath_common::config::AppConfig;
use sitepath_core::{llm, retrieval, ConversationalRetrievalChain, PathNavigator};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod handlers;

pub(crate) struct AppState {
    chain: ConversationalRetrievalChain,
    navigator: Option<PathNavigator>,
}

pub(crate) fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route(
            "/api/chat",
            post(handlers::chat).fallback(handlers::method_not_allowed),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    match dotenvy::dotenv() {
        Ok(path) => tracing::info!("Loaded .env from: {:?}", path),
        Err(e) => tracing::warn!("Failed to load .env file: {}. Using system environment variables.", e),
    }

    let config = AppConfig::load().expect("Failed to load configuration");
    tracing::info!("Using LLM Model: {}", config.llm.model);
    tracing::info!("Using Embedding Model: {}", config.llm.embedding_model);

    let llm_client = llm::create_llm_client(&config.llm)
        .expect("Fatal: OPENAI_API_KEY is required for Sitepath Server");
    let vector_store = retrieval::create_vector_store(&config.vector_store)
        .expect("Fatal: PINECONE_API_KEY and PINECONE_INDEX_HOST are required for Sitepath Server");
    tracing::info!(
        "Initialized Pinecone store (namespace: {:?}, top_k: {})",
        config.vector_store.namespace,
        config.vector_store.top_k
    );

    let chain = ConversationalRetrievalChain::new(llm_client, vector_store)
        .with_top_k(config.vector_store.top_k);

    let navigator = match PathNavigator::from_config(&config.graph) {
        Ok(navigator) => {
            tracing::info!(
                "Navigation logging enabled: '{}' -> '{}' (timeout {:?})",
                config.graph.start_page,
                config.graph.goal_page,
                config.graph.query_timeout()
            );
            Some(navigator)
        }
        Err(e) => {
            tracing::warn!("Navigation logging disabled: {}", e);
            None
        }
    };

    let state = Arc::new(AppState { chain, navigator });

    let addr: SocketAddr = config.server.addr.parse().expect("Invalid server.addr");
    tracing::info!("HTTP API listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            tracing::info!("Shutdown signal received.");
        })
        .await
        .unwrap();

    tracing::info!("Sitepath Server stopped.");
}

async fn root() -> &'static str {
    "Sitepath Server is running"
}
