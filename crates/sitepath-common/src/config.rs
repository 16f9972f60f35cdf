use serde::{Deserialize, Serialize};
use std::env;
use config::{Config, ConfigError, File, Environment};

// --- Constants for Default Configuration ---
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:3000";

pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.0;

pub const DEFAULT_VECTOR_TEXT_KEY: &str = "text";
pub const DEFAULT_VECTOR_TOP_K: usize = 4;

pub const DEFAULT_GRAPH_MIME_TYPE: &str = "application/vnd.gremlin-v2.0+json";
pub const DEFAULT_GRAPH_QUERY_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_GRAPH_VERTEX_LABEL: &str = "webpages";
pub const DEFAULT_GRAPH_EDGE_LABEL: &str = "button";
pub const DEFAULT_GRAPH_START_PAGE: &str = "UI Settings";
pub const DEFAULT_GRAPH_GOAL_PAGE: &str = "GeniusPLUS launch";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    pub model: String,
    pub embedding_model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    pub api_key: Option<String>,
    /// Data-plane host of the index, e.g. `https://docs-abc123.svc.us-east1-gcp.pinecone.io`
    pub index_host: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    pub text_key: String,
    pub top_k: usize,
}

/// Connection settings for the Gremlin endpoint that stores the site navigation graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// `wss://<account>.gremlin.cosmos.azure.com:443`
    pub endpoint: Option<String>,
    pub auth_key: Option<String>,
    pub database: Option<String>,
    pub container: Option<String>,
    pub mime_type: String,
    pub query_timeout_ms: u64,
    pub vertex_label: String,
    pub edge_label: String,
    pub start_page: String,
    pub goal_page: String,
    /// Pass page names as bindings instead of interpolating them into the query text
    #[serde(default)]
    pub bind_parameters: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub vector_store: VectorStoreConfig,
    pub graph: GraphConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_SERVER_ADDR.into(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: None,
            model: DEFAULT_LLM_MODEL.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.into(),
            temperature: DEFAULT_LLM_TEMPERATURE,
        }
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            index_host: None,
            namespace: None,
            text_key: DEFAULT_VECTOR_TEXT_KEY.into(),
            top_k: DEFAULT_VECTOR_TOP_K,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            auth_key: None,
            database: None,
            container: None,
            mime_type: DEFAULT_GRAPH_MIME_TYPE.into(),
            query_timeout_ms: DEFAULT_GRAPH_QUERY_TIMEOUT_MS,
            vertex_label: DEFAULT_GRAPH_VERTEX_LABEL.into(),
            edge_label: DEFAULT_GRAPH_EDGE_LABEL.into(),
            start_page: DEFAULT_GRAPH_START_PAGE.into(),
            goal_page: DEFAULT_GRAPH_GOAL_PAGE.into(),
            bind_parameters: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            llm: LLMConfig::default(),
            vector_store: VectorStoreConfig::default(),
            graph: GraphConfig::default(),
        }
    }
}

/// Resolved credentials for one Gremlin endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphCredentials {
    pub endpoint: String,
    pub auth_key: String,
    pub database: String,
    pub container: String,
}

impl GraphCredentials {
    /// SASL username in the form Cosmos DB expects.
    pub fn username(&self) -> String {
        format!("/dbs/{}/colls/{}", self.database, self.container)
    }
}

impl GraphConfig {
    /// Returns the endpoint credentials, or an error naming every missing setting.
    pub fn credentials(&self) -> Result<GraphCredentials, ConfigError> {
        let fields = [
            ("graph.endpoint", &self.endpoint),
            ("graph.auth_key", &self.auth_key),
            ("graph.database", &self.database),
            ("graph.container", &self.container),
        ];

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(ConfigError::Message(format!(
                "missing graph settings: {}",
                missing.join(", ")
            )));
        }

        Ok(GraphCredentials {
            endpoint: self.endpoint.clone().unwrap_or_default(),
            auth_key: self.auth_key.clone().unwrap_or_default(),
            database: self.database.clone().unwrap_or_default(),
            container: self.container.clone().unwrap_or_default(),
        })
    }

    pub fn query_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.query_timeout_ms)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            // Default settings
            .set_default("server.addr", DEFAULT_SERVER_ADDR)?
            .set_default("llm.model", DEFAULT_LLM_MODEL)?
            .set_default("llm.embedding_model", DEFAULT_EMBEDDING_MODEL)?
            .set_default("llm.temperature", DEFAULT_LLM_TEMPERATURE as f64)?
            .set_default("vector_store.text_key", DEFAULT_VECTOR_TEXT_KEY)?
            .set_default("vector_store.top_k", DEFAULT_VECTOR_TOP_K as i64)?
            .set_default("graph.mime_type", DEFAULT_GRAPH_MIME_TYPE)?
            .set_default("graph.query_timeout_ms", DEFAULT_GRAPH_QUERY_TIMEOUT_MS)?
            .set_default("graph.vertex_label", DEFAULT_GRAPH_VERTEX_LABEL)?
            .set_default("graph.edge_label", DEFAULT_GRAPH_EDGE_LABEL)?
            .set_default("graph.start_page", DEFAULT_GRAPH_START_PAGE)?
            .set_default("graph.goal_page", DEFAULT_GRAPH_GOAL_PAGE)?
            .set_default("graph.bind_parameters", false)?

            // File: config.toml
            .add_source(File::with_name("config").required(false))

            // Environment: SITEPATH__GRAPH__ENDPOINT=wss://... -> graph.endpoint
            .add_source(Environment::with_prefix("SITEPATH").separator("__"))

            // Conventional variable names used by the hosting environment
            .set_override_option("llm.openai_api_key", env::var("OPENAI_API_KEY").ok())?
            .set_override_option("vector_store.api_key", env::var("PINECONE_API_KEY").ok())?
            .set_override_option("vector_store.index_host", env::var("PINECONE_INDEX_HOST").ok())?
            .set_override_option("vector_store.namespace", env::var("PINECONE_NAME_SPACE").ok())?
            .set_override_option("graph.endpoint", env::var("GREMLIN_ENDPOINT").ok())?
            .set_override_option("graph.auth_key", env::var("GREMLIN_KEY").ok())?
            .set_override_option("graph.database", env::var("GREMLIN_DATABASE").ok())?
            .set_override_option("graph.container", env::var("GREMLIN_CONTAINER").ok())?

            .build()?;

        s.try_deserialize()
    }
}
