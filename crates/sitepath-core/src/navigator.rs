use crate::graph::{GraphError, GraphQueryExecutor, PathQueryBuilder, PathResult, TraversalQuery};
use crate::gremlin::GremlinConnector;
use sitepath_common::config::GraphConfig;
use std::sync::Arc;
use std::time::Duration;

/// Finds and logs the navigation path between two configured site pages.
#[derive(Clone)]
pub struct PathNavigator {
    executor: GraphQueryExecutor,
    query: TraversalQuery,
    property_key: String,
    timeout: Duration,
}

impl PathNavigator {
    pub fn new(executor: GraphQueryExecutor, config: &GraphConfig) -> Result<Self, GraphError> {
        let query = PathQueryBuilder::new(config.start_page.as_str(), config.goal_page.as_str())
            .vertex_label(config.vertex_label.as_str())
            .edge_label(config.edge_label.as_str())
            .bind_parameters(config.bind_parameters)
            .build()?;

        Ok(Self {
            executor,
            query,
            property_key: config.vertex_label.clone(),
            timeout: config.query_timeout(),
        })
    }

    /// Navigator backed by a live Gremlin endpoint.
    pub fn from_config(config: &GraphConfig) -> Result<Self, GraphError> {
        let connector = GremlinConnector::from_config(config)?;
        Self::new(GraphQueryExecutor::new(Arc::new(connector)), config)
    }

    pub fn query(&self) -> &TraversalQuery {
        &self.query
    }

    pub async fn find_paths(&self) -> Result<Vec<PathResult>, GraphError> {
        let rows = self.executor.execute_with_timeout(&self.query, self.timeout).await?;
        Ok(PathResult::from_rows(&rows))
    }

    /// Runs the path query and logs every object on the returned paths.
    /// Failures are logged and swallowed.
    pub async fn log_path(&self) {
        match self.find_paths().await {
            Ok(paths) if paths.is_empty() => {
                tracing::info!("No navigation path found");
            }
            Ok(paths) => {
                for (n, path) in paths.iter().enumerate() {
                    tracing::info!(
                        "Navigation path {}: {}",
                        n + 1,
                        path.vertex_names(&self.property_key).join(" -> ")
                    );
                    tracing::info!("Individual Objects:");
                    for (i, object) in path.objects.iter().enumerate() {
                        tracing::info!("Object {}: {}", i + 1, object);
                    }
                }
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("Navigation path query abandoned: {}", e);
            }
            Err(e) => {
                tracing::error!("Navigation path query failed: {}", e);
            }
        }
    }
}
