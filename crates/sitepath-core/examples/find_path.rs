// Print the navigation path between the configured start and goal pages.
//
// GREMLIN_ENDPOINT=wss://... GREMLIN_KEY=... GREMLIN_DATABASE=... GREMLIN_CONTAINER=... \
//     cargo run -p sitepath-core --example find_path
use sitepath_common::config::AppConfig;
use sitepath_core::PathNavigator;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load().expect("Failed to load configuration");
    let navigator = match PathNavigator::from_config(&config.graph) {
        Ok(navigator) => navigator,
        Err(e) => {
            println!("❌ {}", e);
            return;
        }
    };

    println!("=== Path query ===\n{}\n", navigator.query());

    let start = std::time::Instant::now();
    match navigator.find_paths().await {
        Ok(paths) if paths.is_empty() => println!("No path from '{}' to '{}'", config.graph.start_page, config.graph.goal_page),
        Ok(paths) => {
            for (n, path) in paths.iter().enumerate() {
                println!("✅ Path {} ({} hops): {}", n + 1, path.hops(), path.vertex_names(&config.graph.vertex_label).join(" -> "));
                for edge in path.edges() {
                    println!("   - via {}", edge);
                }
            }
        }
        Err(e) => println!("❌ Query failed: {}", e),
    }
    println!("\nElapsed: {:?}", start.elapsed());
}
