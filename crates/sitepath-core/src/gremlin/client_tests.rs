#[cfg(test)]
mod tests {
    use crate::graph::{generate_query, GraphConnector, GraphError, GraphQueryExecutor, PathResult};
    use crate::gremlin::client::GremlinConnector;
    use crate::gremlin::protocol::sasl_plain;
    use futures::{SinkExt, StreamExt};
    use serde_json::{json, Value};
    use sitepath_common::config::{GraphCredentials, DEFAULT_GRAPH_MIME_TYPE};
    use std::future::Future;
    use std::sync::Arc;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::WebSocketStream;

    const TEST_KEY: &str = "test-auth-key==";

    type ServerSocket = WebSocketStream<TcpStream>;

    /// Accepts one WebSocket connection and hands it to `script`.
    async fn spawn_server<F, Fut>(script: F) -> (String, oneshot::Receiver<()>)
    where
        F: FnOnce(ServerSocket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (done_tx, done_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            script(ws).await;
            let _ = done_tx.send(());
        });

        (format!("ws://{}", addr), done_rx)
    }

    fn connector(endpoint: String) -> GremlinConnector {
        GremlinConnector::new(
            GraphCredentials {
                endpoint,
                auth_key: TEST_KEY.to_string(),
                database: "websiteDEMO".to_string(),
                container: "webpages".to_string(),
            },
            DEFAULT_GRAPH_MIME_TYPE,
        )
    }

    async fn read_request(ws: &mut ServerSocket) -> Value {
        loop {
            match ws.next().await.unwrap().unwrap() {
                Message::Binary(frame) => {
                    let mime_len = frame[0] as usize;
                    assert_eq!(&frame[1..=mime_len], DEFAULT_GRAPH_MIME_TYPE.as_bytes());
                    return serde_json::from_slice(&frame[1 + mime_len..]).unwrap();
                }
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("unexpected client message: {:?}", other),
            }
        }
    }

    async fn respond(ws: &mut ServerSocket, request_id: &Value, code: u16, data: Value) {
        let body = json!({
            "requestId": request_id,
            "status": {"code": code, "message": format!("status {}", code), "attributes": {}},
            "result": {"data": data, "meta": {}}
        });
        ws.send(Message::text(body.to_string())).await.unwrap();
    }

    async fn expect_close(ws: &mut ServerSocket) -> bool {
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Close(_)) => return true,
                Ok(_) => continue,
                Err(_) => return false,
            }
        }
        false
    }

    fn path_row(pages: &[&str]) -> Value {
        let mut objects = Vec::new();
        for (i, page) in pages.iter().enumerate() {
            if i > 0 {
                objects.push(json!({"subLabel": ["menu"], "label": [format!("to {}", page)]}));
            }
            objects.push(json!({"webpages": [page]}));
        }
        json!({"labels": vec![json!([]); objects.len()], "objects": objects})
    }

    #[tokio::test]
    async fn test_authenticates_and_collects_partial_results() {
        let (endpoint, done) = spawn_server(|mut ws| async move {
            let eval = read_request(&mut ws).await;
            assert_eq!(eval["op"], "eval");
            assert!(eval["args"]["gremlin"].as_str().unwrap().contains("'UI Settings'"));
            let id = eval["requestId"].clone();

            respond(&mut ws, &id, 407, Value::Null).await;

            let auth = read_request(&mut ws).await;
            assert_eq!(auth["op"], "authentication");
            assert_eq!(auth["requestId"], id);
            assert_eq!(auth["args"]["sasl"], sasl_plain("/dbs/websiteDEMO/colls/webpages", TEST_KEY));

            respond(&mut ws, &id, 206, json!([path_row(&["UI Settings", "Launcher"])])).await;
            respond(&mut ws, &id, 200, json!([path_row(&["UI Settings", "GeniusPLUS launch"])])).await;

            assert!(expect_close(&mut ws).await);
        })
        .await;

        let executor = GraphQueryExecutor::new(Arc::new(connector(endpoint)));
        let query = generate_query("UI Settings", "GeniusPLUS launch").unwrap();
        let rows = executor.execute(&query).await.unwrap();

        assert_eq!(rows.len(), 2);
        let paths = PathResult::from_rows(&rows);
        assert_eq!(paths[1].vertex_names("webpages"), vec!["UI Settings", "GeniusPLUS launch"]);

        done.await.unwrap();
    }

    #[tokio::test]
    async fn test_no_content_is_empty_result() {
        let (endpoint, done) = spawn_server(|mut ws| async move {
            let eval = read_request(&mut ws).await;
            respond(&mut ws, &eval["requestId"], 204, Value::Null).await;
            expect_close(&mut ws).await;
        })
        .await;

        let executor = GraphQueryExecutor::new(Arc::new(connector(endpoint)));
        let rows = executor
            .execute(&generate_query("overview", "overview").unwrap())
            .await
            .unwrap();

        assert!(rows.is_empty());
        done.await.unwrap();
    }

    #[tokio::test]
    async fn test_script_error_is_submission_failure() {
        let (endpoint, done) = spawn_server(|mut ws| async move {
            let eval = read_request(&mut ws).await;
            respond(&mut ws, &eval["requestId"], 597, Value::Null).await;
            assert!(expect_close(&mut ws).await);
        })
        .await;

        let executor = GraphQueryExecutor::new(Arc::new(connector(endpoint)));
        let err = executor
            .execute(&generate_query("a", "b").unwrap())
            .await
            .unwrap_err();

        match err {
            GraphError::Submission { code, message } => {
                assert_eq!(code, 597);
                assert_eq!(message, "status 597");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        done.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let (endpoint, done) = spawn_server(|mut ws| async move {
            let eval = read_request(&mut ws).await;
            let id = eval["requestId"].clone();
            respond(&mut ws, &id, 407, Value::Null).await;
            let _auth = read_request(&mut ws).await;
            respond(&mut ws, &id, 401, Value::Null).await;
            expect_close(&mut ws).await;
        })
        .await;

        let executor = GraphQueryExecutor::new(Arc::new(connector(endpoint)));
        let err = executor
            .execute(&generate_query("a", "b").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::Authentication(_)));
        done.await.unwrap();
    }

    #[tokio::test]
    async fn test_unrelated_responses_are_skipped() {
        let (endpoint, done) = spawn_server(|mut ws| async move {
            let eval = read_request(&mut ws).await;
            let stranger = json!(uuid::Uuid::new_v4());
            respond(&mut ws, &stranger, 200, json!([{"stale": true}])).await;
            respond(&mut ws, &eval["requestId"], 200, json!([{"fresh": true}])).await;
            expect_close(&mut ws).await;
        })
        .await;

        let executor = GraphQueryExecutor::new(Arc::new(connector(endpoint)));
        let rows = executor
            .execute(&generate_query("a", "b").unwrap())
            .await
            .unwrap();

        assert_eq!(rows, vec![json!({"fresh": true})]);
        done.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_hangup_is_protocol_error() {
        let (endpoint, done) = spawn_server(|mut ws| async move {
            let _eval = read_request(&mut ws).await;
            let _ = ws.close(None).await;
        })
        .await;

        let executor = GraphQueryExecutor::new(Arc::new(connector(endpoint)));
        let err = executor
            .execute(&generate_query("a", "b").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::Protocol(_) | GraphError::Connection(_)));
        done.await.unwrap();
    }

    #[tokio::test]
    async fn test_timeout_aborts_and_closes_socket() {
        let (endpoint, done) = spawn_server(|mut ws| async move {
            let _eval = read_request(&mut ws).await;
            // never answer; the client must give up and close
            assert!(expect_close(&mut ws).await);
        })
        .await;

        let executor = GraphQueryExecutor::new(Arc::new(connector(endpoint)));
        let err = executor
            .execute_with_timeout(
                &generate_query("a", "b").unwrap(),
                std::time::Duration::from_millis(200),
            )
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        done.await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_tls_handshake_is_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // plain TCP peer: hangs up on the TLS client hello
            let (tcp, _) = listener.accept().await.unwrap();
            drop(tcp);
        });

        let endpoint = format!("wss://localhost:{}/", addr.port());
        let result = tokio::spawn(async move { connector(endpoint).connect().await })
            .await
            .expect("connect must not panic");

        assert!(matches!(result, Err(GraphError::Connection(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = connector(format!("ws://{}", addr)).connect().await;
        assert!(matches!(result, Err(GraphError::Connection(_))));
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = sitepath_common::config::GraphConfig::default();
        let err = GremlinConnector::from_config(&config).unwrap_err();
        assert!(matches!(err, GraphError::Configuration(_)));
        assert!(err.to_string().contains("graph.endpoint"));
    }
}
