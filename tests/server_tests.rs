//! HTTP tests for the pipecheck router
//!
//! Requests go straight through the router with `oneshot`; no socket is bound.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use pipecheck::{router, ServerConfig, Traversal};

fn app() -> Router {
    router(ServerConfig::default()).unwrap()
}

async fn post_parse(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/pipelines/parse")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(body: Value) -> (StatusCode, Value) {
    post_parse(app(), body.to_string()).await
}

fn node(id: &str) -> Value {
    json!({"id": id, "type": "customInput", "data": {}})
}

fn edge(source: &str, target: &str) -> Value {
    json!({"id": format!("{}->{}", source, target), "source": source, "target": target})
}

#[tokio::test]
async fn test_root_reports_status() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "Pipeline Backend Running"}));
}

#[tokio::test]
async fn test_empty_pipeline() {
    let (status, body) = post_json(json!({"nodes": [], "edges": []})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"num_nodes": 0, "num_edges": 0, "is_dag": true}));
}

#[tokio::test]
async fn test_chain_is_dag() {
    let (status, body) = post_json(json!({
        "nodes": [node("a"), node("b"), node("c")],
        "edges": [edge("a", "b"), edge("b", "c")]
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"num_nodes": 3, "num_edges": 2, "is_dag": true}));
}

#[tokio::test]
async fn test_cycle_is_not_dag() {
    let (_, body) = post_json(json!({
        "nodes": [node("a"), node("b"), node("c")],
        "edges": [edge("a", "b"), edge("b", "c"), edge("c", "a")]
    }))
    .await;
    assert_eq!(body, json!({"num_nodes": 3, "num_edges": 3, "is_dag": false}));
}

#[tokio::test]
async fn test_diamond_is_dag() {
    let (_, body) = post_json(json!({
        "nodes": [node("a"), node("b"), node("c"), node("d")],
        "edges": [edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")]
    }))
    .await;
    assert_eq!(body["is_dag"], json!(true));
}

#[tokio::test]
async fn test_disconnected_cycle() {
    let (_, body) = post_json(json!({
        "nodes": [node("a"), node("b"), node("c")],
        "edges": [edge("a", "b"), edge("b", "a")]
    }))
    .await;
    assert_eq!(body, json!({"num_nodes": 3, "num_edges": 2, "is_dag": false}));
}

#[tokio::test]
async fn test_dangling_edge_accepted() {
    let (status, body) = post_json(json!({
        "nodes": [node("a")],
        "edges": [edge("a", "z")]
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"num_nodes": 1, "num_edges": 1, "is_dag": true}));
}

#[tokio::test]
async fn test_data_optional() {
    let (status, body) = post_json(json!({
        "nodes": [{"id": "a", "type": "llm"}],
        "edges": []
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["num_nodes"], json!(1));
}

#[tokio::test]
async fn test_variables_reported() {
    let (_, body) = post_json(json!({
        "nodes": [
            {"id": "t", "type": "text", "data": {"text": "Summarize {{ doc }} for {{user}}"}},
            node("out")
        ],
        "edges": [edge("t", "out")]
    }))
    .await;
    assert_eq!(body["variables"], json!(["doc", "user"]));
    assert_eq!(body["is_dag"], json!(true));
}

#[tokio::test]
async fn test_missing_field_is_422_with_detail() {
    let (status, body) = post_json(json!({
        "nodes": [{"type": "text"}],
        "edges": []
    }))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body["detail"].as_array().unwrap();
    assert_eq!(detail.len(), 1);
    assert_eq!(detail[0]["loc"], json!("/nodes/0/id"));
    assert_eq!(detail[0]["type"], json!("missing"));
}

#[tokio::test]
async fn test_wrong_type_is_422() {
    let (status, body) = post_json(json!({
        "nodes": [node("a")],
        "edges": [{"id": "e", "source": "a", "target": 5}]
    }))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!("/edges/0/target"));
    assert_eq!(body["detail"][0]["type"], json!("type"));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let (status, body) = post_parse(app(), "{\"nodes\": [").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"][0]["type"], json!("PIPE-001"));
}

#[tokio::test]
async fn test_repeated_requests_identical() {
    let payload = json!({
        "nodes": [node("a"), node("b")],
        "edges": [edge("a", "b"), edge("b", "a")]
    });
    let app = app();
    let (_, first) = post_parse(app.clone(), payload.to_string()).await;
    let (_, second) = post_parse(app, payload.to_string()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_cors_preflight_allowed_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/pipelines/parse")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(), "POST");
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "http://evil.example.com")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_simple_request_from_loopback_ip() {
    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "http://127.0.0.1:3000")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://127.0.0.1:3000"
    );
}

#[tokio::test]
async fn test_body_limit_enforced() {
    let config = ServerConfig {
        max_body_bytes: 64,
        ..ServerConfig::default()
    };
    let app = router(config).unwrap();
    let big = json!({"nodes": (0..50).map(|i| node(&format!("n{}", i))).collect::<Vec<_>>(), "edges": []});

    let request = Request::builder()
        .method(Method::POST)
        .uri("/pipelines/parse")
        .body(Body::from(big.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[test]
fn test_recursive_server_survives_deep_chain() {
    // Worker-sized stack; a recursive walk of this chain would overflow it
    let count = 25_000;
    let nodes: Vec<Value> = (0..count).map(|i| node(&format!("n{}", i))).collect();
    let edges: Vec<Value> = (1..count)
        .map(|i| edge(&format!("n{}", i - 1), &format!("n{}", i)))
        .collect();
    let payload = json!({"nodes": nodes, "edges": edges}).to_string();

    let config = ServerConfig {
        traversal: Traversal::Recursive,
        max_body_bytes: 8 * 1024 * 1024,
        ..ServerConfig::default()
    };
    let app = router(config).unwrap();

    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
                .block_on(post_parse(app, payload))
        })
        .unwrap();

    let (status, body) = handle.join().unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"num_nodes": count, "num_edges": count - 1, "is_dag": true})
    );
}
