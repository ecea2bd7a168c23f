use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::post,
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::util::ServiceExt;

use api_ingress::{ApiIngress, ApiIngressConfig};

fn ingress(enable_docs: bool, body_limit_bytes: usize) -> ApiIngress {
    ApiIngress::new(ApiIngressConfig {
        enable_docs,
        body_limit_bytes,
        ..Default::default()
    })
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let router = ApiIngress::default().build_router(Router::new()).unwrap();

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
    assert_eq!(json["service"], "project-registry");
}

#[tokio::test]
async fn registered_module_docs_are_merged_and_served() {
    use utoipa::openapi::path::{HttpMethod, OperationBuilder, PathItem};
    use utoipa::openapi::{InfoBuilder, OpenApiBuilder, PathsBuilder};

    let module_doc = OpenApiBuilder::new()
        .info(InfoBuilder::new().title("widgets").version("1").build())
        .paths(PathsBuilder::new().path(
            "/widgets",
            PathItem::new(
                HttpMethod::Get,
                OperationBuilder::new().operation_id(Some("list_widgets")).build(),
            ),
        ))
        .build();

    let mut ingress = ingress(true, 1024);
    ingress.register_openapi(module_doc);

    let merged = ingress.openapi();
    assert_eq!(merged.info.title, "Project Registry API");
    assert!(merged.paths.paths.contains_key("/widgets"));

    let response = ingress
        .build_router(Router::new())
        .unwrap()
        .oneshot(Request::builder().uri("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["paths"]["/widgets"]["get"]["operationId"], "list_widgets");
}

#[tokio::test]
async fn docs_are_only_served_when_enabled() {
    let hidden = ingress(false, 1024).build_router(Router::new()).unwrap();
    let response = hidden
        .oneshot(Request::builder().uri("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let shown = ingress(true, 1024).build_router(Router::new()).unwrap();
    let response = shown
        .oneshot(Request::builder().uri("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["info"]["title"], "Project Registry API");
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    async fn accept(body: String) -> String {
        body
    }
    let routes = Router::new().route("/upload", post(accept));
    let router = ingress(false, 16).build_router(routes).unwrap();

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .body(Body::from("x".repeat(64)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn serve_on_stops_on_shutdown_signal() {
    let ingress = ApiIngress::default();
    let router = ingress.build_router(Router::new()).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        ingress
            .serve_on(listener, router, async {
                let _ = stop_rx.await;
            })
            .await
    });

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    assert!(raw.starts_with("HTTP/1.1 200"), "unexpected response: {raw}");

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop")
        .unwrap();
    assert!(result.is_ok());
}
