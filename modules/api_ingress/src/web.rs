use axum::response::{Html, Json};
use serde_json::{json, Value};

/// Liveness probe. Does not touch the database.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "project-registry",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

// Stoplight Elements page rendering `/openapi.json`.
const DOCS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Project Registry API</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#;

pub async fn serve_docs() -> Html<&'static str> {
    Html(DOCS_PAGE)
}
