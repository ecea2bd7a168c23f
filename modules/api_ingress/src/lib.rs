//! HTTP host for the registry: wraps module routes in the shared middleware
//! stack, exposes health and API docs, and runs the server until shutdown.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Json, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::openapi::{Info, OpenApi, Paths};

mod config;
pub mod problem;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use problem::{Problem, ProblemResponse};

pub struct ApiIngress {
    config: ApiIngressConfig,
    openapi: OpenApi,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            openapi: OpenApi::new(
                Info::new("Project Registry API", env!("CARGO_PKG_VERSION")),
                Paths::new(),
            ),
        }
    }

    /// Merge a module's OpenAPI document into the served one.
    pub fn register_openapi(&mut self, doc: OpenApi) {
        self.openapi.merge(doc);
    }

    /// The document served at `/openapi.json`.
    pub fn openapi(&self) -> &OpenApi {
        &self.openapi
    }

    /// Wrap module routes with host routes and the middleware stack.
    ///
    /// Layers are listed innermost first; the request passes
    /// SetRequestId → PropagateRequestId → BodyLimit → CORS → Trace →
    /// request-id extension → Timeout → handler.
    pub fn build_router(&self, routes: Router) -> Result<Router> {
        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .merge(routes);

        if self.config.enable_docs {
            let doc = serde_json::to_value(self.openapi()).context("Failed to render OpenAPI")?;
            router = router
                .route(
                    "/openapi.json",
                    get(move || {
                        let doc = doc.clone();
                        async move { Json(doc) }
                    }),
                )
                .route("/docs", get(web::serve_docs));
        }

        let x_request_id = request_id::header();

        router = router
            .layer(TimeoutLayer::new(self.config.request_timeout))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer());

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        Ok(router
            .layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes))
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId)))
    }

    /// Bind `addr` and serve until Ctrl-C / SIGTERM.
    pub async fn serve(&self, router: Router, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        self.serve_on(listener, router, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(&self, listener: TcpListener, router: Router, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener.local_addr()?;
        tracing::info!(addr = %local, docs = self.config.enable_docs, "HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
