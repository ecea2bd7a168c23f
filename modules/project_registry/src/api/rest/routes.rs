use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the registry endpoints on `router`. The service is injected into
/// these routes only, through an `Extension` layer.
pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let routes = Router::new()
        .route(
            "/instituciones",
            get(handlers::list_institutions).post(handlers::create_institution),
        )
        .route(
            "/institucion/{id}",
            get(handlers::get_institution)
                .put(handlers::update_institution)
                .delete(handlers::delete_institution),
        )
        .route(
            "/proyectos",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/usuarios",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/servicio1/{institucion_id}",
            get(handlers::institution_overview),
        )
        .route("/servicio2/{rut}", get(handlers::user_overview))
        .route("/servicio4", get(handlers::projects_remaining_days))
        .layer(Extension(service));

    Ok(router.merge(routes))
}
