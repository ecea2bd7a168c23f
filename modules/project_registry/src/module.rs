use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::api::rest::{openapi::RegistryApiDoc, routes};
use crate::config::ProjectRegistryConfig;
use crate::contract::client::ProjectRegistryApi;
use crate::domain::ports::{Clock, SystemClock};
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::ProjectRegistryLocalClient;
use crate::infra::storage::{migrations::Migrator, SeaOrmRegistryRepository};

/// The project registry module: wires storage, domain service, REST routes
/// and the in-process client together.
#[derive(Clone)]
pub struct ProjectRegistry {
    service: Arc<Service>,
}

impl ProjectRegistry {
    /// Key of this module's section under `modules` in the app config.
    pub const NAME: &'static str = "project_registry";

    pub fn new(db: DatabaseConnection, cfg: ProjectRegistryConfig) -> Self {
        Self::with_clock(db, cfg, Arc::new(SystemClock))
    }

    /// Like [`ProjectRegistry::new`] with an explicit source of "today".
    pub fn with_clock(
        db: DatabaseConnection,
        cfg: ProjectRegistryConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!("Initializing project_registry module");
        debug!(
            "Loaded project_registry config: validate_project_dates={}",
            cfg.validate_project_dates
        );

        let repo = SeaOrmRegistryRepository::new(db);
        let service_config = ServiceConfig {
            validate_project_dates: cfg.validate_project_dates,
        };
        let service = Service::new(Arc::new(repo), clock, service_config);

        Self {
            service: Arc::new(service),
        }
    }

    /// Create or upgrade the `Usuario`, `Institucion` and `Proyecto` tables.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running project_registry database migrations");
        Migrator::up(db, None).await?;
        info!("project_registry database migrations completed successfully");
        Ok(())
    }

    pub fn register_rest(&self, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering project_registry REST routes");
        let router = routes::register_routes(router, self.service.clone())?;
        info!("project_registry REST routes registered successfully");
        Ok(router)
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        RegistryApiDoc::openapi()
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn ProjectRegistryApi> {
        Arc::new(ProjectRegistryLocalClient::new(self.service.clone()))
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }
}
