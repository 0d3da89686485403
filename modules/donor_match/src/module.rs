use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::DonorMatchConfig;
use crate::contract::client::DonorMatchApi;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::repo::{BloodRequestRepository, DonorRepository};
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::DonorMatchLocalClient;
use crate::infra::storage::memory_repo::InMemoryRepository;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmRepository;

/// The donor-match module: owns the wired domain service and hands out
/// its REST routes and in-process client.
#[derive(Clone)]
pub struct DonorMatch {
    service: Arc<Service>,
}

impl DonorMatch {
    /// Wire the module onto a SeaORM connection. Runs migrations first.
    pub async fn init(db: DatabaseConnection, cfg: &DonorMatchConfig) -> anyhow::Result<Self> {
        info!("Initializing donor_match module");
        debug!(
            "Loaded donor_match config: points_per_donation={}, default_page_size={}, max_page_size={}",
            cfg.points_per_donation, cfg.default_page_size, cfg.max_page_size
        );

        migrate(&db).await?;

        let repo = Arc::new(SeaOrmRepository::new(db));
        Ok(Self::from_parts(
            repo.clone(),
            repo,
            Arc::new(SystemClock),
            ServiceConfig::from(cfg),
        ))
    }

    /// Non-persistent module backed by in-memory stores.
    pub fn in_memory(cfg: &DonorMatchConfig) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        Self::from_parts(
            repo.clone(),
            repo,
            Arc::new(SystemClock),
            ServiceConfig::from(cfg),
        )
    }

    pub fn from_parts(
        donors: Arc<dyn DonorRepository>,
        requests: Arc<dyn BloodRequestRepository>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            service: Arc::new(Service::new(donors, requests, clock, config)),
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other crates.
    pub fn client(&self) -> Arc<dyn DonorMatchApi> {
        Arc::new(DonorMatchLocalClient::new(self.service.clone()))
    }

    pub fn register_rest(&self, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering donor_match REST routes");
        let router = routes::register_routes(router, self.service.clone())?;
        info!("Donor-match REST routes registered successfully");
        Ok(router)
    }
}

/// Apply all pending donor_match schema migrations.
pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("Running donor_match database migrations");
    Migrator::up(db, None).await?;
    info!("Donor-match database migrations completed successfully");
    Ok(())
}
