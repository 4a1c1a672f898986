use std::sync::Arc;

use streamrich_domain::services::{cache::ProductCache, telemetry::TelemetryGuard};
use streamrich_gateway::PaymentGateway;
use streamrich_storage::SeaOrmStorage;

#[derive(Clone)]
pub struct AppState {
    storage: SeaOrmStorage,
    gateway: Arc<dyn PaymentGateway>,
    product_cache: Arc<ProductCache>,
    telemetry: TelemetryGuard,
    session_ttl_secs: u64,
}

impl AppState {
    pub fn new(
        storage: SeaOrmStorage,
        gateway: Arc<dyn PaymentGateway>,
        product_cache: Arc<ProductCache>,
        telemetry: TelemetryGuard,
        session_ttl_secs: u64,
    ) -> Self {
        Self {
            storage,
            gateway,
            product_cache,
            telemetry,
            session_ttl_secs,
        }
    }

    pub fn storage(&self) -> &SeaOrmStorage {
        &self.storage
    }

    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.gateway.as_ref()
    }

    pub fn product_cache(&self) -> &ProductCache {
        self.product_cache.as_ref()
    }

    pub fn telemetry(&self) -> &TelemetryGuard {
        &self.telemetry
    }

    pub fn session_ttl_secs(&self) -> u64 {
        self.session_ttl_secs
    }
}
