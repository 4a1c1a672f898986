use std::{path::Path, sync::Arc};

#[cfg(unix)]
use std::fs;

use actix_web::{middleware::Logger, web, App, HttpServer};
use thiserror::Error;
use tracing::info;

use streamrich_domain::config::{ApiConfig, ConfigError, GatewayConfig};
use streamrich_domain::services::{
    cache::ProductCache,
    telemetry::{init_telemetry, TelemetryConfig, TelemetryError},
};
use streamrich_gateway::PaystackClient;
use streamrich_storage::SeaOrmStorage;

use crate::{
    handlers::{
        delete_content_handler, initialize_payment_handler, list_content_handler,
        list_plans_handler, list_products_handler, metrics_handler, mint_session_handler,
        moderate_content_handler, submit_content_handler, update_role_handler,
        verify_payment_handler, withdraw_handler,
    },
    state::AppState,
};

pub async fn run() -> Result<(), BootstrapError> {
    let config = ApiConfig::load_from_env()?;
    let gateway_config = GatewayConfig::load_from_env()?;

    let telemetry_config = TelemetryConfig::from_env("API");
    let telemetry = init_telemetry(&telemetry_config)?;

    let storage = SeaOrmStorage::connect(config.database_url()).await?;
    let gateway = Arc::new(PaystackClient::new(gateway_config));
    let product_cache = Arc::new(ProductCache::default());

    let state = AppState::new(
        storage,
        gateway,
        product_cache,
        telemetry.clone(),
        config.session_ttl_secs(),
    );

    // Metrics stay off the public listener whenever an internal one exists.
    let include_metrics_on_public = !config.has_internal_listener();

    let public_state = state.clone();
    let mut public_server = HttpServer::new(move || {
        let mut app = App::new()
            .app_data(web::Data::new(public_state.clone()))
            .wrap(Logger::default())
            .route("/api/v1/content", web::get().to(list_content_handler))
            .route("/api/v1/content", web::post().to(submit_content_handler))
            .route(
                "/api/v1/content/{id}",
                web::patch().to(moderate_content_handler),
            )
            .route(
                "/api/v1/content/{id}",
                web::delete().to(delete_content_handler),
            )
            .route(
                "/api/v1/payments/initialize",
                web::post().to(initialize_payment_handler),
            )
            .route(
                "/api/v1/payments/verify",
                web::get().to(verify_payment_handler),
            )
            .route("/api/v1/products", web::get().to(list_products_handler))
            .route("/api/v1/plans", web::get().to(list_plans_handler))
            .route("/api/v1/users/role", web::post().to(update_role_handler))
            .route("/api/v1/user/withdraw", web::post().to(withdraw_handler));

        if include_metrics_on_public {
            app = app.route("/metrics", web::get().to(metrics_handler));
        }

        app
    });

    #[cfg(unix)]
    {
        if let Some(socket) = config.api_unix_socket() {
            cleanup_socket(socket)?;
            public_server = public_server.bind_uds(socket)?;
            info!(socket, "public listener bound");
        } else {
            public_server = public_server.bind(config.api_bind_address())?;
            info!(address = config.api_bind_address(), "public listener bound");
        }
    }

    #[cfg(not(unix))]
    {
        if let Some(socket) = config.api_unix_socket() {
            return Err(BootstrapError::Io(std::io::Error::other(format!(
                "unix socket '{socket}' requested but this platform does not support it"
            ))));
        }
        public_server = public_server.bind(config.api_bind_address())?;
        info!(address = config.api_bind_address(), "public listener bound");
    }

    let public_server = public_server.run();

    // The internal listener carries session minting and metrics; it is never
    // reachable through the public bind target.
    let internal_server = if config.has_internal_listener() {
        let internal_state = state.clone();
        let mut internal_server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(internal_state.clone()))
                .wrap(Logger::default())
                .route("/metrics", web::get().to(metrics_handler))
                .route(
                    "/internal/v1/sessions",
                    web::post().to(mint_session_handler),
                )
        });

        #[cfg(unix)]
        {
            if let Some(socket) = config.internal_unix_socket() {
                cleanup_socket(socket)?;
                internal_server = internal_server.bind_uds(socket)?;
            } else if let Some(addr) = config.internal_bind_address() {
                internal_server = internal_server.bind(addr)?;
            } else {
                return Err(BootstrapError::Io(std::io::Error::other(
                    "internal listener configured but no bind target provided",
                )));
            }
        }

        #[cfg(not(unix))]
        {
            if let Some(socket) = config.internal_unix_socket() {
                return Err(BootstrapError::Io(std::io::Error::other(format!(
                    "internal unix socket '{socket}' requested but this platform does not support it"
                ))));
            }
            if let Some(addr) = config.internal_bind_address() {
                internal_server = internal_server.bind(addr)?;
            } else {
                return Err(BootstrapError::Io(std::io::Error::other(
                    "internal listener configured but no bind target provided",
                )));
            }
        }

        Some(internal_server.run())
    } else {
        None
    };

    if let Some(internal) = internal_server {
        tokio::try_join!(public_server, internal)?;
    } else {
        public_server.await?;
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("storage error: {0}")]
    Storage(#[from] streamrich_domain::storage::StorageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// Stale socket files from an unclean shutdown would otherwise make bind fail.
#[cfg(unix)]
fn cleanup_socket(path: &str) -> std::io::Result<()> {
    let socket_path = Path::new(path);
    if socket_path.exists() {
        fs::remove_file(socket_path)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn cleanup_socket(_path: &str) -> std::io::Result<()> {
    Ok(())
}
