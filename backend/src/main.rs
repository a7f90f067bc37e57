//! Backend entry-point: wires REST endpoints and OpenAPI docs.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::config::EngineSettings;
use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig};
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = EngineSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?;
    let bind_addr = settings
        .bind_addr()
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid bind address: {e}")))?;

    let mut config = ServerConfig::new(bind_addr, settings.lookahead_hours());
    match settings.database_url.as_deref() {
        Some(url) => {
            let mut pool_config = PoolConfig::new(url).with_max_size(settings.pool_max_size());
            if let Some(min_idle) = settings.pool_min_idle {
                pool_config = pool_config.with_min_idle(Some(min_idle));
            }
            let pool = DbPool::new(pool_config).await.map_err(|e| {
                std::io::Error::other(format!("failed to build database pool: {e}"))
            })?;
            config = config.with_db_pool(pool);
        }
        None => warn!("PATROL_DATABASE_URL not set; serving fixture data only"),
    }

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
