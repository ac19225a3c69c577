//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, run_pending_migrations};
use backend::settings::CrmSettings;
use server::{RunningServer, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = CrmSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let bind_addr = settings.bind_addr()?;
    let calendar = settings.calendar()?;
    let mut config =
        ServerConfig::new(bind_addr, calendar).with_scheduler(settings.scheduler_enabled());

    if let Some(pool_config) = settings.pool_config() {
        let applied = run_pending_migrations(pool_config.database_url())
            .await
            .wrap_err("failed to apply database migrations")?;
        info!(applied, "database schema up to date");
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let RunningServer { server, scheduler } = create_server(health_state.clone(), config)?;
    info!(%bind_addr, offset = %calendar.offset(), "server listening");

    let result = server.await;
    health_state.mark_unhealthy();
    scheduler.iter().for_each(|handle| handle.abort());
    result.wrap_err("server terminated with an error")
}
