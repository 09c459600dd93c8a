/*!
 * SMARTMON EXPORTER - Point d'entrée de l'exporter
 *
 * RÔLE : config, découverte des disques via smartctl, boucle de refresh en
 * tâche de fond, serveur HTTP /metrics.
 *
 * Une découverte en échec arrête le démarrage; ensuite les erreurs de fetch
 * sont loguées et la boucle continue.
 */

mod config;
mod health;
mod http;

use crate::health::HealthTracker;
use crate::http::AppState;
use anyhow::{Context, Result};
use prometheus::Registry;
use smartmon_core::{start, Smartctl};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    let loaded = config::load().context("failed to load configuration")?;
    let cfg = loaded.config;

    tracing_subscriber::fmt().with_max_level(cfg.log_level).init();
    match &loaded.source {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => warn!("no configuration file, using defaults"),
    }
    info!(
        poll_interval = %humantime::format_duration(cfg.poll_interval),
        smartctl = %cfg.smartctl_path,
        "starting smartmon exporter"
    );

    let probe = Smartctl::new(cfg.smartctl_path.clone()).with_timeout(cfg.probe_timeout);
    let poller = start(probe, cfg.poll_interval)
        .await
        .context("device discovery failed")?;

    let registry = Registry::new();
    let exporter = poller.exporter().context("failed to build collector")?;
    registry
        .register(Box::new(exporter))
        .context("failed to register collector")?;

    let app_state = AppState {
        registry,
        health: HealthTracker::new(poller.states(), poller.stats()),
    };
    let app = http::build_router(app_state);

    let listener = TcpListener::bind(cfg.listen_address)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_address))?;
    info!(address = %cfg.listen_address, "listening on http://{}/metrics", cfg.listen_address);
    axum::serve(listener, app).await.context("http server failed")?;

    // garde la boucle vivante tant que le serveur tourne
    drop(poller);
    Ok(())
}
