pub mod config;
pub mod errors;
pub mod handlers;
pub mod pipeline;
pub mod router;
pub mod state;
pub mod types;

use crate::{
    config::{get_config, AppConfig},
    router::create_router,
    state::build_app_state,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;
use vizon::SessionStore;

/// How often idle sessions are looked for.
pub const REAPER_INTERVAL: Duration = Duration::from_secs(60);

/// Spawns the background task that drops sessions idle for longer than `idle_timeout_secs`.
pub fn spawn_session_reaper(
    sessions: SessionStore,
    idle_timeout_secs: u64,
    interval: Duration,
) -> JoinHandle<()> {
    let secs = u32::try_from(idle_timeout_secs).unwrap_or(u32::MAX);
    let ttl = chrono::Duration::seconds(i64::from(secs));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_idle(chrono::Utc::now(), ttl).await;
            if purged > 0 {
                info!("Reaped {purged} idle sessions");
            }
        }
    })
}

/// Configures and runs the web server.
///
/// This function initializes the application state, creates the router,
/// starts the idle-session reaper and serves until the listener fails.
pub async fn run(listener: TcpListener, config: AppConfig) -> anyhow::Result<()> {
    debug!(?config, "Server configuration loaded");

    let idle_timeout_secs = config.session.idle_timeout_secs;
    let app_state = build_app_state(config).await?;
    let reaper = spawn_session_reaper(
        app_state.sessions.clone(),
        idle_timeout_secs,
        REAPER_INTERVAL,
    );
    let app = create_router(app_state);

    info!("listening on {}", listener.local_addr()?);
    let served = axum::serve(listener, app).await;
    reaper.abort();
    served?;

    Ok(())
}

/// The library's main entry point.
///
/// Sets up logging, configuration, and the TCP listener, then calls `run`.
pub async fn start() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("setting default subscriber failed: {e}"))?;

    let config = get_config(None)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    run(listener, config).await
}
