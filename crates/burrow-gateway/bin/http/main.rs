mod cli;

use crate::cli::{LogFormat, CLI};
use burrow_gateway::{App, AppState, StaticCredentials};
use burrow_generator::AlphanumericGenerator;
use burrow_session::{spawn_reaper, SessionConfig, SessionStore};
use burrow_storage::{spawn_backup_scheduler, RecordStore, StoreConfig};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir.display(),
        base_url = ?config.base_url,
        "starting gateway server"
    );

    let store_config = StoreConfig::builder()
        .data_dir(config.data_dir.clone())
        .backup_interval(Duration::from_secs(config.backup_interval_secs))
        .build();
    let store = Arc::new(RecordStore::open(store_config)?);
    let backups = spawn_backup_scheduler(Arc::clone(&store));

    let session_config = SessionConfig::builder()
        .max_lifetime(Duration::from_secs(config.session_lifetime_secs))
        .build();
    let sessions = Arc::new(SessionStore::new(session_config));
    let reaper = spawn_reaper(Arc::clone(&sessions));

    let credentials = credentials(config.auth_user, config.auth_pass);
    if credentials.is_default() {
        warn!("no credentials configured, falling back to the default admin/admin");
    }

    let state = AppState::builder()
        .repository(store.clone())
        .sessions(sessions)
        .generator(Arc::new(AlphanumericGenerator::new(config.code_length.into())))
        .authenticator(Arc::new(credentials))
        .base_url(config.base_url)
        .secure_cookies(config.secure_cookies)
        .build();

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");
    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down background jobs");
    backups.shutdown().await;
    reaper.shutdown().await;
    if let Err(e) = tokio::task::spawn_blocking(move || store.backup_now()).await? {
        warn!(error = %e, "final backup failed");
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn credentials(user: Option<String>, pass: Option<String>) -> StaticCredentials {
    let user = user.filter(|u| !u.is_empty());
    let pass = pass.filter(|p| !p.is_empty());
    match (user, pass) {
        (Some(user), Some(pass)) => StaticCredentials::new(user, pass),
        (user, pass) => {
            if user.is_some() || pass.is_some() {
                warn!("only one of the shorten credentials is set, using defaults for both");
            }
            StaticCredentials::default()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
