//! Main entry point for the Beenaya API Gateway

use beenaya_gateway::{api, config::Settings, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine, the process environment is used as-is
    let dotenv = dotenvy::dotenv();

    let settings = Settings::load()?;
    init_logging(&settings.log_format);

    info!("Starting Beenaya API Gateway");
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }
    settings.log_startup();

    let state = Arc::new(AppState::from_settings(settings)?);

    if state.settings.health_check_interval_secs > 0 {
        state
            .health_manager
            .start(Duration::from_secs(state.settings.health_check_interval_secs));
    }

    let app = api::routes::create_router(state.clone())?;

    let addr = state.settings.bind_address();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.health_manager.stop();
    info!("Gateway stopped");

    Ok(())
}

fn init_logging(format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if format.eq_ignore_ascii_case("pretty") {
        registry.with(fmt::layer().pretty()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
