//! Mobile Auth Backend
//!
//! Account registration and bearer-token sessions for the mobile app.
//!
//! ## Architecture
//!
//! - Routes: HTTP request handling and extraction
//! - Services: register/login/me/logout flows
//! - Repositories: credential and token stores (PostgreSQL or in-memory)
//! - Auth: password hashing and token issuance capabilities

use anyhow::Result;
use mobile_auth_backend::{
    config::{self, AppConfig, HasherKind},
    db, routes,
    state::AppState,
};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if AppConfig::is_production() { "production" } else { "development" },
        "Starting Mobile Auth Backend"
    );

    if AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    let state = if config.database.is_memory() {
        warn!("Using in-memory stores; accounts and tokens are lost on restart");
        AppState::in_memory(config.clone())
    } else {
        info!("Connecting to database...");
        let db_pool = db::create_pool(&config.database).await?;

        // Production runs migrations as a separate job
        if !AppConfig::is_production() {
            db::run_migrations(&db_pool).await?;
        }

        AppState::new(db_pool, config.clone())
    };

    let app = routes::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "mobile_auth_backend=info,tower_http=info".into()
        } else {
            "mobile_auth_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if AppConfig::is_production() {
        // JSON logging for log aggregation
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.database.is_memory() {
        errors.push("In-memory stores are not allowed in production");
    }

    if config.auth.hasher == HasherKind::Bcrypt && config.auth.bcrypt_cost < 10 {
        errors.push("bcrypt cost must be at least 10");
    }

    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
