// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use questionaura_server::{
    api::router,
    auth::TokenVerifier,
    config::AppConfig,
    logging::{self, LogFormat},
    media::MediaUploader,
    state::AppState,
    storage::{ensure_demo_user, ForumDatabase},
};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init(LogFormat::from_env());

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let db = match ForumDatabase::open(&config.database_path) {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, path = %config.database_path.display(), "Failed to open database");
            return ExitCode::FAILURE;
        }
    };

    match ensure_demo_user(&db) {
        Ok(user) => info!(user_id = user.id, "Demo user ready"),
        Err(e) => warn!(error = %e, "Could not ensure demo user; demo login will fail"),
    }

    let verifier = TokenVerifier::new(&config.auth);
    let mut state = AppState::new(db, verifier);
    match config.cloudinary.clone() {
        Some(settings) => state = state.with_uploader(MediaUploader::new(settings)),
        None => warn!("Cloudinary not configured; image uploads are disabled"),
    }

    let app = router(state, &config.cors_origins);

    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %config.bind_addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(
        addr = %config.bind_addr,
        environment = ?config.environment,
        jwks_url = %config.auth.jwks_url,
        "QuestionAura server listening (docs at /docs)"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server failed");
        return ExitCode::FAILURE;
    }

    info!("Server shut down");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
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
}
