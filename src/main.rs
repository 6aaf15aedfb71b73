mod app;
mod app_error;
mod cli;
mod config;
mod controllers;
mod model;
mod repositories;
mod services;
#[cfg(test)]
mod test_support;

use crate::app::{AppContext, router};
use crate::cli::Cli;
use crate::config::config::Config;
use crate::model::TractClassifier;
use crate::repositories::upload_repository::UploadRepository;
use crate::services::predictor::Predictor;
use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    enable_logging(cli.verbose);
    let Some(config) = Config::from_path(&cli.config_path) else {
        return Ok(ExitCode::FAILURE);
    };

    // The listener is only bound once the model and labels are known to be usable.
    let classifier = match TractClassifier::load(config.get_model().get_path()) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    let predictor = match Predictor::new(classifier, config.get_model().get_labels().clone()) {
        Ok(predictor) => predictor,
        Err(e) => {
            error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    let uploads = UploadRepository::new(config.get_server().get_upload_dir()).await?;

    let state = Arc::new(AppContext { predictor, uploads });
    let app = router(
        state,
        config.get_server().get_public_dir(),
        config.get_server().get_max_upload_bytes(),
    );

    let listener =
        tokio::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, cli.port))).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(ExitCode::SUCCESS)
}

fn enable_logging(verbose: u8) {
    let log_level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
