use std::{process, time::Duration};

use brezza::{
    application::error::AppError,
    config,
    infra::{
        error::InfraError,
        http::{AppState, build_router},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => serve(settings).await,
    }
}

async fn serve(settings: config::Settings) -> Result<(), AppError> {
    let state = AppState::from_settings(&settings);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::Io(err)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|err| AppError::from(InfraError::Io(err)))?;

    info!(
        address = %local_addr,
        environment = settings.runtime.environment.as_str(),
        assets_dir = %settings.assets.directory.display(),
        "listening"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal(settings.server.graceful_shutdown))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal(grace: Duration) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install shutdown signal handler");
        return;
    }

    info!(
        grace_secs = grace.as_secs(),
        "shutdown signal received, draining connections"
    );

    // In-flight connections that outlive the drain window hold the process
    // open indefinitely otherwise.
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!("drain window elapsed, exiting");
        process::exit(0);
    });
}
