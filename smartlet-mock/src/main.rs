use std::process::ExitCode;

use clap::Parser;
use smartlet_mock::cli::CliArgs;
use smartlet_mock::error::Error;
use smartlet_mock::run;
use smartlet_mock::settings::Settings;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let mut settings = match Settings::new(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("FATAL ERROR! {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level},smartlet_api={level}").into()
        }))
        .init();

    if let Err(e) = settings.validate() {
        tracing::error!("FATAL ERROR! {}", e);
        return ExitCode::FAILURE;
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    match run(&settings, shutdown).await {
        Ok(()) | Err(Error::Cancelled) => {
            tracing::info!("Done!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("FATAL ERROR! {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Unable to listen for SIGTERM: {}", e);
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

    tracing::info!("Smartlet Simulator is shutting down, cleaning up...");
    shutdown.cancel();
}
