use dashcam_control::config::ControlConfig;
use dashcam_control::server::{
    run_control_server, shutdown_channel, wait_for_signal, AppState,
};
use dashcam_control::system::ShellRunner;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ControlConfig::from_env();
    info!(
        config_file = %config.config_file.display(),
        mediamtx_service = %config.mediamtx_service,
        camera_service = %config.camera_service,
        port = config.listen_port,
        "Starting dashcam control API"
    );

    let (shutdown_controller, shutdown_signal) = shutdown_channel();
    let port = config.listen_port;
    let state = AppState::new(config, Arc::new(ShellRunner::new()));

    let mut server = tokio::spawn(run_control_server(port, state, shutdown_signal));

    tokio::select! {
        result = &mut server => {
            // Server ended on its own: bind failure or serve error
            match result {
                Ok(Ok(())) => info!("Control API stopped"),
                Ok(Err(e)) => {
                    error!(error = %e, port = port, "Control API failed");
                    return Err(e.into());
                }
                Err(e) => {
                    error!(error = %e, "Control API task panicked");
                    return Err(e.into());
                }
            }
            return Ok(());
        }
        signal = wait_for_signal() => {
            match signal {
                Ok(name) => info!(signal = name, "Initiating graceful shutdown"),
                Err(e) => error!(error = %e, "Failed to register signal handlers, shutting down"),
            }
        }
    }

    shutdown_controller.shutdown();

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Control API exited with error"),
        Err(e) => error!(error = %e, "Control API task failed"),
    }

    info!("Dashcam control API shut down gracefully");
    Ok(())
}
