//! HTTP surface of the control service
//!
//! Serves the control API on all interfaces and shuts down cleanly on
//! SIGTERM/SIGINT.

mod error;
mod routes;
pub mod shutdown;

pub use error::ApiError;
pub use routes::{
    build_router, parse_mode_request, parse_restart_request, run_control_server, AppState,
    ModeChangeResponse, API_NAME, API_VERSION,
};
pub use shutdown::{shutdown_channel, wait_for_signal, ShutdownController, ShutdownSignal};

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;
