//! Liveness probes for the streaming stack
//!
//! Each probe is an independent boolean check. Probes fail closed: any
//! command failure (non-zero exit, timeout, launch error) reads as `false`.

use crate::config::ControlConfig;
use crate::system::command::CommandRunner;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Trait for probing OS services and network endpoints
///
/// Production code uses `CommandProber` which shells out through a
/// `CommandRunner`. Tests use `StaticProber` with fixed answers.
#[async_trait]
pub trait SystemProber: Send + Sync {
    /// Is the named systemd unit active?
    async fn service_active(&self, unit: &str) -> bool;

    /// Is anything listening on the given port?
    async fn port_open(&self, port: u16) -> bool;

    /// Does the MediaMTX control-plane API answer?
    async fn api_responding(&self) -> bool;

    /// Is the camera's stream path published in MediaMTX?
    async fn stream_active(&self) -> bool;
}

/// Prober built on systemctl, ss and curl
pub struct CommandProber {
    runner: Arc<dyn CommandRunner>,
    mediamtx_api: String,
    stream_path: String,
}

impl CommandProber {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &ControlConfig) -> Self {
        Self {
            runner,
            mediamtx_api: config.mediamtx_api.trim_end_matches('/').to_string(),
            stream_path: config.stream_path.clone(),
        }
    }
}

#[async_trait]
impl SystemProber for CommandProber {
    async fn service_active(&self, unit: &str) -> bool {
        let output = self
            .runner
            .run(&format!("systemctl is-active --quiet {}", unit))
            .await;
        debug!(service = %unit, active = output.success, "Probed service");
        output.success
    }

    async fn port_open(&self, port: u16) -> bool {
        let output = self
            .runner
            .run(&format!("ss -tulpn | grep -q :{}", port))
            .await;
        debug!(port = port, open = output.success, "Probed port");
        output.success
    }

    async fn api_responding(&self) -> bool {
        let output = self
            .runner
            .run(&format!(
                "curl -s {}/v3/config/get >/dev/null 2>&1",
                self.mediamtx_api
            ))
            .await;
        debug!(api = %self.mediamtx_api, responding = output.success, "Probed API");
        output.success
    }

    async fn stream_active(&self) -> bool {
        let output = self
            .runner
            .run(&format!(
                "curl -s {}/v3/paths/list 2>/dev/null",
                self.mediamtx_api
            ))
            .await;
        let active = output.success && output.stdout.contains(&self.stream_path);
        debug!(path = %self.stream_path, active = active, "Probed stream");
        active
    }
}

/// Prober with fixed answers, for testing
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticProber {
    pub mediamtx_running: bool,
    pub camera_running: bool,
    pub rtsp_port_open: bool,
    pub api_responding: bool,
    pub stream_active: bool,
}

#[cfg(test)]
impl StaticProber {
    pub fn all_up() -> Self {
        Self {
            mediamtx_running: true,
            camera_running: true,
            rtsp_port_open: true,
            api_responding: true,
            stream_active: true,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl SystemProber for StaticProber {
    async fn service_active(&self, unit: &str) -> bool {
        if unit.contains("camera") {
            self.camera_running
        } else {
            self.mediamtx_running
        }
    }

    async fn port_open(&self, _port: u16) -> bool {
        self.rtsp_port_open
    }

    async fn api_responding(&self) -> bool {
        self.api_responding
    }

    async fn stream_active(&self) -> bool {
        self.stream_active
    }
}
