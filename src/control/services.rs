//! Restart sequences for the supervised services
//!
//! Commands are handed to systemd and not verified: the controller neither
//! checks exit codes nor waits for the new processes to become healthy.

use crate::config::ControlConfig;
use crate::system::CommandRunner;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Pause between bringing MediaMTX back and starting the camera, which
/// needs the MediaMTX API up before it can connect
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Which services a restart affects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceTarget {
    #[default]
    All,
    Mediamtx,
    Camera,
}

impl ServiceTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceTarget::All => "all",
            ServiceTarget::Mediamtx => "mediamtx",
            ServiceTarget::Camera => "camera",
        }
    }
}

impl fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid service. Must be 'all', 'mediamtx', or 'camera'")]
pub struct ParseServiceTargetError;

impl FromStr for ServiceTarget {
    type Err = ParseServiceTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ServiceTarget::All),
            "mediamtx" => Ok(ServiceTarget::Mediamtx),
            "camera" => Ok(ServiceTarget::Camera),
            _ => Err(ParseServiceTargetError),
        }
    }
}

/// Issues systemctl stop/restart/start for the MediaMTX and camera units
pub struct ServiceController {
    runner: Arc<dyn CommandRunner>,
    mediamtx_service: String,
    camera_service: String,
}

impl ServiceController {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &ControlConfig) -> Self {
        Self {
            runner,
            mediamtx_service: config.mediamtx_service.clone(),
            camera_service: config.camera_service.clone(),
        }
    }

    /// Restart `target` and return the acknowledgment message
    pub async fn restart(&self, target: ServiceTarget) -> &'static str {
        info!(target = %target, "Restarting services");

        match target {
            ServiceTarget::All => {
                self.systemctl("stop", &self.camera_service).await;
                self.systemctl("restart", &self.mediamtx_service).await;
                tokio::time::sleep(SETTLE_DELAY).await;
                self.systemctl("start", &self.camera_service).await;
                "All services restarted"
            }
            ServiceTarget::Mediamtx => {
                self.systemctl("restart", &self.mediamtx_service).await;
                "MediaMTX service restarted"
            }
            ServiceTarget::Camera => {
                self.systemctl("restart", &self.camera_service).await;
                "Camera service restarted"
            }
        }
    }

    async fn systemctl(&self, verb: &str, unit: &str) {
        let output = self
            .runner
            .run(&format!("systemctl {} {}", verb, unit))
            .await;
        info!(
            action = verb,
            service = %unit,
            success = output.success,
            "Issued service command"
        );
    }
}
