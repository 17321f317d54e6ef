//! Composite health of the streaming stack
//!
//! Five probes are folded into a score out of five:
//! - MediaMTX service active
//! - camera service active
//! - RTSP port listening
//! - MediaMTX API responding
//! - camera stream published
//!
//! `healthy` needs all five, `degraded` three or four, anything less is
//! `unhealthy`.

use crate::config::{AccessUrls, ControlConfig};
use crate::control::mode::{CurrentMode, ModeStore};
use crate::system::SystemProber;
use serde::Serialize;
use std::fmt;

/// Number of probes contributing to the score
pub const MAX_SCORE: u8 = 5;

/// Lowest score still reported as degraded rather than unhealthy
pub const DEGRADED_THRESHOLD: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Count of passing probes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthScore(u8);

impl HealthScore {
    pub fn from_probes(probes: &[bool]) -> Self {
        Self(probes.iter().filter(|passed| **passed).count() as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn status(&self) -> HealthStatus {
        if self.0 >= MAX_SCORE {
            HealthStatus::Healthy
        } else if self.0 >= DEGRADED_THRESHOLD {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        }
    }
}

impl fmt::Display for HealthScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, MAX_SCORE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediamtxHealth {
    pub service_running: bool,
    pub rtsp_port_open: bool,
    pub api_responding: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraHealth {
    pub service_running: bool,
    pub stream_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Components {
    pub mediamtx: MediamtxHealth,
    pub camera: CameraHealth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Urls {
    pub hls: String,
    pub rtsp: String,
    pub api: String,
}

impl From<&AccessUrls> for Urls {
    fn from(urls: &AccessUrls) -> Self {
        Self {
            hls: urls.hls.clone(),
            rtsp: urls.rtsp.clone(),
            api: urls.api.clone(),
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Display form, e.g. "4/5"
    pub health_score: String,
    pub mode: CurrentMode,
    pub components: Components,
    pub urls: Urls,
}

impl HealthReport {
    pub fn new(mode: CurrentMode, components: Components, urls: Urls) -> Self {
        let score = HealthScore::from_probes(&[
            components.mediamtx.service_running,
            components.camera.service_running,
            components.mediamtx.rtsp_port_open,
            components.mediamtx.api_responding,
            components.camera.stream_active,
        ]);

        Self {
            status: score.status(),
            health_score: score.to_string(),
            mode,
            components,
            urls,
        }
    }
}

/// Body of `GET /status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub mode: CurrentMode,
    pub mediamtx_running: bool,
    pub camera_running: bool,
}

/// Run every probe in sequence and build the health report
pub async fn compute_health(
    prober: &dyn SystemProber,
    store: &ModeStore,
    config: &ControlConfig,
) -> HealthReport {
    let mode = store.get_mode().await;
    let mediamtx_running = prober.service_active(&config.mediamtx_service).await;
    let camera_running = prober.service_active(&config.camera_service).await;
    let rtsp_port_open = prober.port_open(config.rtsp_port).await;
    let api_responding = prober.api_responding().await;
    let stream_active = prober.stream_active().await;

    let components = Components {
        mediamtx: MediamtxHealth {
            service_running: mediamtx_running,
            rtsp_port_open,
            api_responding,
        },
        camera: CameraHealth {
            service_running: camera_running,
            stream_active,
        },
    };

    HealthReport::new(mode, components, Urls::from(&config.urls))
}

/// Mode plus the two service states, without network probes
pub async fn compute_status(
    prober: &dyn SystemProber,
    store: &ModeStore,
    config: &ControlConfig,
) -> ServiceStatus {
    ServiceStatus {
        mode: store.get_mode().await,
        mediamtx_running: prober.service_active(&config.mediamtx_service).await,
        camera_running: prober.service_active(&config.camera_service).await,
    }
}
