//! Service configuration
//!
//! Every component receives its paths, unit names and endpoints from a
//! `ControlConfig` at construction. Defaults match the dashcam installation;
//! environment variables override them:
//! - DASHCAM_CONFIG_FILE: mode config file (default: /etc/dashcam/dashcam.conf)
//! - DASHCAM_MEDIAMTX_SERVICE: MediaMTX systemd unit
//! - DASHCAM_CAMERA_SERVICE: camera systemd unit
//! - DASHCAM_PORT: listen port for the control API (default: 5000)
//! - DASHCAM_MEDIAMTX_API: MediaMTX control-plane base URL
//! - DASHCAM_STREAM_PATH: stream path expected in the MediaMTX path list

use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "/etc/dashcam/dashcam.conf";
pub const MODE_KEY: &str = "MEDIAMTX_MODE";
pub const DEFAULT_MEDIAMTX_SERVICE: &str = "dashcam-mediamtx.service";
pub const DEFAULT_CAMERA_SERVICE: &str = "dashcam-camera.service";
pub const DEFAULT_LISTEN_PORT: u16 = 5000;
pub const RTSP_PORT: u16 = 8554;
pub const DEFAULT_MEDIAMTX_API: &str = "http://localhost:9997";
pub const DEFAULT_STREAM_PATH: &str = "dashcam";

/// Port MediaMTX serves HLS playback on
pub const HLS_PORT: u16 = 8888;

/// Well-known playback and API URLs advertised by `/health`
///
/// Follows the configured API base and stream path so the advertised URLs
/// point at what the probes check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessUrls {
    pub hls: String,
    pub rtsp: String,
    pub api: String,
}

impl AccessUrls {
    pub fn new(mediamtx_api: &str, stream_path: &str) -> Self {
        Self {
            hls: format!("http://localhost:{}/{}", HLS_PORT, stream_path),
            rtsp: format!("rtsp://localhost:{}/{}", RTSP_PORT, stream_path),
            api: mediamtx_api.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for AccessUrls {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIAMTX_API, DEFAULT_STREAM_PATH)
    }
}

/// Configuration shared by the mode store, prober and service controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlConfig {
    pub config_file: PathBuf,
    pub mode_key: String,
    pub mediamtx_service: String,
    pub camera_service: String,
    pub listen_port: u16,
    pub rtsp_port: u16,
    pub mediamtx_api: String,
    pub stream_path: String,
    pub urls: AccessUrls,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            mode_key: MODE_KEY.to_string(),
            mediamtx_service: DEFAULT_MEDIAMTX_SERVICE.to_string(),
            camera_service: DEFAULT_CAMERA_SERVICE.to_string(),
            listen_port: DEFAULT_LISTEN_PORT,
            rtsp_port: RTSP_PORT,
            mediamtx_api: DEFAULT_MEDIAMTX_API.to_string(),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
            urls: AccessUrls::default(),
        }
    }
}

impl ControlConfig {
    /// Build configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    ///
    /// Split out from `from_env` so tests don't have to mutate the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let listen_port = match lookup("DASHCAM_PORT") {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) => port,
                Err(e) => {
                    warn!(value = %raw, error = %e, "Invalid DASHCAM_PORT, using default");
                    defaults.listen_port
                }
            },
            None => defaults.listen_port,
        };

        let mediamtx_api = lookup("DASHCAM_MEDIAMTX_API").unwrap_or(defaults.mediamtx_api);
        let stream_path = lookup("DASHCAM_STREAM_PATH").unwrap_or(defaults.stream_path);

        Self {
            config_file: lookup("DASHCAM_CONFIG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.config_file),
            mode_key: defaults.mode_key,
            mediamtx_service: lookup("DASHCAM_MEDIAMTX_SERVICE")
                .unwrap_or(defaults.mediamtx_service),
            camera_service: lookup("DASHCAM_CAMERA_SERVICE").unwrap_or(defaults.camera_service),
            listen_port,
            rtsp_port: defaults.rtsp_port,
            urls: AccessUrls::new(&mediamtx_api, &stream_path),
            mediamtx_api,
            stream_path,
        }
    }

    /// Command an operator runs to apply a mode change
    pub fn restart_command(&self) -> String {
        format!("sudo systemctl restart {}", self.mediamtx_service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_installation() {
        let config = ControlConfig::default();

        assert_eq!(config.config_file, PathBuf::from("/etc/dashcam/dashcam.conf"));
        assert_eq!(config.mode_key, "MEDIAMTX_MODE");
        assert_eq!(config.mediamtx_service, "dashcam-mediamtx.service");
        assert_eq!(config.camera_service, "dashcam-camera.service");
        assert_eq!(config.listen_port, 5000);
        assert_eq!(config.rtsp_port, 8554);
        assert_eq!(config.urls.hls, "http://localhost:8888/dashcam");
        assert_eq!(config.urls.rtsp, "rtsp://localhost:8554/dashcam");
        assert_eq!(config.urls.api, "http://localhost:9997");
    }

    #[test]
    fn test_from_lookup_without_vars_uses_defaults() {
        let config = ControlConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, ControlConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ControlConfig::from_lookup(lookup_from(&[
            ("DASHCAM_CONFIG_FILE", "/tmp/dashcam.conf"),
            ("DASHCAM_MEDIAMTX_SERVICE", "mtx.service"),
            ("DASHCAM_CAMERA_SERVICE", "cam.service"),
            ("DASHCAM_PORT", "6000"),
            ("DASHCAM_STREAM_PATH", "frontcam"),
        ]));

        assert_eq!(config.config_file, PathBuf::from("/tmp/dashcam.conf"));
        assert_eq!(config.mediamtx_service, "mtx.service");
        assert_eq!(config.camera_service, "cam.service");
        assert_eq!(config.listen_port, 6000);
        assert_eq!(config.stream_path, "frontcam");
        // Fixed values are not overridable
        assert_eq!(config.mode_key, MODE_KEY);
        assert_eq!(config.rtsp_port, RTSP_PORT);
    }

    #[test]
    fn test_advertised_urls_follow_api_and_stream_overrides() {
        let config = ControlConfig::from_lookup(lookup_from(&[
            ("DASHCAM_MEDIAMTX_API", "http://10.0.0.5:9997/"),
            ("DASHCAM_STREAM_PATH", "frontcam"),
        ]));

        assert_eq!(config.mediamtx_api, "http://10.0.0.5:9997/");
        assert_eq!(config.urls.api, "http://10.0.0.5:9997");
        assert_eq!(config.urls.hls, "http://localhost:8888/frontcam");
        assert_eq!(config.urls.rtsp, "rtsp://localhost:8554/frontcam");
    }

    #[test]
    fn test_invalid_port_falls_back_to_default() {
        let config = ControlConfig::from_lookup(lookup_from(&[("DASHCAM_PORT", "not-a-port")]));
        assert_eq!(config.listen_port, DEFAULT_LISTEN_PORT);
    }

    #[test]
    fn test_restart_command_names_mediamtx_unit() {
        let config = ControlConfig::default();
        assert_eq!(
            config.restart_command(),
            "sudo systemctl restart dashcam-mediamtx.service"
        );
    }
}
