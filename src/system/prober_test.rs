//! Tests for the command-backed prober

use super::command::{CommandOutput, MockRunner};
use super::prober::*;
use crate::config::ControlConfig;
use std::sync::Arc;

fn prober(runner: Arc<MockRunner>) -> CommandProber {
    CommandProber::new(runner, &ControlConfig::default())
}

fn body(stdout: &str) -> CommandOutput {
    CommandOutput {
        success: true,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

#[tokio::test]
async fn test_service_active_queries_systemctl() {
    let runner = Arc::new(MockRunner::new());

    assert!(prober(runner.clone()).service_active("dashcam-camera.service").await);
    assert_eq!(
        runner.calls(),
        vec!["systemctl is-active --quiet dashcam-camera.service".to_string()]
    );
}

#[tokio::test]
async fn test_inactive_service_reads_false() {
    let runner = Arc::new(MockRunner::new().fail("is-active"));

    assert!(!prober(runner).service_active("dashcam-camera.service").await);
}

#[tokio::test]
async fn test_port_open_filters_socket_listing() {
    let runner = Arc::new(MockRunner::new());

    assert!(prober(runner.clone()).port_open(8554).await);
    assert_eq!(runner.calls(), vec!["ss -tulpn | grep -q :8554".to_string()]);
}

#[tokio::test]
async fn test_api_responding_hits_config_endpoint() {
    let runner = Arc::new(MockRunner::new());

    assert!(prober(runner.clone()).api_responding().await);
    assert_eq!(
        runner.calls(),
        vec!["curl -s http://localhost:9997/v3/config/get >/dev/null 2>&1".to_string()]
    );
}

#[tokio::test]
async fn test_api_timeout_reads_false() {
    let runner = Arc::new(MockRunner::new().respond(
        "config/get",
        CommandOutput::failed(super::command::TIMEOUT_MARKER),
    ));

    assert!(!prober(runner).api_responding().await);
}

#[tokio::test]
async fn test_stream_active_requires_path_in_listing() {
    let listed = Arc::new(
        MockRunner::new().respond("paths/list", body(r#"{"items":[{"name":"dashcam"}]}"#)),
    );
    let empty = Arc::new(MockRunner::new().respond("paths/list", body(r#"{"items":[]}"#)));

    assert!(prober(listed.clone()).stream_active().await);
    assert_eq!(
        listed.calls(),
        vec!["curl -s http://localhost:9997/v3/paths/list 2>/dev/null".to_string()]
    );
    assert!(!prober(empty).stream_active().await);
}

#[tokio::test]
async fn test_stream_active_false_when_request_fails() {
    // Body mentions the path but the command itself failed
    let runner = Arc::new(MockRunner::new().respond(
        "paths/list",
        CommandOutput {
            success: false,
            stdout: "dashcam".to_string(),
            stderr: String::new(),
        },
    ));

    assert!(!prober(runner).stream_active().await);
}

#[tokio::test]
async fn test_api_base_trailing_slash_is_normalized() {
    let runner = Arc::new(MockRunner::new());
    let config = ControlConfig {
        mediamtx_api: "http://127.0.0.1:9997/".to_string(),
        ..ControlConfig::default()
    };

    CommandProber::new(runner.clone(), &config)
        .api_responding()
        .await;

    assert_eq!(
        runner.calls(),
        vec!["curl -s http://127.0.0.1:9997/v3/config/get >/dev/null 2>&1".to_string()]
    );
}
