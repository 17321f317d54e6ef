//! Mode transitions
//!
//! A requested mode equal to the current one is acknowledged without
//! touching the file. Anything else rewrites the mode line; the change only
//! takes effect once MediaMTX is restarted.

use crate::control::mode::{CurrentMode, Mode, ModeError, ModeStore};
use tracing::{error, info, warn};

/// Outcome of a successful mode request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeSwitch {
    /// Already in the requested mode, file untouched
    Unchanged(Mode),
    /// Mode line rewritten; a restart is needed to apply it
    Switched { from: CurrentMode, to: Mode },
}

impl ModeSwitch {
    pub fn mode(&self) -> Mode {
        match self {
            ModeSwitch::Unchanged(mode) => *mode,
            ModeSwitch::Switched { to, .. } => *to,
        }
    }

    pub fn restart_required(&self) -> bool {
        matches!(self, ModeSwitch::Switched { .. })
    }

    pub fn message(&self) -> String {
        match self {
            ModeSwitch::Unchanged(mode) => format!("Already in {} mode", mode),
            ModeSwitch::Switched { from, to } => format!("Mode switched from {} to {}", from, to),
        }
    }
}

/// Move the persisted mode to `requested`
pub async fn switch_mode(store: &ModeStore, requested: Mode) -> Result<ModeSwitch, ModeError> {
    let current = store.get_mode().await;

    if current.is(requested) {
        info!(mode = %requested, "Mode unchanged");
        return Ok(ModeSwitch::Unchanged(requested));
    }

    match store.set_mode(requested).await {
        Ok(()) => {
            info!(from = %current, to = %requested, "Mode switched, restart required");
            Ok(ModeSwitch::Switched {
                from: current,
                to: requested,
            })
        }
        Err(e @ ModeError::PermissionDenied { .. }) => {
            warn!(path = %store.path().display(), error = %e, "Cannot write mode config");
            Err(e)
        }
        Err(e) => {
            error!(path = %store.path().display(), error = %e, "Failed to update mode config");
            Err(e)
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write temp config");
        file
    }

    #[tokio::test]
    async fn test_same_mode_is_noop_and_leaves_file_untouched() {
        let original = "MEDIAMTX_MODE=minimal\r\nOTHER=1";
        let file = config_file(original);
        let store = ModeStore::new(file.path(), "MEDIAMTX_MODE");

        let outcome = switch_mode(&store, Mode::Minimal).await.expect("switch");

        assert_eq!(outcome, ModeSwitch::Unchanged(Mode::Minimal));
        assert!(!outcome.restart_required());
        assert_eq!(outcome.message(), "Already in minimal mode");
        let bytes = std::fs::read(file.path()).expect("read back");
        assert_eq!(bytes, original.as_bytes());
    }

    #[tokio::test]
    async fn test_different_mode_switches() {
        let file = config_file("MEDIAMTX_MODE=minimal\nOTHER=1\n");
        let store = ModeStore::new(file.path(), "MEDIAMTX_MODE");

        let outcome = switch_mode(&store, Mode::Recording).await.expect("switch");

        assert_eq!(
            outcome,
            ModeSwitch::Switched {
                from: CurrentMode::Known(Mode::Minimal),
                to: Mode::Recording,
            }
        );
        assert!(outcome.restart_required());
        assert_eq!(outcome.message(), "Mode switched from minimal to recording");
        assert_eq!(outcome.mode(), Mode::Recording);
    }

    #[tokio::test]
    async fn test_unknown_current_mode_still_reports_switch() {
        let original = "OTHER=1\n";
        let file = config_file(original);
        let store = ModeStore::new(file.path(), "MEDIAMTX_MODE");

        let outcome = switch_mode(&store, Mode::Recording).await.expect("switch");

        assert_eq!(outcome.message(), "Mode switched from unknown to recording");
        assert!(outcome.restart_required());
        // No key to replace, nothing appended
        assert_eq!(
            std::fs::read_to_string(file.path()).expect("read back"),
            original
        );
    }

    #[tokio::test]
    async fn test_missing_file_propagates_io_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = ModeStore::new(dir.path().join("absent.conf"), "MEDIAMTX_MODE");

        let result = switch_mode(&store, Mode::Minimal).await;

        assert!(matches!(result, Err(ModeError::Io(_))));
    }
}
