//! Persisted operating mode
//!
//! The mode lives as a single `MEDIAMTX_MODE=<value>` line inside a flat
//! `KEY=value` config file owned by the supervised stack. Reads scan for the
//! first matching line; writes rewrite the whole file, replacing only that
//! line and keeping every other line byte-for-byte in its original order.
//!
//! There is no locking around the read-modify-write: two concurrent writes
//! can lose an update.

use serde::{Serialize, Serializer};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Value reported when the mode cannot be determined
pub const UNKNOWN_MODE: &str = "unknown";

/// Operating mode read by MediaMTX on startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Low-resource streaming only
    Minimal,
    /// Streaming plus recording
    Recording,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Minimal => "minimal",
            Mode::Recording => "recording",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Mode must be 'minimal' or 'recording'")]
pub struct ParseModeError;

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(Mode::Minimal),
            "recording" => Ok(Mode::Recording),
            _ => Err(ParseModeError),
        }
    }
}

/// Mode as found in the config file
///
/// The file is owned by another system, so the line may hold something
/// other than a valid mode; that value is reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentMode {
    Known(Mode),
    Unrecognized(String),
    /// File unreadable or key absent
    Unknown,
}

impl CurrentMode {
    fn from_value(value: &str) -> Self {
        match value.parse::<Mode>() {
            Ok(mode) => CurrentMode::Known(mode),
            Err(_) => CurrentMode::Unrecognized(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CurrentMode::Known(mode) => mode.as_str(),
            CurrentMode::Unrecognized(value) => value,
            CurrentMode::Unknown => UNKNOWN_MODE,
        }
    }

    pub fn is(&self, mode: Mode) -> bool {
        matches!(self, CurrentMode::Known(current) if *current == mode)
    }
}

impl fmt::Display for CurrentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CurrentMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ModeError {
    #[error("Permission denied on {path}: {source}")]
    PermissionDenied { path: PathBuf, source: io::Error },

    #[error("{0}")]
    Io(io::Error),
}

impl ModeError {
    /// Classify an I/O failure on the config file
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            ModeError::PermissionDenied {
                path: path.to_path_buf(),
                source,
            }
        } else {
            ModeError::Io(source)
        }
    }
}

/// Reads and rewrites the mode line of the config file
#[derive(Debug, Clone)]
pub struct ModeStore {
    path: PathBuf,
    /// Line prefix, e.g. `MEDIAMTX_MODE=`
    prefix: String,
}

impl ModeStore {
    pub fn new(path: impl Into<PathBuf>, key: &str) -> Self {
        Self {
            path: path.into(),
            prefix: format!("{}=", key),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current mode; never fails, any error reads as `Unknown`
    pub async fn get_mode(&self) -> CurrentMode {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Config file unreadable");
                return CurrentMode::Unknown;
            }
        };

        contents
            .lines()
            .find_map(|line| line.strip_prefix(&self.prefix))
            .map(|value| CurrentMode::from_value(value.trim()))
            .unwrap_or(CurrentMode::Unknown)
    }

    /// Rewrite the mode line to `mode`
    ///
    /// Every line starting with the key is replaced with `KEY=<mode>\n`; all
    /// other lines are copied unchanged. If no line carries the key the file
    /// is rewritten identical to its input.
    pub async fn set_mode(&self, mode: Mode) -> Result<(), ModeError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ModeError::from_io(&self.path, e))?;

        let rewritten = rewrite_mode_lines(&contents, &self.prefix, mode);

        tokio::fs::write(&self.path, rewritten)
            .await
            .map_err(|e| ModeError::from_io(&self.path, e))
    }
}

fn rewrite_mode_lines(contents: &str, prefix: &str, mode: Mode) -> String {
    let mut out = String::with_capacity(contents.len() + mode.as_str().len());
    for line in contents.split_inclusive('\n') {
        if line.starts_with(prefix) {
            out.push_str(prefix);
            out.push_str(mode.as_str());
            out.push('\n');
        } else {
            out.push_str(line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parses_only_exact_literals() {
        assert_eq!("minimal".parse::<Mode>(), Ok(Mode::Minimal));
        assert_eq!("recording".parse::<Mode>(), Ok(Mode::Recording));
        assert_eq!("foo".parse::<Mode>(), Err(ParseModeError));
        assert_eq!("Minimal".parse::<Mode>(), Err(ParseModeError));
        assert_eq!("".parse::<Mode>(), Err(ParseModeError));
    }

    #[test]
    fn test_rewrite_replaces_only_mode_line() {
        let out = rewrite_mode_lines(
            "# dashcam\nMEDIAMTX_MODE=minimal\nOTHER=1\n",
            "MEDIAMTX_MODE=",
            Mode::Recording,
        );
        assert_eq!(out, "# dashcam\nMEDIAMTX_MODE=recording\nOTHER=1\n");
    }

    #[test]
    fn test_rewrite_keeps_crlf_and_missing_final_newline() {
        let out = rewrite_mode_lines("A=1\r\nB=2", "MEDIAMTX_MODE=", Mode::Minimal);
        assert_eq!(out, "A=1\r\nB=2");
    }

    #[test]
    fn test_rewrite_terminates_last_mode_line() {
        let out = rewrite_mode_lines("A=1\nMEDIAMTX_MODE=minimal", "MEDIAMTX_MODE=", Mode::Recording);
        assert_eq!(out, "A=1\nMEDIAMTX_MODE=recording\n");
    }

    #[test]
    fn test_permission_denied_io_error_is_distinct() {
        let path = Path::new("/etc/dashcam/dashcam.conf");

        let denied = ModeError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(
            denied,
            ModeError::PermissionDenied { path: ref denied_path, .. } if denied_path.as_path() == path
        ));

        let missing = ModeError::from_io(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(missing, ModeError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn test_current_mode_display() {
        assert_eq!(CurrentMode::Known(Mode::Minimal).to_string(), "minimal");
        assert_eq!(CurrentMode::Unrecognized("foo".into()).to_string(), "foo");
        assert_eq!(CurrentMode::Unknown.to_string(), "unknown");
    }
}
