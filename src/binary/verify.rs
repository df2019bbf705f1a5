//! Runtime verification of a resolved binary.
//!
//! The binary is started once with `--version`, without a shell, and its exit
//! status tells us whether it can run at all on this host. No timeout is applied:
//! a binary that hangs on `--version` hangs verification.

use crate::error::{LauncherError, LauncherResult};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Argument passed to the engine to query its version.
pub const VERSION_ARG: &str = "--version";

/// Reported when the engine exits cleanly without printing anything.
pub const UNKNOWN_VERSION: &str = "unknown version";

/// Three-way result of a version probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Exited 0; carries trimmed stdout or [`UNKNOWN_VERSION`].
    Verified { version: String },
    /// Ran but exited non-zero (or was killed by a signal).
    Failed {
        exit_code: Option<i32>,
        stderr: Option<String>,
    },
    /// Could not be started at all.
    SpawnFailed { message: String },
}

impl VerificationOutcome {
    pub fn into_result(self) -> LauncherResult<String> {
        match self {
            Self::Verified { version } => Ok(version),
            Self::Failed { exit_code, stderr } => {
                Err(LauncherError::verification_failed(exit_code, stderr))
            }
            Self::SpawnFailed { message } => Err(LauncherError::spawn_failed(message)),
        }
    }
}

/// Run `<path> --version` and classify the outcome.
pub async fn probe_version(path: &Path) -> VerificationOutcome {
    debug!(path = %path.display(), "Verifying engine binary");

    let output = Command::new(path)
        .arg(VERSION_ARG)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await;

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            return VerificationOutcome::SpawnFailed {
                message: e.to_string(),
            };
        }
    };

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let trimmed = stdout.trim();
        let version = if trimmed.is_empty() {
            UNKNOWN_VERSION.to_string()
        } else {
            trimmed.to_string()
        };
        return VerificationOutcome::Verified { version };
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    VerificationOutcome::Failed {
        exit_code: output.status.code(),
        stderr: (!stderr.is_empty()).then_some(stderr),
    }
}

/// Verify the binary, returning its version string.
///
/// Errors are advisory: callers log them and carry on.
pub async fn verify_binary(path: &Path) -> LauncherResult<String> {
    probe_version(path).await.into_result()
}
