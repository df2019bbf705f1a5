//! Stdio transport for the engine.
//!
//! The engine inherits the launcher's stdin/stdout, so the MCP client talks to it
//! directly. This is the default mode for CLI-based MCP integrations.

use crate::engine::EngineLaunch;
use crate::error::{LauncherError, LauncherResult};
use crate::transport::{Transport, supervise};
use std::process::Stdio;
use tracing::info;

/// Stdio transport implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioTransport;

impl StdioTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for StdioTransport {
    fn engine_args(&self) -> Vec<String> {
        vec!["--stdio".to_string()]
    }

    async fn run(&self, launch: &EngineLaunch) -> LauncherResult<()> {
        info!("Starting engine with stdio transport");

        let mut cmd = launch.command();
        cmd.args(self.engine_args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit());

        let child = cmd.spawn().map_err(|e| {
            LauncherError::engine_startup(
                format!("Failed to spawn {}: {}", launch.binary_path.display(), e),
                "Check that the binary is executable and built for this platform",
            )
        })?;

        info!(pid = child.id(), "Engine started");
        supervise(child).await
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineConfig, PrebuiltDatabase};

    #[test]
    fn test_stdio_transport_creation() {
        let transport = StdioTransport::new();
        assert_eq!(transport.name(), "stdio");
        assert_eq!(transport.engine_args(), vec!["--stdio"]);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let launch = EngineLaunch::new(
            dir.path().join("missing-toolbox"),
            EngineConfig::Prebuilt(PrebuiltDatabase::Postgres),
        );
        let err = StdioTransport::new().run(&launch).await.unwrap_err();
        assert!(matches!(err, LauncherError::EngineStartup { .. }));
        assert!(err.suggestion().is_some());
    }
}
