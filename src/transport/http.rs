//! HTTP transport for the engine.
//!
//! The engine binds its own listener; the launcher passes the address, waits until
//! the port accepts connections, then supervises the process.

use crate::engine::EngineLaunch;
use crate::error::{LauncherError, LauncherResult};
use crate::transport::{Transport, TransportDecision, supervise};
use std::process::Stdio;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::Child;
use tokio::time::Instant;
use tracing::{debug, info};

/// How long the engine may take to start listening.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

const READY_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// HTTP transport implementation.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Host the engine binds to
    host: String,
    /// Port the engine binds to
    port: u16,
    startup_timeout: Duration,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    ///
    /// # Arguments
    ///
    /// * `host` - Host address the engine binds to
    /// * `port` - Port the engine binds to
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }

    /// Create from a transport decision, applying default host and port.
    pub fn from_decision(decision: &TransportDecision) -> Self {
        Self::new(decision.host_or_default(), decision.port_or_default())
    }

    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Address used to probe readiness. Wildcard binds are probed on loopback.
    fn probe_addr(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" => "127.0.0.1",
            "::" | "[::]" => "[::1]",
            other => other,
        };
        format!("{}:{}", host, self.port)
    }

    /// Wait until the engine accepts TCP connections.
    ///
    /// Fails if the engine exits first or the startup timeout elapses.
    pub(crate) async fn wait_until_ready(&self, child: &mut Child) -> LauncherResult<()> {
        let addr = self.probe_addr();
        let deadline = Instant::now() + self.startup_timeout;

        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    return Err(LauncherError::engine_startup(
                        format!("engine exited with {} before listening on {}", status, addr),
                        "Check the engine output above for configuration errors",
                    ));
                }
                Ok(None) => {}
                Err(e) => {
                    return Err(LauncherError::internal(format!(
                        "Failed to poll engine process: {}",
                        e
                    )));
                }
            }

            if TcpStream::connect(&addr).await.is_ok() {
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(LauncherError::engine_startup(
                    format!(
                        "engine did not listen on {} within {}s",
                        addr,
                        self.startup_timeout.as_secs()
                    ),
                    "Check that the port is available",
                ));
            }

            debug!(addr = %addr, "Engine not listening yet");
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

impl Transport for HttpTransport {
    fn engine_args(&self) -> Vec<String> {
        vec![
            "--address".to_string(),
            self.host.clone(),
            "--port".to_string(),
            self.port.to_string(),
        ]
    }

    async fn run(&self, launch: &EngineLaunch) -> LauncherResult<()> {
        let bind_addr = self.bind_addr();
        info!("Starting engine with HTTP transport on {}", bind_addr);

        let mut cmd = launch.command();
        cmd.args(self.engine_args())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit());

        let mut child = cmd.spawn().map_err(|e| {
            LauncherError::engine_startup(
                format!("Failed to spawn {}: {}", launch.binary_path.display(), e),
                "Check that the binary is executable and built for this platform",
            )
        })?;

        // kill_on_drop stops the engine if readiness fails
        self.wait_until_ready(&mut child).await?;
        info!(addr = %bind_addr, pid = child.id(), "Engine listening");

        supervise(child).await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
