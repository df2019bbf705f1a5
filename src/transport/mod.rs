//! Transport selection and engine supervision.
//!
//! The engine speaks MCP itself; the launcher decides which channel it exposes:
//! - Stdio: the engine inherits the launcher's standard streams
//! - HTTP: the engine binds a host/port and the launcher waits for it to listen

pub mod http;
pub mod stdio;

pub use http::HttpTransport;
pub use stdio::StdioTransport;

use crate::engine::EngineLaunch;
use crate::env::Environment;
use crate::error::{LauncherError, LauncherResult};
use serde::Serialize;
use std::future::Future;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Child;
use tokio::signal;
use tracing::{info, warn};

/// Transport mode variable, `stdio` or `http`.
pub const TRANSPORT_ENV: &str = "MCP_TOOLBOX_TRANSPORT";
/// HTTP listen host variable.
pub const HOST_ENV: &str = "MCP_TOOLBOX_HOST";
/// HTTP listen port variable.
pub const PORT_ENV: &str = "MCP_TOOLBOX_PORT";

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 5000;

/// How long the engine gets to exit on its own after a shutdown signal.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport mode for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// HTTP (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Explicit transport inputs from the command line.
#[derive(Debug, Clone)]
pub struct TransportFlags {
    /// `--transport <mode>`
    pub transport: Option<String>,
    /// `--stdio`, defaults to true
    pub stdio: bool,
    /// `--toolbox-host`
    pub host: Option<String>,
    /// `--toolbox-port`
    pub port: Option<u16>,
}

impl Default for TransportFlags {
    fn default() -> Self {
        Self {
            transport: None,
            stdio: true,
            host: None,
            port: None,
        }
    }
}

/// Transport chosen at startup. Host and port stay `None` unless set explicitly
/// or through the environment; runners apply their own defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportDecision {
    pub mode: TransportMode,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl TransportDecision {
    pub fn host_or_default(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HTTP_HOST)
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_HTTP_PORT)
    }
}

/// Pick the transport.
///
/// Mode precedence: `--transport` (case-insensitive), then `MCP_TOOLBOX_TRANSPORT`,
/// then the `--stdio` flag. Any requested mode other than `http` selects stdio; a
/// blank `--transport` defers to `--stdio`. Host and port come from the flag, then
/// the environment. An unparsable port variable only fails HTTP mode.
pub fn select_transport(
    flags: &TransportFlags,
    env: &dyn Environment,
) -> LauncherResult<TransportDecision> {
    // A given flag shadows the variable even when blank.
    let requested = match &flags.transport {
        Some(value) => Some(value.clone()),
        None => env.var(TRANSPORT_ENV),
    };

    let mode = match requested.as_deref().map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("http") => TransportMode::Http,
        Some(value) if !value.is_empty() => TransportMode::Stdio,
        _ if flags.stdio => TransportMode::Stdio,
        _ => TransportMode::Http,
    };

    let host = flags.host.clone().or_else(|| env.var(HOST_ENV));

    let port = match (flags.port, env.var(PORT_ENV)) {
        (Some(port), _) => Some(port),
        (None, None) => None,
        (None, Some(raw)) => match raw.trim().parse::<u16>() {
            Ok(port) => Some(port),
            Err(_) if mode == TransportMode::Http => {
                return Err(LauncherError::invalid_input(format!(
                    "{} must be a port number, got '{}'",
                    PORT_ENV, raw
                )));
            }
            Err(_) => {
                warn!(value = %raw, "Ignoring invalid {} in stdio mode", PORT_ENV);
                None
            }
        },
    };

    Ok(TransportDecision { mode, host, port })
}

/// Trait for engine transport runners.
///
/// A runner starts the engine wired for its channel and blocks until the engine
/// exits or the launcher is asked to shut down.
pub trait Transport: Send + Sync {
    /// Arguments appended to the engine command line for this transport.
    fn engine_args(&self) -> Vec<String>;

    /// Launch the engine and supervise it until exit.
    fn run(&self, launch: &EngineLaunch) -> impl Future<Output = LauncherResult<()>> + Send;

    /// Get the name of this transport for logging.
    fn name(&self) -> &'static str;
}

fn exit_result(status: io::Result<ExitStatus>) -> LauncherResult<()> {
    match status {
        Ok(status) if status.success() => {
            info!("Engine exited normally");
            Ok(())
        }
        Ok(status) => Err(LauncherError::engine_exited(status.code())),
        Err(e) => Err(LauncherError::internal(format!(
            "Failed to wait for engine: {}",
            e
        ))),
    }
}

/// Wait for the engine to exit, stopping it on SIGINT/SIGTERM.
///
/// After the first signal the engine gets [`GRACEFUL_TIMEOUT`] to exit; a second
/// signal or the timeout kills it.
pub(crate) async fn supervise(mut child: Child) -> LauncherResult<()> {
    tokio::select! {
        status = child.wait() => return exit_result(status),
        _ = wait_for_signal() => {}
    }

    info!(
        timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
        "Shutdown signal received, waiting for engine to exit (send signal again to force)..."
    );
    request_stop(&mut child);

    let force = tokio::select! {
        status = child.wait() => {
            if let Err(e) = status {
                warn!(error = %e, "Failed to wait for engine");
            }
            false
        }
        _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
            warn!("Graceful shutdown timeout, killing engine");
            true
        }
        _ = wait_for_signal() => {
            warn!("Received second signal, killing engine");
            true
        }
    };

    if force {
        if let Err(e) = child.kill().await {
            warn!(error = %e, "Failed to kill engine");
        }
    }

    Ok(())
}

/// Ask the engine to exit: SIGTERM on Unix, an immediate kill elsewhere.
fn request_stop(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        let Some(pid) = child.id() else {
            // Already reaped
            return;
        };
        match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => return,
            Err(e) => warn!(error = %e, "Failed to send SIGTERM to engine"),
        }
    }

    if let Err(e) = child.start_kill() {
        warn!(error = %e, "Failed to stop engine");
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
pub(crate) async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
