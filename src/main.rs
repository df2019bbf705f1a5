//! MCP Database - Main entry point.
//!
//! Locates the genai-toolbox engine for this platform, checks that it runs, and
//! launches it with the selected MCP transport.

use mcp_database::binary::{BinaryResolver, verify_binary};
use mcp_database::config::Config;
use mcp_database::engine::EngineLaunch;
use mcp_database::env::SystemEnvironment;
use mcp_database::transport::{
    HttpTransport, StdioTransport, Transport, TransportDecision, TransportMode, select_transport,
};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Resolved startup state printed with `--verbose`.
#[derive(Serialize)]
struct LaunchPlan<'a> {
    engine: &'a EngineLaunch,
    transport: &'a TransportDecision,
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout belongs to the stdio transport.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.effective_log_level()));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line
    let config = Config::parse_args();

    // Initialize logging
    init_tracing(&config);

    info!("Starting MCP Database v{}", env!("CARGO_PKG_VERSION"));

    // Locate the engine binary
    info!("Locating genai-toolbox binary");
    let resolver = BinaryResolver::new(SystemEnvironment);
    let binary_path = match resolver.ensure_binary(&config.resolution_options()).await {
        Ok(path) => path,
        Err(e) => {
            // Not-found errors carry multi-line install instructions
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    info!(path = %binary_path.display(), "Found genai-toolbox binary");

    // Only fatal verification errors stop startup
    match verify_binary(&binary_path).await {
        Ok(version) => info!(version = %version, "genai-toolbox version"),
        Err(e) if e.is_fatal() => {
            error!(error = %e, "Binary verification failed");
            return Err(e.into());
        }
        Err(e) => warn!(error = %e, "Could not verify binary version"),
    }

    let engine_config = config.engine_config()?;
    let decision = select_transport(&config.transport_flags(), &SystemEnvironment)?;
    let launch = EngineLaunch::new(binary_path, engine_config)
        .with_overrides(config.database_overrides());

    if config.verbose {
        let plan = LaunchPlan {
            engine: &launch,
            transport: &decision,
        };
        info!("Launch plan: {}", serde_json::to_string_pretty(&plan)?);
    }

    info!(transport = %decision.mode, "Starting MCP server");

    // Run the appropriate transport
    let result = match decision.mode {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            StdioTransport::new().run(&launch).await
        }
        TransportMode::Http => {
            let transport = HttpTransport::from_decision(&decision);
            info!(addr = %transport.bind_addr(), "Using HTTP transport");
            transport.run(&launch).await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        if let Some(suggestion) = e.suggestion() {
            error!("{}", suggestion);
        }
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
