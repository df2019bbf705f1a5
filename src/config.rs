//! Configuration handling for the MCP database launcher.
//!
//! Command-line arguments only. Transport-related environment variables are
//! resolved by [`crate::transport::select_transport`], not by clap, so their
//! precedence stays in one place.

use crate::binary::ResolutionOptions;
use crate::engine::{DatabaseOverrides, EngineConfig, PrebuiltDatabase};
use crate::error::LauncherResult;
use crate::transport::TransportFlags;
use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;

pub const DEFAULT_LOG_LEVEL: &str = "info";

const AFTER_HELP: &str = "\
Binary search order:
  1. --binary-path
  2. TOOLBOX_PATH environment variable
  3. platform package / bundled binaries/<os>-<arch>/
  4. ./binaries/toolbox, ./toolbox
  5. ~/.mcp-database/binaries/toolbox
  6. system PATH

Environment:
  MCP_TOOLBOX_TRANSPORT  transport mode: stdio or http (default: stdio)
  MCP_TOOLBOX_HOST       HTTP listen address (default: 127.0.0.1)
  MCP_TOOLBOX_PORT       HTTP port (default: 5000)
  TOOLBOX_PATH           path to the genai-toolbox binary

Examples:
  mcp-database --config tools.yaml
  mcp-database --prebuilt postgres --db-host localhost --db-name mydb
  mcp-database --prebuilt sqlite --transport http --toolbox-port 5900";

/// Configuration for the launcher.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mcp-database",
    about = "Database MCP server - locates and runs the genai-toolbox engine",
    version,
    author,
    after_help = AFTER_HELP
)]
#[command(group(
    ArgGroup::new("engine_config")
        .required(true)
        .args(["config", "prebuilt"])
))]
pub struct Config {
    /// Path to a tools.yaml configuration file
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use a prebuilt database configuration
    #[arg(short = 'p', long, value_enum, value_name = "TYPE")]
    pub prebuilt: Option<PrebuiltDatabase>,

    /// Path to the genai-toolbox binary, or a directory containing it
    #[arg(short = 'b', long = "binary-path", value_name = "PATH")]
    pub binary_path: Option<PathBuf>,

    /// Use the stdio transport (default: true)
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub stdio: bool,

    /// Transport mode: stdio or http
    #[arg(long, value_name = "MODE")]
    pub transport: Option<String>,

    /// HTTP listen address for the engine (default: 127.0.0.1)
    #[arg(long = "toolbox-host", value_name = "HOST")]
    pub toolbox_host: Option<String>,

    /// HTTP port for the engine (default: 5000)
    #[arg(long = "toolbox-port", value_name = "PORT")]
    pub toolbox_port: Option<u16>,

    /// Database host
    #[arg(long = "db-host", value_name = "HOST")]
    pub db_host: Option<String>,

    /// Database port
    #[arg(long = "db-port", value_name = "PORT")]
    pub db_port: Option<u16>,

    /// Database name or file path
    #[arg(long = "db-name", value_name = "NAME")]
    pub db_name: Option<String>,

    /// Database user
    #[arg(long = "db-user", value_name = "USER")]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long = "db-password", value_name = "PASSWORD")]
    pub db_password: Option<String>,

    /// Enable verbose logging and print the launch plan
    #[arg(long)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log level after applying `--verbose`.
    pub fn effective_log_level(&self) -> &str {
        if self.verbose && self.log_level == DEFAULT_LOG_LEVEL {
            "debug"
        } else {
            &self.log_level
        }
    }

    pub fn resolution_options(&self) -> ResolutionOptions {
        ResolutionOptions {
            binary_path: self.binary_path.clone(),
        }
    }

    pub fn transport_flags(&self) -> TransportFlags {
        TransportFlags {
            transport: self.transport.clone(),
            stdio: self.stdio,
            host: self.toolbox_host.clone(),
            port: self.toolbox_port,
        }
    }

    pub fn engine_config(&self) -> LauncherResult<EngineConfig> {
        EngineConfig::from_sources(self.config.as_deref(), self.prebuilt)
    }

    pub fn database_overrides(&self) -> DatabaseOverrides {
        DatabaseOverrides {
            host: self.db_host.clone(),
            port: self.db_port,
            name: self.db_name.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("mcp-database").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }

    #[test]
    fn test_requires_config_or_prebuilt() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_config_and_prebuilt_conflict() {
        let err = parse(&["--config", "tools.yaml", "--prebuilt", "postgres"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_unknown_prebuilt_rejected() {
        let err = parse(&["--prebuilt", "oracle"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["-p", "sqlite"]).unwrap();
        assert_eq!(config.prebuilt, Some(PrebuiltDatabase::Sqlite));
        assert!(config.stdio);
        assert_eq!(config.transport, None);
        assert_eq!(config.binary_path, None);
        let flags = config.transport_flags();
        assert!(flags.stdio);
        assert_eq!(flags.port, None);
    }

    #[test]
    fn test_stdio_flag_forms() {
        assert!(parse(&["-p", "sqlite", "--stdio"]).unwrap().stdio);
        assert!(!parse(&["-p", "sqlite", "--stdio=false"]).unwrap().stdio);
        assert!(!parse(&["-p", "sqlite", "--stdio", "false"]).unwrap().stdio);
    }

    #[test]
    fn test_transport_and_port_flags() {
        let config = parse(&[
            "-p",
            "sqlite",
            "--transport",
            "http",
            "--toolbox-host",
            "0.0.0.0",
            "--toolbox-port",
            "5900",
        ])
        .unwrap();
        let flags = config.transport_flags();
        assert_eq!(flags.transport.as_deref(), Some("http"));
        assert_eq!(flags.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(flags.port, Some(5900));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = parse(&["-p", "sqlite", "--toolbox-port", "99999"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_binary_path_feeds_resolution() {
        let config = parse(&["-p", "mysql", "-b", "/opt/eng"]).unwrap();
        assert_eq!(
            config.resolution_options().binary_path,
            Some(PathBuf::from("/opt/eng"))
        );
    }

    #[test]
    fn test_database_overrides() {
        let config = parse(&[
            "-p",
            "postgres",
            "--db-host",
            "localhost",
            "--db-port",
            "5432",
            "--db-user",
            "postgres",
        ])
        .unwrap();
        let overrides = config.database_overrides();
        assert_eq!(overrides.host.as_deref(), Some("localhost"));
        assert_eq!(overrides.port, Some(5432));
        assert_eq!(overrides.user.as_deref(), Some("postgres"));
        assert_eq!(overrides.password, None);
    }

    #[test]
    fn test_verbose_raises_log_level() {
        let config = parse(&["-p", "sqlite", "--verbose"]).unwrap();
        assert_eq!(config.effective_log_level(), "debug");

        let config = parse(&["-p", "sqlite", "--verbose", "--log-level", "trace"]).unwrap();
        assert_eq!(config.effective_log_level(), "trace");
    }

    #[test]
    fn test_version_flag() {
        let err = parse(&["-V"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }
}
