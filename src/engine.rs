//! Engine launch description.
//!
//! Captures what the engine should serve (a tools file or a prebuilt database
//! type) and which connection overrides it receives, and builds the command line.
//! Transport arguments are added by the runners in [`crate::transport`].

use crate::error::{LauncherError, LauncherResult};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Prebuilt database configurations shipped with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrebuiltDatabase {
    Postgres,
    Mysql,
    Sqlite,
    Mongodb,
    Redis,
    Mssql,
    CloudSqlPostgres,
    CloudSqlMysql,
    AlloydbPg,
    Bigquery,
    Spanner,
    Firestore,
}

impl PrebuiltDatabase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Sqlite => "sqlite",
            Self::Mongodb => "mongodb",
            Self::Redis => "redis",
            Self::Mssql => "mssql",
            Self::CloudSqlPostgres => "cloud-sql-postgres",
            Self::CloudSqlMysql => "cloud-sql-mysql",
            Self::AlloydbPg => "alloydb-pg",
            Self::Bigquery => "bigquery",
            Self::Spanner => "spanner",
            Self::Firestore => "firestore",
        }
    }
}

impl fmt::Display for PrebuiltDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the engine serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineConfig {
    /// User-supplied tools file.
    ToolsFile(PathBuf),
    /// Prebuilt configuration for a database type.
    Prebuilt(PrebuiltDatabase),
}

impl EngineConfig {
    /// Build from the command line: a tools file if given, else a prebuilt type.
    ///
    /// The tools file must exist.
    pub fn from_sources(
        tools_file: Option<&Path>,
        prebuilt: Option<PrebuiltDatabase>,
    ) -> LauncherResult<Self> {
        match (tools_file, prebuilt) {
            (Some(path), _) => {
                if !path.is_file() {
                    return Err(LauncherError::config_not_found(path));
                }
                Ok(Self::ToolsFile(path.to_path_buf()))
            }
            (None, Some(db)) => Ok(Self::Prebuilt(db)),
            (None, None) => Err(LauncherError::invalid_input(
                "either --config or --prebuilt must be specified",
            )),
        }
    }

    /// Engine arguments selecting this configuration.
    pub fn engine_args(&self) -> Vec<String> {
        match self {
            Self::ToolsFile(path) => vec![
                "--tools-file".to_string(),
                path.to_string_lossy().into_owned(),
            ],
            Self::Prebuilt(db) => vec!["--prebuilt".to_string(), db.as_str().to_string()],
        }
    }
}

/// Connection overrides forwarded to the engine's environment.
#[derive(Clone, Default, Serialize)]
pub struct DatabaseOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub name: Option<String>,
    pub user: Option<String>,
    /// Sensitive - never logged or serialized.
    #[serde(skip)]
    pub password: Option<String>,
}

impl fmt::Debug for DatabaseOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseOverrides")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl DatabaseOverrides {
    /// `MCP_DATABASE_*` variables for the set overrides.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        [
            ("MCP_DATABASE_HOST", self.host.clone()),
            ("MCP_DATABASE_PORT", self.port.map(|p| p.to_string())),
            ("MCP_DATABASE_NAME", self.name.clone()),
            ("MCP_DATABASE_USER", self.user.clone()),
            ("MCP_DATABASE_PASSWORD", self.password.clone()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

/// Everything needed to start the engine, minus transport.
#[derive(Debug, Clone, Serialize)]
pub struct EngineLaunch {
    pub binary_path: PathBuf,
    pub config: EngineConfig,
    pub overrides: DatabaseOverrides,
}

impl EngineLaunch {
    pub fn new(binary_path: impl Into<PathBuf>, config: EngineConfig) -> Self {
        Self {
            binary_path: binary_path.into(),
            config,
            overrides: DatabaseOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: DatabaseOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Base engine command: config arguments and override variables.
    ///
    /// The child is killed if the launcher drops it.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(self.config.engine_args())
            .envs(self.overrides.env_vars())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_prebuilt_names_match_value_enum() {
        for db in PrebuiltDatabase::value_variants() {
            let parsed = PrebuiltDatabase::from_str(db.as_str(), false).unwrap();
            assert_eq!(parsed, *db);
        }
        assert_eq!(PrebuiltDatabase::value_variants().len(), 12);
    }

    #[test]
    fn test_config_requires_a_source() {
        let err = EngineConfig::from_sources(None, None).unwrap_err();
        assert!(matches!(err, LauncherError::InvalidInput { .. }));
    }

    #[test]
    fn test_missing_tools_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.yaml");
        let err = EngineConfig::from_sources(Some(&path), None).unwrap_err();
        assert!(matches!(err, LauncherError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_tools_file_wins_over_prebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.yaml");
        std::fs::write(&path, "sources: {}\n").unwrap();
        let config =
            EngineConfig::from_sources(Some(&path), Some(PrebuiltDatabase::Postgres)).unwrap();
        assert_eq!(config, EngineConfig::ToolsFile(path.clone()));
        assert_eq!(config.engine_args()[0], "--tools-file");
    }

    #[test]
    fn test_prebuilt_args() {
        let config = EngineConfig::Prebuilt(PrebuiltDatabase::CloudSqlPostgres);
        assert_eq!(config.engine_args(), vec!["--prebuilt", "cloud-sql-postgres"]);
    }

    #[test]
    fn test_override_env_vars() {
        let overrides = DatabaseOverrides {
            host: Some("db.internal".to_string()),
            port: Some(5432),
            password: Some("secret".to_string()),
            ..Default::default()
        };
        assert_eq!(
            overrides.env_vars(),
            vec![
                ("MCP_DATABASE_HOST", "db.internal".to_string()),
                ("MCP_DATABASE_PORT", "5432".to_string()),
                ("MCP_DATABASE_PASSWORD", "secret".to_string()),
            ]
        );
    }

    #[test]
    fn test_password_redacted() {
        let overrides = DatabaseOverrides {
            password: Some("secret".to_string()),
            ..Default::default()
        };
        assert!(!format!("{:?}", overrides).contains("secret"));
        assert!(!serde_json::to_string(&overrides).unwrap().contains("secret"));
    }

    #[test]
    fn test_command_line() {
        let launch = EngineLaunch::new(
            "/opt/eng/toolbox",
            EngineConfig::Prebuilt(PrebuiltDatabase::Sqlite),
        )
        .with_overrides(DatabaseOverrides {
            name: Some("app.db".to_string()),
            ..Default::default()
        });
        let cmd = launch.command();
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), OsStr::new("/opt/eng/toolbox"));
        let args: Vec<&OsStr> = std_cmd.get_args().collect();
        assert_eq!(args, vec![OsStr::new("--prebuilt"), OsStr::new("sqlite")]);
        let envs: Vec<_> = std_cmd.get_envs().collect();
        assert_eq!(
            envs,
            vec![(OsStr::new("MCP_DATABASE_NAME"), Some(OsStr::new("app.db")))]
        );
    }
}
