//! Integration tests for transport selection and engine launch.

use mcp_database::engine::{DatabaseOverrides, EngineConfig, EngineLaunch, PrebuiltDatabase};
use mcp_database::env::StaticEnvironment;
use mcp_database::transport::{
    HttpTransport, PORT_ENV, TRANSPORT_ENV, TransportFlags, TransportMode, select_transport,
};

#[test]
fn test_environment_selects_http_with_port() {
    let env = StaticEnvironment::new("linux", "x86_64")
        .with_var(TRANSPORT_ENV, "HTTP")
        .with_var(PORT_ENV, "5900");
    let decision = select_transport(&TransportFlags::default(), &env).unwrap();
    assert_eq!(decision.mode, TransportMode::Http);

    let transport = HttpTransport::from_decision(&decision);
    assert_eq!(transport.bind_addr(), "127.0.0.1:5900");
}

#[test]
fn test_decision_serializes_for_launch_plan() {
    let env = StaticEnvironment::new("linux", "x86_64");
    let decision = select_transport(&TransportFlags::default(), &env).unwrap();
    let json = serde_json::to_value(&decision).unwrap();
    assert_eq!(json["mode"], "stdio");
    assert!(json["host"].is_null());
}

#[cfg(unix)]
mod engine {
    use super::*;
    use mcp_database::error::LauncherError;
    use mcp_database::transport::{StdioTransport, Transport};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn fake_engine(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("toolbox");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_stdio_engine_receives_args_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(
            &dir,
            r#"[ "$1" = "--prebuilt" ] || exit 10
[ "$2" = "sqlite" ] || exit 11
[ "$3" = "--stdio" ] || exit 12
[ "$MCP_DATABASE_NAME" = "app.db" ] || exit 13
exit 0"#,
        );

        let launch = EngineLaunch::new(engine, EngineConfig::Prebuilt(PrebuiltDatabase::Sqlite))
            .with_overrides(DatabaseOverrides {
                name: Some("app.db".to_string()),
                ..Default::default()
            });

        StdioTransport::new().run(&launch).await.unwrap();
    }

    #[tokio::test]
    async fn test_stdio_engine_failure_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(&dir, "exit 4");
        let launch = EngineLaunch::new(engine, EngineConfig::Prebuilt(PrebuiltDatabase::Postgres));

        let err = StdioTransport::new().run(&launch).await.unwrap_err();
        assert!(matches!(
            err,
            LauncherError::EngineExited { exit_code: Some(4) }
        ));
    }

    #[tokio::test]
    async fn test_http_engine_exiting_before_listen() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(&dir, "echo 'bad tools file' >&2\nexit 2");
        let tools = dir.path().join("tools.yaml");
        fs::write(&tools, "sources: {}\n").unwrap();
        let launch = EngineLaunch::new(engine, EngineConfig::ToolsFile(tools));

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport =
            HttpTransport::new("127.0.0.1", port).with_startup_timeout(Duration::from_secs(10));
        let err = transport.run(&launch).await.unwrap_err();
        assert!(matches!(err, LauncherError::EngineStartup { .. }));
        assert!(err.to_string().contains("before listening"));
    }
}
