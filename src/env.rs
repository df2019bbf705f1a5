//! Access to process-environment facts.
//!
//! Resolution, verification and transport selection never read the real process
//! state directly. They go through [`Environment`], so tests can pin the OS, the
//! variables and every directory without touching the running process.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::trace;

/// Read-only view of the facts the launcher depends on.
pub trait Environment {
    /// Operating system name as reported by the runtime (e.g. "linux", "macos").
    fn os(&self) -> &str;

    /// CPU architecture as reported by the runtime (e.g. "x86_64", "aarch64").
    fn arch(&self) -> &str;

    /// Look up a variable. Unset and empty values both yield `None`.
    fn var(&self, key: &str) -> Option<String>;

    fn current_dir(&self) -> Option<PathBuf>;

    /// Directory the launcher itself is installed in.
    fn module_dir(&self) -> Option<PathBuf>;

    /// Run the platform's executable locator (`which` / `where`) and return its stdout.
    fn locate(&self, locator: &str, binary_name: &str) -> Option<String>;

    /// User home directory: `HOME`, then `USERPROFILE`.
    fn home_dir(&self) -> Option<PathBuf> {
        self.var("HOME")
            .or_else(|| self.var("USERPROFILE"))
            .map(PathBuf::from)
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn os(&self) -> &str {
        std::env::consts::OS
    }

    fn arch(&self) -> &str {
        std::env::consts::ARCH
    }

    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn current_dir(&self) -> Option<PathBuf> {
        std::env::current_dir().ok()
    }

    fn module_dir(&self) -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(PathBuf::from))
    }

    fn locate(&self, locator: &str, binary_name: &str) -> Option<String> {
        let output = Command::new(locator)
            .arg(binary_name)
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                trace!(locator, status = %output.status, "Locator found nothing");
                None
            }
            Err(e) => {
                trace!(locator, error = %e, "Locator could not be run");
                None
            }
        }
    }
}

/// Fixed, in-memory environment for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    os: String,
    arch: String,
    vars: HashMap<String, String>,
    current_dir: Option<PathBuf>,
    module_dir: Option<PathBuf>,
    locator_output: Option<String>,
}

impl StaticEnvironment {
    /// Create an environment reporting the given runtime OS and architecture.
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            ..Default::default()
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn with_module_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.module_dir = Some(dir.into());
        self
    }

    /// Output the locator should print, as if it found the binary.
    pub fn with_locator_output(mut self, output: impl Into<String>) -> Self {
        self.locator_output = Some(output.into());
        self
    }
}

impl Environment for StaticEnvironment {
    fn os(&self) -> &str {
        &self.os
    }

    fn arch(&self) -> &str {
        &self.arch
    }

    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn current_dir(&self) -> Option<PathBuf> {
        self.current_dir.clone()
    }

    fn module_dir(&self) -> Option<PathBuf> {
        self.module_dir.clone()
    }

    fn locate(&self, _locator: &str, _binary_name: &str) -> Option<String> {
        self.locator_output.clone()
    }
}
