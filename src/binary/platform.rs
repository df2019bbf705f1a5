//! Platform identification.
//!
//! Maps the runtime OS and CPU architecture onto the fixed set of targets the
//! engine is published for. Anything outside that set is rejected.

use crate::env::Environment;
use crate::error::{LauncherError, LauncherResult};
use serde::Serialize;
use std::fmt;

/// Engine binary name on Unix-like systems.
pub const BINARY_NAME: &str = "toolbox";
/// Engine binary name on Windows.
pub const BINARY_NAME_WINDOWS: &str = "toolbox.exe";

/// Supported operating systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Darwin,
    Win32,
}

impl Os {
    /// Parse a runtime OS name. Accepts both Rust (`macos`, `windows`) and
    /// Node-style (`darwin`, `win32`) spellings.
    pub fn from_runtime(name: &str) -> Option<Self> {
        match name {
            "linux" => Some(Self::Linux),
            "macos" | "darwin" => Some(Self::Darwin),
            "windows" | "win32" => Some(Self::Win32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Win32 => "win32",
        }
    }

    /// OS segment used by the download bucket.
    pub fn download_segment(&self) -> &'static str {
        match self {
            Self::Win32 => "windows",
            other => other.as_str(),
        }
    }

    /// Locator used to search the system path.
    pub fn locator(&self) -> &'static str {
        match self {
            Self::Win32 => "where",
            _ => "which",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported CPU architectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X64,
    Arm64,
}

impl Arch {
    /// Parse a runtime architecture name (`x86_64`/`x64`, `aarch64`/`arm64`).
    pub fn from_runtime(name: &str) -> Option<Self> {
        match name {
            "x86_64" | "x64" => Some(Self::X64),
            "aarch64" | "arm64" => Some(Self::Arm64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
        }
    }

    /// Architecture segment used by the download bucket.
    pub fn download_segment(&self) -> &'static str {
        match self {
            Self::X64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized description of the host the engine must run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
    pub binary_name: &'static str,
}

impl Platform {
    pub fn new(os: Os, arch: Arch) -> Self {
        let binary_name = match os {
            Os::Win32 => BINARY_NAME_WINDOWS,
            Os::Linux | Os::Darwin => BINARY_NAME,
        };
        Self {
            os,
            arch,
            binary_name,
        }
    }

    /// Identify the platform from the environment.
    ///
    /// The OS is checked before the architecture so the error names the first
    /// unsupported dimension.
    pub fn detect(env: &dyn Environment) -> LauncherResult<Self> {
        let os = Os::from_runtime(env.os())
            .ok_or_else(|| LauncherError::unsupported_platform(env.os()))?;
        let arch = Arch::from_runtime(env.arch())
            .ok_or_else(|| LauncherError::unsupported_architecture(env.arch()))?;
        Ok(Self::new(os, arch))
    }

    /// `<os>-<arch>` directory name, e.g. `darwin-arm64`.
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.os, self.arch)
    }
}

/// Expected engine binary name for the current environment.
pub fn binary_name(env: &dyn Environment) -> LauncherResult<&'static str> {
    Platform::detect(env).map(|p| p.binary_name)
}
