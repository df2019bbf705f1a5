//! Binary resolution.
//!
//! [`BinaryResolver`] ties platform identification and the ordered source search
//! together, and renders installation guidance when nothing is found.

use crate::binary::platform::Platform;
use crate::binary::search::{
    self, BINARIES_DIR, BINARY_PATH_ENV, HOME_DIR_NAME, ResolutionOptions, SearchContext,
};
use crate::env::{Environment, SystemEnvironment};
use crate::error::{LauncherError, LauncherResult};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Engine release advertised in download instructions.
pub const DEFAULT_ENGINE_VERSION: &str = "0.21.0";

/// Bucket hosting engine release binaries.
pub const DOWNLOAD_BASE_URL: &str = "https://storage.googleapis.com/genai-toolbox/";

/// Package bundling binaries for every platform.
pub const FULL_PACKAGE_NAME: &str = "@adversity/mcp-database-full";

/// Locates the engine binary for the current host.
#[derive(Debug, Clone)]
pub struct BinaryResolver<E = SystemEnvironment> {
    env: E,
    engine_version: String,
}

impl Default for BinaryResolver<SystemEnvironment> {
    fn default() -> Self {
        Self::new(SystemEnvironment)
    }
}

impl<E: Environment> BinaryResolver<E> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            engine_version: DEFAULT_ENGINE_VERSION.to_string(),
        }
    }

    /// Advertise a different engine release in download instructions.
    pub fn with_engine_version(mut self, version: impl Into<String>) -> Self {
        self.engine_version = version.into();
        self
    }

    pub fn engine_version(&self) -> &str {
        &self.engine_version
    }

    pub fn platform(&self) -> LauncherResult<Platform> {
        Platform::detect(&self.env)
    }

    /// Search every source in precedence order.
    ///
    /// Returns `Ok(None)` when no source matches. Only platform identification can
    /// fail; probing errors simply mean a source did not match.
    pub fn find_binary(&self, options: &ResolutionOptions) -> LauncherResult<Option<PathBuf>> {
        let platform = self.platform()?;
        let ctx = SearchContext {
            env: &self.env,
            platform,
            options,
        };

        match search::search(&ctx) {
            Some((source, path)) => {
                debug!(source, path = %path.display(), "Resolved engine binary");
                Ok(Some(path))
            }
            None => {
                debug!(platform = %platform.dir_name(), "No engine binary found");
                Ok(None)
            }
        }
    }

    /// Resolve the binary, treating `dir` as an explicit override.
    pub fn get_binary_path(&self, dir: Option<&Path>) -> LauncherResult<PathBuf> {
        let options = ResolutionOptions {
            binary_path: dir.map(Path::to_path_buf),
        };
        self.resolve(&options)
    }

    /// Resolve the binary or fail with installation guidance.
    ///
    /// Single attempt; the search itself is synchronous.
    pub async fn ensure_binary(&self, options: &ResolutionOptions) -> LauncherResult<PathBuf> {
        self.resolve(options)
    }

    fn resolve(&self, options: &ResolutionOptions) -> LauncherResult<PathBuf> {
        match self.find_binary(options)? {
            Some(path) => Ok(path),
            None => Err(LauncherError::binary_not_found(
                self.download_instructions()?,
            )),
        }
    }

    /// Release download URL for the current platform.
    pub fn download_url(&self) -> LauncherResult<Url> {
        let platform = self.platform()?;
        download_url(&platform, &self.engine_version)
    }

    /// Multi-option installation guide for the current platform.
    pub fn download_instructions(&self) -> LauncherResult<String> {
        let platform = self.platform()?;
        let url = download_url(&platform, &self.engine_version)?;
        Ok(not_found_message(&platform, &url))
    }
}

/// `https://storage.googleapis.com/genai-toolbox/v<version>/<os>/<arch>/<binaryName>`
pub fn download_url(platform: &Platform, version: &str) -> LauncherResult<Url> {
    let base = Url::parse(DOWNLOAD_BASE_URL)
        .map_err(|e| LauncherError::internal(format!("Invalid download base URL: {}", e)))?;
    let relative = format!(
        "v{}/{}/{}/{}",
        version.trim_start_matches('v'),
        platform.os.download_segment(),
        platform.arch.download_segment(),
        platform.binary_name
    );
    base.join(&relative)
        .map_err(|e| LauncherError::internal(format!("Invalid download URL: {}", e)))
}

fn not_found_message(platform: &Platform, url: &Url) -> String {
    let binary = platform.binary_name;
    let package_step = match search::platform_package_name(platform) {
        Some(package) => format!("  npm install {}", package),
        None => format!(
            "  (no platform package is published for {})",
            platform.dir_name()
        ),
    };

    format!(
        r#"
genai-toolbox binary not found!

Option 1: Install platform-specific package (recommended for npm users)
{package_step}

Option 2: Install full package with all platform binaries
  npm install {full}

Option 3: Manual installation
  a. Set environment variable:
     export {env}=/path/to/{binary}

  b. Or place in current directory:
     ./{bins}/{binary}

  c. Or place in home directory:
     ~/{home}/{bins}/{binary}

  d. Or add to system PATH

Download URL (for external network access):
{url}

Or use Homebrew (if available):
brew install mcp-toolbox
"#,
        full = FULL_PACKAGE_NAME,
        env = BINARY_PATH_ENV,
        bins = BINARIES_DIR,
        home = HOME_DIR_NAME,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::platform::{Arch, Os};
    use crate::env::StaticEnvironment;

    #[test]
    fn test_download_url_shape() {
        let url = download_url(&Platform::new(Os::Win32, Arch::X64), "0.21.0").unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/genai-toolbox/v0.21.0/windows/amd64/toolbox.exe"
        );

        let url = download_url(&Platform::new(Os::Darwin, Arch::Arm64), "v1.0.0").unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/genai-toolbox/v1.0.0/darwin/arm64/toolbox"
        );
    }

    #[test]
    fn test_message_names_platform_package() {
        let platform = Platform::new(Os::Linux, Arch::X64);
        let url = download_url(&platform, DEFAULT_ENGINE_VERSION).unwrap();
        let msg = not_found_message(&platform, &url);
        assert!(msg.contains("npm install @adversity/mcp-database-linux-x64"));
        assert!(msg.contains("npm install @adversity/mcp-database-full"));
        assert!(msg.contains("export TOOLBOX_PATH=/path/to/toolbox"));
        assert!(msg.contains("./binaries/toolbox"));
        assert!(msg.contains("~/.mcp-database/binaries/toolbox"));
        assert!(msg.contains("v0.21.0/linux/amd64/toolbox"));
    }

    #[test]
    fn test_message_without_platform_package() {
        let platform = Platform::new(Os::Linux, Arch::Arm64);
        let url = download_url(&platform, DEFAULT_ENGINE_VERSION).unwrap();
        let msg = not_found_message(&platform, &url);
        assert!(msg.contains("no platform package is published for linux-arm64"));
        assert!(msg.contains("/linux/arm64/toolbox"));
    }

    #[test]
    fn test_engine_version_override() {
        let resolver = BinaryResolver::new(StaticEnvironment::new("linux", "x86_64"))
            .with_engine_version("0.30.1");
        assert_eq!(resolver.engine_version(), "0.30.1");
        assert!(
            resolver
                .download_url()
                .unwrap()
                .as_str()
                .ends_with("/v0.30.1/linux/amd64/toolbox")
        );
    }

    #[test]
    fn test_find_binary_propagates_platform_error() {
        let resolver = BinaryResolver::new(StaticEnvironment::new("plan9", "x86_64"));
        let err = resolver
            .find_binary(&ResolutionOptions::default())
            .unwrap_err();
        assert!(matches!(err, LauncherError::UnsupportedPlatform { .. }));
    }
}
