//! Candidate sources for the engine binary.
//!
//! Each source is a plain function that either yields a probed, usable path or
//! nothing. [`SOURCES`] lists them in precedence order and [`search`] stops at
//! the first hit, so later sources are never touched once an earlier one matches.

use crate::binary::platform::{Arch, Os, Platform};
use crate::binary::probe::is_executable;
use crate::env::Environment;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Variable naming the engine binary or the directory that contains it.
pub const BINARY_PATH_ENV: &str = "TOOLBOX_PATH";

/// Per-user directory searched under the home directory.
pub const HOME_DIR_NAME: &str = ".mcp-database";

/// Directory name used for bundled and conventional binary layouts.
pub const BINARIES_DIR: &str = "binaries";

/// Caller-supplied resolution input.
#[derive(Debug, Clone, Default)]
pub struct ResolutionOptions {
    /// Explicit override: the binary itself or a directory containing it.
    pub binary_path: Option<PathBuf>,
}

impl ResolutionOptions {
    pub fn with_binary_path(path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: Some(path.into()),
        }
    }
}

/// Everything a source needs to produce its candidate.
pub struct SearchContext<'a> {
    pub env: &'a dyn Environment,
    pub platform: Platform,
    pub options: &'a ResolutionOptions,
}

/// A single candidate-producing source.
pub type Source = fn(&SearchContext<'_>) -> Option<PathBuf>;

/// All sources in precedence order.
pub const SOURCES: &[(&str, Source)] = &[
    ("explicit override", explicit_override),
    ("environment override", environment_override),
    ("platform package", platform_package),
    ("bundled binaries", bundled_binaries),
    ("conventional paths", conventional_paths),
    ("system path", system_path),
];

/// Evaluate sources in order, returning the first match and the name of its source.
pub fn search(ctx: &SearchContext<'_>) -> Option<(&'static str, PathBuf)> {
    SOURCES.iter().find_map(|(name, source)| {
        trace!(source = name, "Trying binary source");
        source(ctx).map(|path| (*name, path))
    })
}

/// Installable package name for a platform, if one is published.
pub fn platform_package_name(platform: &Platform) -> Option<&'static str> {
    match (platform.os, platform.arch) {
        (Os::Darwin, Arch::Arm64) => Some("@adversity/mcp-database-darwin-arm64"),
        (Os::Darwin, Arch::X64) => Some("@adversity/mcp-database-darwin-x64"),
        (Os::Linux, Arch::X64) => Some("@adversity/mcp-database-linux-x64"),
        (Os::Win32, Arch::X64) => Some("@adversity/mcp-database-win32-x64"),
        _ => None,
    }
}

/// Accept `path` as the binary itself, or as a directory holding `binary_name`.
fn file_or_dir(path: &Path, binary_name: &str) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        return None;
    }
    if is_executable(path) {
        return Some(path.to_path_buf());
    }
    let in_dir = path.join(binary_name);
    is_executable(&in_dir).then_some(in_dir)
}

fn first_executable(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|path| {
        let hit = is_executable(path);
        trace!(path = %path.display(), hit, "Probed candidate");
        hit
    })
}

pub fn explicit_override(ctx: &SearchContext<'_>) -> Option<PathBuf> {
    let path = ctx.options.binary_path.as_deref()?;
    file_or_dir(path, ctx.platform.binary_name)
}

pub fn environment_override(ctx: &SearchContext<'_>) -> Option<PathBuf> {
    let value = ctx.env.var(BINARY_PATH_ENV)?;
    file_or_dir(Path::new(&value), ctx.platform.binary_name)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    binary_path: Option<String>,
}

/// Locate `node_modules/<name>` walking up from the module and working directories.
fn find_package_root(env: &dyn Environment, name: &str) -> Option<PathBuf> {
    [env.module_dir(), env.current_dir()]
        .into_iter()
        .flatten()
        .find_map(|start| {
            start.ancestors().find_map(|dir| {
                let root = dir.join("node_modules").join(name);
                root.join("package.json").is_file().then_some(root)
            })
        })
}

/// Binary path a package declares in its manifest.
///
/// Falls back to the `binaries/<os>-<arch>/<binaryName>` layout when the manifest
/// does not name one.
fn declared_binary_path(root: &Path, platform: &Platform) -> Option<PathBuf> {
    let text = fs::read_to_string(root.join("package.json")).ok()?;
    let manifest: PackageManifest = match serde_json::from_str(&text) {
        Ok(manifest) => manifest,
        Err(e) => {
            debug!(package = %root.display(), error = %e, "Ignoring malformed package manifest");
            return None;
        }
    };

    Some(match manifest.binary_path {
        Some(declared) => root.join(declared),
        None => root
            .join(BINARIES_DIR)
            .join(platform.dir_name())
            .join(platform.binary_name),
    })
}

pub fn platform_package(ctx: &SearchContext<'_>) -> Option<PathBuf> {
    let name = platform_package_name(&ctx.platform)?;
    let root = find_package_root(ctx.env, name)?;
    let declared = declared_binary_path(&root, &ctx.platform)?;
    is_executable(&declared).then_some(declared)
}

/// `binaries/<os>-<arch>/<binaryName>` one and two levels above the module dir.
pub fn bundled_candidates(env: &dyn Environment, platform: &Platform) -> Vec<PathBuf> {
    let Some(module_dir) = env.module_dir() else {
        return Vec::new();
    };
    [module_dir.join(".."), module_dir.join("..").join("..")]
        .into_iter()
        .map(|base| {
            base.join(BINARIES_DIR)
                .join(platform.dir_name())
                .join(platform.binary_name)
        })
        .collect()
}

pub fn bundled_binaries(ctx: &SearchContext<'_>) -> Option<PathBuf> {
    first_executable(bundled_candidates(ctx.env, &ctx.platform))
}

/// Working-directory, legacy module-relative and home-directory conventions, in order.
pub fn conventional_candidates(env: &dyn Environment, binary_name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(cwd) = env.current_dir() {
        paths.push(cwd.join(BINARIES_DIR).join(binary_name));
        paths.push(cwd.join(binary_name));
    }

    if let Some(module_dir) = env.module_dir() {
        paths.push(module_dir.join("..").join(BINARIES_DIR).join(binary_name));
        paths.push(
            module_dir
                .join("..")
                .join("..")
                .join(BINARIES_DIR)
                .join(binary_name),
        );
    }

    if let Some(home) = env.home_dir() {
        let base = home.join(HOME_DIR_NAME);
        paths.push(base.join(BINARIES_DIR).join(binary_name));
        paths.push(base.join(binary_name));
    }

    paths
}

pub fn conventional_paths(ctx: &SearchContext<'_>) -> Option<PathBuf> {
    first_executable(conventional_candidates(ctx.env, ctx.platform.binary_name))
}

/// Ask `which`/`where`; only the first reported line is considered, and it must
/// still pass the probe.
pub fn system_path(ctx: &SearchContext<'_>) -> Option<PathBuf> {
    let output = ctx
        .env
        .locate(ctx.platform.os.locator(), ctx.platform.binary_name)?;
    let first = output.trim().lines().next()?.trim();
    if first.is_empty() {
        return None;
    }
    let path = PathBuf::from(first);
    is_executable(&path).then_some(path)
}
