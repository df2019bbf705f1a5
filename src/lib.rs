//! MCP Database Launcher Library
//!
//! This library locates, verifies and launches the genai-toolbox engine that
//! serves database tools over MCP, and decides which transport it exposes.

pub mod binary;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod transport;

pub use binary::{BinaryResolver, ResolutionOptions};
pub use config::Config;
pub use error::{LauncherError, LauncherResult};
pub use transport::{TransportDecision, TransportMode, select_transport};
