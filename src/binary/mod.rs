//! Engine binary resolution and verification.
//!
//! - `platform`: host OS/architecture identification
//! - `probe`: non-empty regular file check
//! - `search`: ordered candidate sources
//! - `resolver`: search orchestration and installation guidance
//! - `verify`: `--version` self-check

pub mod platform;
pub mod probe;
pub mod resolver;
pub mod search;
pub mod verify;

pub use platform::{Arch, Os, Platform, binary_name};
pub use probe::is_executable;
pub use resolver::{BinaryResolver, DEFAULT_ENGINE_VERSION};
pub use search::{BINARY_PATH_ENV, ResolutionOptions};
pub use verify::{VerificationOutcome, probe_version, verify_binary};
