//! pme-core - rewrites a Maven reactor before the build reads it
//!
//! This crate provides:
//! - A POM model over a layout-preserving XML tree
//! - Manipulators that align versions, inject management sections and
//!   enforce distribution policies, run in a fixed order
//! - The version calculator for rebuild suffixes and build numbers
//! - A script extension point and a host adapter for build tools
pub mod alignment;
pub mod config;
pub mod error;
pub mod host;
pub mod io;
pub mod manager;
pub mod manip;
pub mod pom;
pub mod script;
pub mod session;
pub mod state;
pub mod types;
pub mod utils;
pub mod version;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use config::UserProperties;
pub use host::{HostEvent, ManipulatingHost};
pub use manager::{ManipulationManager, ManipulationReport};
pub use manip::{Manipulator, ManipulatorKind, ManipulatorRegistry};
pub use pom::{Model, PomIo, Project};
pub use script::{RegisteredScriptLoader, Script, ScriptContext, ScriptLoader, ScriptStage};
pub use session::{ManipulationRequest, Session};
