//! Umbrella package for the integration tests in `tests/`
pub use pme_core::*;
