//! Extension point for user scripts
//!
//! A [`Script`] runs at the FIRST or LAST stage of the manipulation with a
//! [`ScriptContext`] over the session. Scripts are looked up through a
//! [`ScriptLoader`]; [`RegisteredScriptLoader`] serves scripts compiled into
//! the host process.

mod context;
mod loader;

pub use context::ScriptContext;
pub use loader::{RegisteredScriptLoader, ScriptLoader};

use std::fmt;

/// When a script is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptStage {
    /// Before any other manipulator
    First,
    /// After every other manipulator
    Last,
}

impl fmt::Display for ScriptStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScriptStage::First => "FIRST",
            ScriptStage::Last => "LAST",
        })
    }
}

/// A user-authored manipulation
pub trait Script: Send + Sync {
    fn name(&self) -> &str;

    /// Stages this script wants to run in; empty means every stage
    fn stages(&self) -> &[ScriptStage] {
        &[]
    }

    fn run(&self, context: &mut ScriptContext<'_>) -> anyhow::Result<()>;

    fn runs_in(&self, stage: ScriptStage) -> bool {
        let stages = self.stages();
        stages.is_empty() || stages.contains(&stage)
    }
}
