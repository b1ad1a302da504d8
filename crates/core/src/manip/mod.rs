//! Manipulators: one rewriter per concern, run in execution-index order
//! over the whole reactor

mod bom;
mod dependency;
mod distribution;
mod json;
mod parent;
mod plugin;
mod project_version;
mod property;
mod registry;
mod repo_reporting;
mod repository;
mod script;
mod suffix;
mod versioning;

pub use bom::{BOM_ARTIFACT, BOM_FILE, BomBuilderManipulator};
pub use dependency::DependencyManipulator;
pub use distribution::DistributionEnforcingManipulator;
pub use json::JsonManipulator;
pub use parent::ParentInjectionManipulator;
pub use plugin::PluginManipulator;
pub use project_version::ProjectVersionEnforcingManipulator;
pub use property::PropertyManipulator;
pub use registry::ManipulatorRegistry;
pub use repo_reporting::RepoReportingManipulator;
pub use repository::RepositoryInjectionManipulator;
pub use script::{FinalScriptManipulator, InitialScriptManipulator};
pub use suffix::SuffixManipulator;
pub use versioning::ProjectVersioningManipulator;

use crate::error::Result;
use crate::session::Session;
use crate::types::ProjectRef;
use std::collections::BTreeSet;
use std::fmt;

/// Every manipulator the engine knows, with its fixed execution index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ManipulatorKind {
    InitialScript,
    ProjectVersionEnforcing,
    SuffixStrip,
    ProjectVersioning,
    Property,
    Dependency,
    Plugin,
    ParentInjection,
    RepositoryInjection,
    RepoReportingRemoval,
    DistributionEnforcing,
    BomBuilder,
    JsonUpdate,
    FinalScript,
}

impl ManipulatorKind {
    pub const ALL: [Self; 14] = [
        Self::InitialScript,
        Self::ProjectVersionEnforcing,
        Self::SuffixStrip,
        Self::ProjectVersioning,
        Self::Property,
        Self::Dependency,
        Self::Plugin,
        Self::ParentInjection,
        Self::RepositoryInjection,
        Self::RepoReportingRemoval,
        Self::DistributionEnforcing,
        Self::BomBuilder,
        Self::JsonUpdate,
        Self::FinalScript,
    ];

    /// Lower runs first. Gaps leave room for manipulators added later.
    pub const fn index(self) -> u32 {
        match self {
            Self::InitialScript => 1,
            Self::ProjectVersionEnforcing => 3,
            Self::SuffixStrip => 5,
            Self::ProjectVersioning => 10,
            Self::Property => 30,
            Self::Dependency => 40,
            Self::Plugin => 50,
            Self::ParentInjection => 62,
            Self::RepositoryInjection => 65,
            Self::RepoReportingRemoval => 70,
            Self::DistributionEnforcing => 75,
            Self::BomBuilder => 80,
            Self::JsonUpdate => 85,
            Self::FinalScript => 99,
        }
    }

    /// Active without any user property
    pub const fn default_on(self) -> bool {
        matches!(self, Self::ProjectVersionEnforcing)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::InitialScript => "initial-script",
            Self::ProjectVersionEnforcing => "project-version-enforcing",
            Self::SuffixStrip => "suffix-strip",
            Self::ProjectVersioning => "project-versioning",
            Self::Property => "property",
            Self::Dependency => "dependency",
            Self::Plugin => "plugin",
            Self::ParentInjection => "parent-injection",
            Self::RepositoryInjection => "repository-injection",
            Self::RepoReportingRemoval => "repo-reporting-removal",
            Self::DistributionEnforcing => "distribution-enforcing",
            Self::BomBuilder => "bom-builder",
            Self::JsonUpdate => "json-update",
            Self::FinalScript => "final-script",
        }
    }
}

impl fmt::Display for ManipulatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One rewriter. Configuration lives in the session as a
/// [`State`](crate::state::State) built by `init`.
pub trait Manipulator: Send + Sync {
    fn kind(&self) -> ManipulatorKind;

    /// Build the state from the user properties and register it
    fn init(&self, session: &mut Session) -> Result<()>;

    /// Whether the registered state asks for any change
    fn is_enabled(&self, session: &Session) -> bool;

    /// Rewrite the reactor, returning the projects that changed
    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_unique_and_ordered() {
        let indices: Vec<u32> = ManipulatorKind::ALL.iter().map(|k| k.index()).collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(indices, sorted);
    }

    #[test]
    fn test_only_project_version_enforcing_defaults_on() {
        let defaults: Vec<_> = ManipulatorKind::ALL
            .into_iter()
            .filter(|k| k.default_on())
            .collect();
        assert_eq!(defaults, vec![ManipulatorKind::ProjectVersionEnforcing]);
    }
}
