//! Registration and ordered lookup of manipulators

use super::{
    BomBuilderManipulator, DependencyManipulator, DistributionEnforcingManipulator,
    FinalScriptManipulator, InitialScriptManipulator, JsonManipulator, Manipulator,
    ManipulatorKind, ParentInjectionManipulator, PluginManipulator,
    ProjectVersionEnforcingManipulator, ProjectVersioningManipulator, PropertyManipulator,
    RepoReportingManipulator, RepositoryInjectionManipulator, SuffixManipulator,
};
use crate::script::{RegisteredScriptLoader, ScriptLoader};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Manipulators keyed by kind, iterated by execution index
#[derive(Clone)]
pub struct ManipulatorRegistry {
    manipulators: BTreeMap<u32, Arc<dyn Manipulator>>,
}

impl std::fmt::Debug for ManipulatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManipulatorRegistry")
            .field("manipulators", &self.kinds())
            .finish()
    }
}

impl ManipulatorRegistry {
    /// Every built-in manipulator, with scripts loaded by `loader`
    pub fn new(loader: Arc<dyn ScriptLoader>) -> Self {
        let mut registry = Self::empty();

        registry.register(Arc::new(InitialScriptManipulator::new(Arc::clone(&loader))));
        registry.register(Arc::new(ProjectVersionEnforcingManipulator));
        registry.register(Arc::new(SuffixManipulator));
        registry.register(Arc::new(ProjectVersioningManipulator));
        registry.register(Arc::new(PropertyManipulator));
        registry.register(Arc::new(DependencyManipulator));
        registry.register(Arc::new(PluginManipulator));
        registry.register(Arc::new(ParentInjectionManipulator));
        registry.register(Arc::new(RepositoryInjectionManipulator));
        registry.register(Arc::new(RepoReportingManipulator));
        registry.register(Arc::new(DistributionEnforcingManipulator));
        registry.register(Arc::new(BomBuilderManipulator));
        registry.register(Arc::new(JsonManipulator));
        registry.register(Arc::new(FinalScriptManipulator::new(loader)));

        registry
    }

    pub fn empty() -> Self {
        Self {
            manipulators: BTreeMap::new(),
        }
    }

    /// Register a manipulator, replacing any other of the same kind
    pub fn register(&mut self, manipulator: Arc<dyn Manipulator>) {
        self.manipulators
            .insert(manipulator.kind().index(), manipulator);
    }

    pub fn get(&self, kind: ManipulatorKind) -> Option<Arc<dyn Manipulator>> {
        self.manipulators.get(&kind.index()).cloned()
    }

    pub fn contains(&self, kind: ManipulatorKind) -> bool {
        self.manipulators.contains_key(&kind.index())
    }

    /// Registered manipulators in execution order
    pub fn ordered(&self) -> impl Iterator<Item = &Arc<dyn Manipulator>> {
        self.manipulators.values()
    }

    pub fn kinds(&self) -> Vec<ManipulatorKind> {
        self.ordered().map(|m| m.kind()).collect()
    }
}

impl Default for ManipulatorRegistry {
    fn default() -> Self {
        Self::new(Arc::new(RegisteredScriptLoader::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_runs_in_index_order() {
        let registry = ManipulatorRegistry::default();
        assert_eq!(registry.kinds(), ManipulatorKind::ALL.to_vec());
        assert!(registry.contains(ManipulatorKind::BomBuilder));
    }

    #[test]
    fn test_register_replaces_same_kind() {
        let mut registry = ManipulatorRegistry::empty();
        registry.register(Arc::new(BomBuilderManipulator));
        registry.register(Arc::new(BomBuilderManipulator));
        assert_eq!(registry.kinds(), vec![ManipulatorKind::BomBuilder]);
        assert!(registry.get(ManipulatorKind::Dependency).is_none());
    }
}
