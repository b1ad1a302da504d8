use super::{Manipulator, ManipulatorKind};
use crate::error::Result;
use crate::pom::{Project, base};
use crate::session::Session;
use crate::state::VersioningState;
use crate::types::ProjectRef;
use crate::utils::{ProfileFilter, property_owner, property_reference, resolve_inherited};
use crate::version::VersionCalculator;
use crate::xml::Element;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Applies the versions computed by [`VersionCalculator`] to the reactor:
/// project versions, parent references and dependencies or plugins on
/// reactor projects
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectVersioningManipulator;

/// `(old, new)` resolved version per reactor project
type VersionChanges = BTreeMap<ProjectRef, (String, String)>;

impl ProjectVersioningManipulator {
    fn changes(session: &Session, state: &VersioningState) -> Result<VersionChanges> {
        let reader = session.metadata_reader();
        let calculator = VersionCalculator::new(reader.as_ref());
        let projects = session.projects();
        let new_versions = calculator.calculate_versioning_changes(projects, state)?;

        let mut changes = VersionChanges::new();
        for (index, project) in projects.iter().enumerate() {
            let key = project.key();
            let old = resolve_inherited(projects, index, &project.version());
            if let Some(new) = new_versions.get(&key) {
                if *new != old {
                    changes.insert(key, (old, new.clone()));
                }
            }
        }
        Ok(changes)
    }

    /// Property updates for `${prop}` project versions, and for `${prop}`
    /// versions of reactor dependencies
    fn property_updates(projects: &[Project], changes: &VersionChanges) -> Vec<(usize, String, String)> {
        let mut updates: Vec<(usize, String, String)> = Vec::new();
        let mut plan = |index: usize, raw: &str, new: &str| {
            let Some(property) = property_reference(raw) else {
                return;
            };
            match property_owner(projects, index, property) {
                Some(owner) => {
                    if !updates.iter().any(|(o, p, _)| *o == owner && p == property) {
                        updates.push((owner, property.to_string(), new.to_string()));
                    }
                }
                None => warn!(
                    "Unable to find property {} in the lineage of {}",
                    property,
                    projects[index].key()
                ),
            }
        };

        for (index, project) in projects.iter().enumerate() {
            if let (Some(raw), Some((_, new))) =
                (project.model().explicit_version(), changes.get(&project.key()))
            {
                plan(index, &raw, new);
            }

            let model = project.model();
            for model_base in std::iter::once(model.root()).chain(model.profiles()) {
                for dependency in base::dependencies(model_base).chain(base::managed_dependencies(model_base)) {
                    let (Some(key), Some(raw)) = (base::dependency_key(dependency), dependency.child_text("version"))
                    else {
                        continue;
                    };
                    let Some((old, new)) = changes.get(&key) else {
                        continue;
                    };
                    if raw.contains("${project.version}") {
                        continue;
                    }
                    if resolve_inherited(projects, index, &raw) == *old {
                        plan(index, &raw, new);
                    }
                }
            }
        }
        updates
    }
}

/// Move a declaration still at a reactor project's old version to its new one
fn realign(key: Option<ProjectRef>, element: &mut Element, changes: &VersionChanges) -> bool {
    let (Some(key), Some(current)) = (key, element.child_text("version")) else {
        return false;
    };
    match changes.get(&key) {
        Some((old, new)) if current == *old => {
            element.set_child_text("version", new);
            true
        }
        _ => false,
    }
}

impl Manipulator for ProjectVersioningManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::ProjectVersioning
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        let state = VersioningState::new(session.user_properties())?;
        session.set_state(state);
        Ok(())
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<VersioningState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let state = session.require_state::<VersioningState>()?.clone();
        let changes = Self::changes(session, &state)?;
        let mut changed = BTreeSet::new();
        if changes.is_empty() {
            return Ok(changed);
        }
        let updates = Self::property_updates(session.projects(), &changes);
        let profiles = ProfileFilter::all();

        for project in session.projects_mut().iter_mut() {
            let key = project.key();
            let mut touched = false;

            if let Some((old, new)) = changes.get(&key) {
                if let Some(raw) = project.model().explicit_version() {
                    if property_reference(&raw).is_none() {
                        info!("Updating version of {} from {} to {}", key, old, new);
                        project.model_mut().set_version(new);
                        touched = true;
                    }
                }
            }

            if let Some(parent) = project.model().parent() {
                if let Some((old, new)) = changes.get(&parent.as_gav().as_project_ref()) {
                    if parent.version == *old {
                        info!("Updating parent {} of {} to {}", parent.artifact_id, key, new);
                        touched |= project.model_mut().set_parent_version(new);
                    }
                }
            }

            touched |= profiles.for_each_base_mut(project.model_mut(), |model_base| {
                let mut touched = false;
                for dependency in base::all_dependencies_mut(model_base) {
                    touched |= realign(base::dependency_key(dependency), dependency, &changes);
                }
                for plugin in base::all_plugins_mut(model_base) {
                    touched |= realign(base::plugin_key(plugin), plugin, &changes);
                }
                Ok(touched)
            })?;

            if touched {
                changed.insert(project.key());
            }
        }

        let projects = session.projects_mut();
        for (owner, property, value) in updates {
            let project = &mut projects[owner];
            if project.model_mut().set_property(&property, &value) {
                info!("Updating property {} to {} in {}", property, value, project.key());
                changed.insert(project.key());
            }
        }
        Ok(changed)
    }
}
