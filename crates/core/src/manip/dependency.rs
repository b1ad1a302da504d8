use super::{Manipulator, ManipulatorKind};
use crate::alignment::{Aligner, Declarations, StrictPolicy, merge_versions};
use crate::error::Result;
use crate::session::Session;
use crate::state::DependencyState;
use crate::types::{ProjectRef, WildcardMap};
use crate::utils::ProfileFilter;
use std::collections::BTreeSet;
use tracing::debug;

/// Aligns dependency versions to remote BOMs and `dependencyOverride.*`
#[derive(Debug, Default, Clone, Copy)]
pub struct DependencyManipulator;

/// Remote and overriding versions, minus the reactor's own projects
pub(super) fn reactor_free(session: &Session, mut versions: WildcardMap<String>) -> WildcardMap<String> {
    for project in session.projects() {
        if versions.remove(&project.key()).is_some() {
            debug!("Not aligning reactor project {}", project.key());
        }
    }
    versions
}

impl Manipulator for DependencyManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::Dependency
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        let state = DependencyState::new(session.user_properties())?;
        session.set_state(state);
        Ok(())
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<DependencyState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let state = session.require_state::<DependencyState>()?.clone();
        let remote = {
            let model_io = session.model_io();
            state
                .remote_boms
                .iter()
                .map(|bom| model_io.remote_dependency_versions(bom))
                .collect::<Result<Vec<_>>>()?
        };
        let versions = reactor_free(session, merge_versions(remote, &state.overrides));
        let strict = StrictPolicy::from_session(session);
        let profiles = ProfileFilter::from_session(session);

        Aligner::new(Declarations::Dependencies, &versions)
            .with_strict(strict)
            .with_profiles(profiles)
            .align(session.projects_mut())
    }
}
