use super::{Manipulator, ManipulatorKind};
use crate::error::Result;
use crate::session::Session;
use crate::state::SuffixState;
use crate::types::ProjectRef;
use std::collections::BTreeSet;
use tracing::info;

/// Strips a version suffix matching `versionSuffixStrip` from project and
/// parent versions
#[derive(Debug, Default, Clone, Copy)]
pub struct SuffixManipulator;

impl Manipulator for SuffixManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::SuffixStrip
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        let state = SuffixState::new(session.user_properties())?;
        session.set_state(state);
        Ok(())
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<SuffixState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let state = session.require_state::<SuffixState>()?.clone();
        let mut changed = BTreeSet::new();

        for project in session.projects_mut().iter_mut() {
            let key = project.key();
            let mut touched = false;

            if let Some(parent) = project.model().parent() {
                if let Some(stripped) = state.strip(&parent.version) {
                    info!("Stripping parent version {} to {} in {}", parent.version, stripped, key);
                    touched |= project.model_mut().set_parent_version(&stripped);
                }
            }
            if let Some(version) = project.model().explicit_version() {
                if let Some(stripped) = state.strip(&version) {
                    info!("Stripping version {} to {} in {}", version, stripped, key);
                    project.model_mut().set_version(&stripped);
                    touched = true;
                }
            }

            if touched {
                changed.insert(project.key());
            }
        }
        Ok(changed)
    }
}
