use super::{Manipulator, ManipulatorKind};
use crate::error::Result;
use crate::pom::base;
use crate::session::Session;
use crate::state::PropertyState;
use crate::types::ProjectRef;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Injects the properties of remote POMs. The inheritance root receives
/// every property; other projects only have existing keys overwritten.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyManipulator;

impl PropertyManipulator {
    /// Remote properties with the first listed POM winning
    fn remote_properties(session: &Session, state: &PropertyState) -> Result<BTreeMap<String, String>> {
        let model_io = session.model_io();
        let mut properties = BTreeMap::new();
        for gav in state.remote_poms.iter().rev() {
            debug!("Loading remote properties from {}", gav);
            properties.extend(model_io.remote_properties(gav)?);
        }
        Ok(properties)
    }
}

impl Manipulator for PropertyManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::Property
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        let state = PropertyState::new(session.user_properties())?;
        session.set_state(state);
        Ok(())
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<PropertyState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let state = session.require_state::<PropertyState>()?.clone();
        let overrides = Self::remote_properties(session, &state)?;
        let mut changed = BTreeSet::new();
        if overrides.is_empty() {
            return Ok(changed);
        }

        for project in session.projects_mut().iter_mut() {
            let key = project.key();
            let mut touched = false;
            if project.is_inheritance_root() {
                info!("Applying property changes to {} with {:?}", key, overrides);
                for (name, value) in &overrides {
                    touched |= project.model_mut().set_property(name, value);
                }
            } else {
                for (name, value) in &overrides {
                    if base::replace_property(project.model_mut().root_mut(), name, value) {
                        info!("Overwriting property {} in {} with value {}", name, key, value);
                        touched = true;
                    }
                }
            }
            if touched {
                changed.insert(key);
            }
        }
        Ok(changed)
    }
}
