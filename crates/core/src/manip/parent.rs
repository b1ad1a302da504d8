use super::{Manipulator, ManipulatorKind};
use crate::error::Result;
use crate::pom::ParentRef;
use crate::session::Session;
use crate::state::ParentInjectionState;
use crate::types::ProjectRef;
use std::collections::BTreeSet;
use tracing::info;

/// Gives the inheritance root a `<parent>` with an empty `relativePath`
#[derive(Debug, Default, Clone, Copy)]
pub struct ParentInjectionManipulator;

impl Manipulator for ParentInjectionManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::ParentInjection
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        let state = ParentInjectionState::new(session.user_properties())?;
        session.set_state(state);
        Ok(())
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<ParentInjectionState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let state = session.require_state::<ParentInjectionState>()?;
        let mut changed = BTreeSet::new();
        let Some(gav) = state.parent.clone() else {
            return Ok(changed);
        };
        let parent = ParentRef::from_gav(&gav, Some(""));

        if let Some(root) = session.projects_mut().iter_mut().find(|p| p.is_inheritance_root()) {
            if root.model().parent().as_ref() != Some(&parent) {
                info!("Injecting parent {} into {}", gav, root.key());
                root.model_mut().set_parent(&parent);
                changed.insert(root.key());
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pom::{Model, Project};
    use crate::session::ManipulationRequest;

    #[test]
    fn test_injects_parent_once() {
        let model = Model::parse(
            "<project>\n  <modelVersion>4.0.0</modelVersion>\n  <groupId>org.example</groupId>\n  <artifactId>app</artifactId>\n  <version>1</version>\n</project>",
        )
        .unwrap();
        let mut project = Project::new("pom.xml", model);
        project.set_inheritance_root(true);

        let mut session = Session::new(
            ManipulationRequest::new("pom.xml"),
            [("parentInjection", "org.parent:parent:7")].into_iter().collect(),
        );
        session.set_projects(vec![project]);

        let manipulator = ParentInjectionManipulator;
        manipulator.init(&mut session).unwrap();
        assert_eq!(manipulator.apply_changes(&mut session).unwrap().len(), 1);

        let parent = session.projects()[0].model().parent().unwrap();
        assert_eq!(parent.as_gav().to_string(), "org.parent:parent:7");
        assert_eq!(parent.relative_path.as_deref(), Some(""));

        assert!(manipulator.apply_changes(&mut session).unwrap().is_empty());
    }
}
