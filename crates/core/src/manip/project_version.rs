use super::{Manipulator, ManipulatorKind};
use crate::error::Result;
use crate::pom::base;
use crate::session::Session;
use crate::state::ProjectVersionEnforcingState;
use crate::types::ProjectRef;
use crate::utils::{ProfileFilter, resolve_inherited};
use std::collections::BTreeSet;
use tracing::info;

const PROJECT_VERSION: &str = "${project.version}";

/// Replaces `${project.version}` in dependency versions with the project's
/// resolved version
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectVersionEnforcingManipulator;

impl Manipulator for ProjectVersionEnforcingManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::ProjectVersionEnforcing
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        let state = ProjectVersionEnforcingState::new(session.user_properties())?;
        session.set_state(state);
        Ok(())
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<ProjectVersionEnforcingState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let profiles = ProfileFilter::all();
        let versions: Vec<String> = {
            let projects = session.projects();
            (0..projects.len())
                .map(|i| resolve_inherited(projects, i, &projects[i].version()))
                .collect()
        };

        let mut changed = BTreeSet::new();
        for (project, version) in session.projects_mut().iter_mut().zip(versions) {
            let key = project.key();
            let touched = profiles.for_each_base_mut(project.model_mut(), |model_base| {
                let mut touched = false;
                for dependency in base::all_dependencies_mut(model_base) {
                    let Some(current) = dependency.child_text("version") else {
                        continue;
                    };
                    if !current.contains(PROJECT_VERSION) {
                        continue;
                    }
                    let replaced = current.replace(PROJECT_VERSION, &version);
                    let dependency_key = base::dependency_key(dependency)
                        .map(|k| k.to_string())
                        .unwrap_or_default();
                    info!("Replacing {} with {} for {} in {}", current, replaced, dependency_key, key);
                    dependency.set_child_text("version", replaced);
                    touched = true;
                }
                Ok(touched)
            })?;
            if touched {
                changed.insert(key);
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

    fn session(props: &[(&str, &str)]) -> Session {
        let model = Model::parse(
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>app</artifactId>
  <version>${revision}</version>
  <properties>
    <revision>2.1</revision>
  </properties>
  <dependencies>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>api</artifactId>
      <version>${project.version}</version>
    </dependency>
  </dependencies>
  <profiles>
    <profile>
      <id>extra</id>
      <dependencyManagement>
        <dependencies>
          <dependency>
            <groupId>org.example</groupId>
            <artifactId>impl</artifactId>
            <version>${project.version}</version>
          </dependency>
        </dependencies>
      </dependencyManagement>
    </profile>
  </profiles>
</project>"#,
        )
        .unwrap();
        let mut session = Session::new(
            ManipulationRequest::new("pom.xml"),
            props.iter().copied().collect(),
        );
        session.set_projects(vec![Project::new("pom.xml", model)]);
        session
    }

    #[test]
    fn test_replaces_in_main_model_and_profiles() {
        let mut session = session(&[]);
        let manipulator = ProjectVersionEnforcingManipulator;
        manipulator.init(&mut session).unwrap();
        assert!(manipulator.is_enabled(&session));
        assert_eq!(manipulator.apply_changes(&mut session).unwrap().len(), 1);

        let model = session.projects()[0].model();
        let main = base::dependencies(model.root()).next().unwrap();
        assert_eq!(main.child_text("version").as_deref(), Some("2.1"));
        let profile = model.profiles().next().unwrap();
        let managed = base::managed_dependencies(profile).next().unwrap();
        assert_eq!(managed.child_text("version").as_deref(), Some("2.1"));
    }

    #[test]
    fn test_can_be_disabled() {
        let mut session = session(&[("enforceProjectVersion", "false")]);
        let manipulator = ProjectVersionEnforcingManipulator;
        manipulator.init(&mut session).unwrap();
        assert!(!manipulator.is_enabled(&session));
    }
}
