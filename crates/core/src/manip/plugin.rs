use super::dependency::reactor_free;
use super::{Manipulator, ManipulatorKind};
use crate::alignment::{Aligner, Declarations, StrictPolicy, merge_versions};
use crate::error::Result;
use crate::session::Session;
use crate::state::PluginState;
use crate::types::ProjectRef;
use crate::utils::ProfileFilter;
use std::collections::BTreeSet;

/// Aligns managed and concrete plugin versions to remote POMs and
/// `pluginOverride.*`
#[derive(Debug, Default, Clone, Copy)]
pub struct PluginManipulator;

impl Manipulator for PluginManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::Plugin
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        let state = PluginState::new(session.user_properties())?;
        session.set_state(state);
        Ok(())
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<PluginState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let state = session.require_state::<PluginState>()?.clone();
        let remote = {
            let model_io = session.model_io();
            state
                .remote_boms
                .iter()
                .map(|pom| model_io.remote_plugin_versions(pom))
                .collect::<Result<Vec<_>>>()?
        };
        let versions = reactor_free(session, merge_versions(remote, &state.overrides));
        let strict = StrictPolicy::from_session(session);
        let profiles = ProfileFilter::from_session(session);

        Aligner::new(Declarations::Plugins, &versions)
            .with_strict(strict)
            .with_profiles(profiles)
            .align(session.projects_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pom::{Model, Project, base};
    use crate::session::ManipulationRequest;

    #[test]
    fn test_override_aligns_managed_plugin() {
        let model = Model::parse(
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>app</artifactId>
  <version>1</version>
  <build>
    <pluginManagement>
      <plugins>
        <plugin>
          <artifactId>maven-surefire-plugin</artifactId>
          <version>2.22.0</version>
        </plugin>
      </plugins>
    </pluginManagement>
  </build>
</project>"#,
        )
        .unwrap();
        let mut session = Session::new(
            ManipulationRequest::new("pom.xml"),
            [("pluginOverride.org.apache.maven.plugins:maven-surefire-plugin@*", "3.0.0")]
                .into_iter()
                .collect(),
        );
        session.set_projects(vec![Project::new("pom.xml", model)]);

        let manipulator = PluginManipulator;
        manipulator.init(&mut session).unwrap();
        assert!(manipulator.is_enabled(&session));
        assert_eq!(manipulator.apply_changes(&mut session).unwrap().len(), 1);

        let plugin = base::managed_plugins(session.projects()[0].model().root()).next().unwrap();
        assert_eq!(plugin.child_text("version").as_deref(), Some("3.0.0"));
    }
}
