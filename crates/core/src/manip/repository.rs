use super::{Manipulator, ManipulatorKind};
use crate::error::Result;
use crate::pom::{Project, base};
use crate::session::Session;
use crate::state::RepositoryInjectionState;
use crate::types::ProjectRef;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Copies the repositories and plugin repositories of a remote POM into
/// the target projects, replacing entries with the same id
#[derive(Debug, Default, Clone, Copy)]
pub struct RepositoryInjectionManipulator;

fn is_target(state: &RepositoryInjectionState, project: &Project) -> bool {
    if state.targets.is_empty() {
        return project.is_inheritance_root();
    }
    let key = project.key();
    let matched = state.targets.iter().any(|target| target.matches(&key));
    debug!("Checking project {} against {:?}: {}", key, state.targets, matched);
    matched
}

impl Manipulator for RepositoryInjectionManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::RepositoryInjection
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        let state = RepositoryInjectionState::new(session.user_properties())?;
        session.set_state(state);
        Ok(())
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<RepositoryInjectionState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let state = session.require_state::<RepositoryInjectionState>()?.clone();
        let mut changed = BTreeSet::new();
        let Some(gav) = &state.remote_pom else {
            return Ok(changed);
        };
        let repositories = session.model_io().remote_repositories(gav)?;

        for project in session.projects_mut().iter_mut() {
            if !is_target(&state, project) {
                continue;
            }
            let key = project.key();
            info!("Applying repositories from {} to {}", gav, key);
            let mut touched = false;
            for (section, entry, repository) in &repositories {
                touched |= base::put_repository(project.model_mut().root_mut(), section, entry, repository);
            }
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
    use crate::pom::Model;
    use crate::session::ManipulationRequest;
    use crate::test_support::{pom, write_file};
    use tempfile::TempDir;

    const REMOTE: &str = r#"  <repositories>
    <repository>
      <id>central</id>
      <url>https://mirror.example.org/maven2</url>
    </repository>
  </repositories>
  <pluginRepositories>
    <pluginRepository>
      <id>plugins</id>
      <url>https://plugins.example.org</url>
    </pluginRepository>
  </pluginRepositories>"#;

    #[test]
    fn test_replaces_same_id_and_adds_new() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "repo/org/remote/repos/1/repos-1.pom", &pom("org.remote", "repos", "1", REMOTE));

        let model = Model::parse(
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>app</artifactId>
  <version>1</version>
  <repositories>
    <repository>
      <id>central</id>
      <url>https://repo.example.org</url>
    </repository>
  </repositories>
</project>"#,
        )
        .unwrap();
        let mut project = Project::new(dir.path().join("pom.xml"), model);
        project.set_inheritance_root(true);

        let request = ManipulationRequest::new(dir.path().join("pom.xml"))
            .with_local_repository(dir.path().join("repo"))
            .with_remote_repositories(Vec::new());
        let mut session = Session::new(
            request,
            [("repositoryInjection", "org.remote:repos:1")].into_iter().collect(),
        );
        session.set_projects(vec![project]);

        let manipulator = RepositoryInjectionManipulator;
        manipulator.init(&mut session).unwrap();
        assert_eq!(manipulator.apply_changes(&mut session).unwrap().len(), 1);

        let root = session.projects()[0].model().root();
        let repositories: Vec<_> = base::repositories(root, "repositories", "repository").collect();
        assert_eq!(repositories.len(), 1);
        assert_eq!(
            repositories[0].child_text("url").as_deref(),
            Some("https://mirror.example.org/maven2")
        );
        assert_eq!(base::repositories(root, "pluginRepositories", "pluginRepository").count(), 1);

        assert!(manipulator.apply_changes(&mut session).unwrap().is_empty());
    }

    #[test]
    fn test_wildcard_targets() {
        let state = RepositoryInjectionState {
            remote_pom: None,
            targets: vec![ProjectRef::new("org.example", "*")],
        };
        let model = Model::parse(
            "<project><groupId>org.example</groupId><artifactId>lib</artifactId><version>1</version></project>",
        )
        .unwrap();
        assert!(is_target(&state, &Project::new("pom.xml", model)));
    }
}
