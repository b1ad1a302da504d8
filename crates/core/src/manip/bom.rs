use super::{Manipulator, ManipulatorKind};
use crate::error::{Error, Result};
use crate::pom::{Dependency, Model, base};
use crate::session::Session;
use crate::state::BomState;
use crate::types::ProjectRef;
use crate::utils::resolve_inherited;
use std::collections::BTreeSet;
use std::fs;
use tracing::info;

/// Written below the execution root
pub const BOM_FILE: &str = "target/pme-bom.xml";
pub const BOM_ARTIFACT: &str = "pme-bom";

const SKELETON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 http://maven.apache.org/xsd/maven-4.0.0.xsd">
  <modelVersion>4.0.0</modelVersion>
  <groupId></groupId>
  <artifactId></artifactId>
  <version></version>
  <packaging>pom</packaging>
  <dependencyManagement>
    <dependencies>
    </dependencies>
  </dependencyManagement>
</project>
"#;

/// Writes a BOM managing every reactor project plus the literal managed
/// dependencies of the inheritance root. Projects themselves are unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct BomBuilderManipulator;

impl BomBuilderManipulator {
    fn managed(session: &Session) -> Vec<Dependency> {
        let projects = session.projects();
        let mut managed: Vec<Dependency> = projects
            .iter()
            .enumerate()
            .map(|(index, project)| Dependency {
                group_id: project.group_id(),
                artifact_id: project.artifact_id(),
                version: Some(resolve_inherited(projects, index, &project.version())),
                kind: (project.model().packaging() == "pom").then(|| "pom".to_string()),
                scope: None,
            })
            .collect();

        if let Some(root) = session.inheritance_root() {
            for element in base::managed_dependencies(root.model().root()) {
                let Some(dependency) = Dependency::from_element(element) else {
                    continue;
                };
                let literal = dependency.version.as_deref().is_some_and(|v| !v.contains("${"));
                if literal && !managed.iter().any(|m| m.key() == dependency.key()) {
                    managed.push(dependency);
                }
            }
        }
        managed
    }
}

impl Manipulator for BomBuilderManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::BomBuilder
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        let state = BomState::new(session.user_properties())?;
        session.set_state(state);
        Ok(())
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<BomState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let projects = session.projects();
        let index = projects
            .iter()
            .position(|p| p.is_inheritance_root())
            .ok_or_else(|| Error::Manipulation("No inheritance root to build a BOM for".to_string()))?;
        let group = projects[index].group_id();
        let version = resolve_inherited(projects, index, &projects[index].version());

        let mut bom = Model::parse(SKELETON)?;
        bom.root_mut().set_child_text("groupId", group);
        bom.root_mut().set_child_text("artifactId", BOM_ARTIFACT);
        bom.set_version(&version);
        if let Some(list) = bom.root_mut().descendant_mut("dependencyManagement/dependencies") {
            for dependency in Self::managed(session) {
                list.append_child(dependency.to_element());
            }
        }

        let path = session.root_dir().join(BOM_FILE);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bom.to_xml_string()?)?;
        info!("Wrote BOM {} to {}", BOM_ARTIFACT, path.display());

        Ok(BTreeSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pom::PomIo;
    use crate::session::ManipulationRequest;
    use crate::test_support::{pom, write_file};
    use tempfile::TempDir;

    #[test]
    fn test_writes_bom_for_reactor() {
        let dir = TempDir::new().unwrap();
        let root_pom = write_file(
            dir.path(),
            "pom.xml",
            &pom(
                "org.example",
                "root",
                "1.0",
                r#"  <packaging>pom</packaging>
  <modules>
    <module>lib</module>
  </modules>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.lib</groupId>
        <artifactId>core</artifactId>
        <version>2.0</version>
      </dependency>
      <dependency>
        <groupId>org.lib</groupId>
        <artifactId>other</artifactId>
        <version>${other.version}</version>
      </dependency>
    </dependencies>
  </dependencyManagement>"#,
            ),
        );
        write_file(dir.path(), "lib/pom.xml", &pom("org.example", "lib", "1.0", ""));

        let mut session = Session::new(
            ManipulationRequest::new(&root_pom),
            [("bomBuilder", "true")].into_iter().collect(),
        );
        session.set_projects(PomIo::new().parse_project(&root_pom).unwrap());

        let manipulator = BomBuilderManipulator;
        manipulator.init(&mut session).unwrap();
        assert!(manipulator.apply_changes(&mut session).unwrap().is_empty());

        let written = fs::read_to_string(dir.path().join(BOM_FILE)).unwrap();
        let bom = Model::parse(&written).unwrap();
        assert_eq!(bom.group_id().as_deref(), Some("org.example"));
        assert_eq!(bom.artifact_id().as_deref(), Some("pme-bom"));
        assert_eq!(bom.version().as_deref(), Some("1.0"));
        assert_eq!(bom.packaging(), "pom");

        let managed: Vec<String> = base::managed_dependencies(bom.root())
            .filter_map(|d| Dependency::from_element(d))
            .map(|d| format!("{}:{}", d.key(), d.kind.unwrap_or_default()))
            .collect();
        assert_eq!(managed, vec!["org.example:root:pom", "org.example:lib:", "org.lib:core:"]);
    }
}
