//! End-to-end manipulation of small reactors on disk

mod common;

use common::{manipulate, read, write};
use pme::Model;
use pme::alignment::check_strict_value;
use pme::pom::base;
use tempfile::TempDir;

const REACTOR_ROOT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>org.example</groupId>
  <artifactId>root</artifactId>
  <version>1.0.0</version>
  <packaging>pom</packaging>
  <modules>
    <module>api</module>
  </modules>
</project>
"#;

const REACTOR_API: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>root</artifactId>
    <version>1.0.0</version>
  </parent>
  <artifactId>api</artifactId>
  <dependencies>
    <dependency>
      <groupId>org.lib</groupId>
      <artifactId>lib</artifactId>
      <version>2.0</version>
    </dependency>
  </dependencies>
</project>
"#;

fn reactor() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "pom.xml", REACTOR_ROOT);
    write(dir.path(), "api/pom.xml", REACTOR_API);
    dir
}

fn model(dir: &TempDir, relative: &str) -> Model {
    Model::parse(&read(dir.path(), relative)).unwrap()
}

#[test]
fn test_strict_version_alignment() {
    assert!(check_strict_value("2.6", "2.6.0.redhat-9", "redhat-5", false));
    assert!(!check_strict_value("2.6.0.redhat-5", "2.6.0.redhat-6", "redhat-5", false));
    assert!(check_strict_value("3.2.0.redhat-4", "3.2.0.redhat-6", "redhat-5", true));
    assert!(!check_strict_value("3.1.0.redhat-1", "3.2.0.redhat-1", "redhat-5", false));
}

#[test]
fn test_incremental_version_from_repository_metadata() {
    let dir = reactor();
    write(
        dir.path(),
        "repository/org/example/root/maven-metadata-local.xml",
        r#"<metadata>
  <groupId>org.example</groupId>
  <artifactId>root</artifactId>
  <versioning>
    <versions>
      <version>1.0.0.rebuild-1</version>
      <version>1.0.0.rebuild-4</version>
    </versions>
  </versioning>
</metadata>"#,
    );

    let report = manipulate(dir.path(), &[("versionIncrementalSuffix", "rebuild")])
        .unwrap()
        .unwrap();
    assert!(report.manipulators.contains(&"project-versioning".to_string()));

    assert_eq!(model(&dir, "pom.xml").explicit_version().as_deref(), Some("1.0.0.rebuild-5"));
    let api = model(&dir, "api/pom.xml");
    assert_eq!(api.parent().unwrap().version, "1.0.0.rebuild-5");
    assert_eq!(api.explicit_version(), None);
}

#[test]
fn test_dependency_alignment_from_remote_bom() {
    let dir = reactor();
    write(
        dir.path(),
        "repository/org/example/bom/1.0/bom-1.0.pom",
        r#"<project>
  <modelVersion>4.0.0</modelVersion>
  <groupId>org.example</groupId>
  <artifactId>bom</artifactId>
  <version>1.0</version>
  <packaging>pom</packaging>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.lib</groupId>
        <artifactId>lib</artifactId>
        <version>2.0.0.redhat-1</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>"#,
    );

    manipulate(dir.path(), &[("dependencyManagement", "org.example:bom:1.0")]).unwrap();

    let api = model(&dir, "api/pom.xml");
    let versions: Vec<_> = base::dependencies(api.root())
        .filter_map(|d| d.child_text("version"))
        .collect();
    assert_eq!(versions, vec!["2.0.0.redhat-1"]);
    assert_eq!(read(dir.path(), "pom.xml"), REACTOR_ROOT);
}

#[test]
fn test_skip_enforcement_detect() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "pom.xml",
        r#"<project>
  <modelVersion>4.0.0</modelVersion>
  <groupId>org.example</groupId>
  <artifactId>app</artifactId>
  <version>1.0</version>
  <build>
    <plugins>
      <plugin>
        <artifactId>maven-install-plugin</artifactId>
        <executions>
          <execution>
            <id>default-install</id>
            <configuration>
              <skip>true</skip>
            </configuration>
          </execution>
        </executions>
      </plugin>
      <plugin>
        <artifactId>maven-deploy-plugin</artifactId>
      </plugin>
    </plugins>
  </build>
</project>
"#,
    );

    let report = manipulate(dir.path(), &[("enforce-skip", "detect")]).unwrap().unwrap();
    assert!(report.projects[0].changed);

    let app = model(&dir, "pom.xml");
    let plugins: Vec<_> = base::plugins(app.root()).collect();
    assert_eq!(
        plugins[0]
            .descendant("executions/execution/configuration/skip")
            .map(|s| s.text())
            .as_deref(),
        Some("true")
    );
    assert_eq!(
        plugins[1].descendant("configuration/skip").map(|s| s.text()).as_deref(),
        Some("true")
    );
}

#[test]
fn test_parent_injection() {
    let dir = reactor();
    manipulate(dir.path(), &[("parentInjection", "org.example:parent:1.2.3")]).unwrap();

    let root = model(&dir, "pom.xml");
    let parent = root.root().child("parent").unwrap();
    assert_eq!(parent.child_text("groupId").as_deref(), Some("org.example"));
    assert_eq!(parent.child_text("artifactId").as_deref(), Some("parent"));
    assert_eq!(parent.child_text("version").as_deref(), Some("1.2.3"));
    assert_eq!(parent.child_text("relativePath").as_deref(), Some(""));

    let api = model(&dir, "api/pom.xml");
    assert_eq!(api.parent().unwrap().artifact_id, "root");
}

#[test]
fn test_sealed_side_car_conflict_is_fatal() {
    let dir = reactor();
    write(dir.path(), ".mvn/pme.json", r#"{ "sealed": { "versionSuffix": "redhat-1" } }"#);

    let error = manipulate(dir.path(), &[("versionSuffix", "redhat-2")]).unwrap_err();
    assert!(error.to_string().starts_with("POM Manipulation failed: Configuration error"));
    assert!(!dir.path().join("target/pom-manip-ext-marker.txt").exists());
}

#[test]
fn test_side_car_overridable_value_applies() {
    let dir = reactor();
    write(dir.path(), ".mvn/pme.toml", "[properties]\nversionSuffix = \"redhat-1\"\n");

    manipulate(dir.path(), &[]).unwrap();
    assert_eq!(model(&dir, "pom.xml").explicit_version().as_deref(), Some("1.0.0.redhat-1"));
    assert_eq!(model(&dir, "api/pom.xml").parent().unwrap().version, "1.0.0.redhat-1");
}
