use super::base;
use crate::error::{Error, Result};
use crate::types::ProjectVersionRef;
use crate::xml::{Document, Element};

/// Group id assumed for plugins that declare none
pub const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// The `<parent>` declaration of a POM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub relative_path: Option<String>,
}

impl ParentRef {
    pub fn from_gav(gav: &ProjectVersionRef, relative_path: Option<&str>) -> Self {
        Self {
            group_id: gav.group_id.clone(),
            artifact_id: gav.artifact_id.clone(),
            version: gav.version.clone(),
            relative_path: relative_path.map(str::to_string),
        }
    }

    pub fn as_gav(&self) -> ProjectVersionRef {
        ProjectVersionRef::new(&self.group_id, &self.artifact_id, &self.version)
    }

    fn to_element(&self) -> Element {
        let mut element = Element::new("parent")
            .with_child(Element::with_text("groupId", &self.group_id))
            .with_child(Element::with_text("artifactId", &self.artifact_id))
            .with_child(Element::with_text("version", &self.version));
        if let Some(path) = &self.relative_path {
            // An empty relativePath disables the filesystem lookup of the parent
            element = element.with_child(if path.is_empty() {
                Element::new("relativePath")
            } else {
                Element::with_text("relativePath", path)
            });
        }
        element
    }
}

/// A POM document. All reads and writes go to the one XML tree, so any
/// mutation is immediately visible to later readers.
#[derive(Debug, Clone)]
pub struct Model {
    document: Document,
}

impl Model {
    pub fn parse(source: &str) -> Result<Self> {
        Self::from_document(Document::parse(source)?)
    }

    pub fn from_document(document: Document) -> Result<Self> {
        if document.root.name != "project" {
            return Err(Error::Model(format!(
                "Expected <project> root element, found <{}>",
                document.root.name
            )));
        }
        Ok(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn to_xml_string(&self) -> Result<String> {
        self.document.to_xml_string()
    }

    /// The `<project>` element, i.e. the main model base
    pub fn root(&self) -> &Element {
        &self.document.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.document.root
    }

    pub fn group_id(&self) -> Option<String> {
        self.root()
            .child_text("groupId")
            .or_else(|| self.parent().map(|p| p.group_id))
    }

    pub fn artifact_id(&self) -> Option<String> {
        self.root().child_text("artifactId")
    }

    /// Declared or inherited version, unresolved
    pub fn version(&self) -> Option<String> {
        self.explicit_version()
            .or_else(|| self.parent().map(|p| p.version))
    }

    pub fn explicit_version(&self) -> Option<String> {
        self.root().child_text("version")
    }

    /// Set the project version; a project inheriting its version gets an
    /// explicit `<version>` after its `<artifactId>`
    pub fn set_version(&mut self, version: &str) {
        let root = self.root_mut();
        match root.child_mut("version") {
            Some(element) => element.set_text(version),
            None => root.insert_child_after("artifactId", Element::with_text("version", version)),
        }
    }

    pub fn packaging(&self) -> String {
        self.root()
            .child_text("packaging")
            .unwrap_or_else(|| "jar".to_string())
    }

    pub fn parent(&self) -> Option<ParentRef> {
        let parent = self.root().child("parent")?;
        Some(ParentRef {
            group_id: parent.child_text("groupId").unwrap_or_default(),
            artifact_id: parent.child_text("artifactId").unwrap_or_default(),
            version: parent.child_text("version").unwrap_or_default(),
            relative_path: parent.child_text("relativePath"),
        })
    }

    /// Replace or insert the `<parent>` declaration
    pub fn set_parent(&mut self, parent: &ParentRef) {
        let root = self.root_mut();
        let element = parent.to_element();
        if let Some(existing) = root.child_mut("parent") {
            *existing = element;
            return;
        }
        root.insert_child_after("modelVersion", element);
    }

    pub fn set_parent_version(&mut self, version: &str) -> bool {
        match self.root_mut().child_mut("parent") {
            Some(parent) => {
                parent.set_child_text("version", version);
                true
            }
            None => false,
        }
    }

    /// Modules of the main model followed by those declared in profiles
    pub fn modules(&self) -> Vec<String> {
        let mut modules: Vec<String> = Vec::new();
        let bases = std::iter::once(self.root()).chain(self.profiles());
        for base in bases {
            if let Some(list) = base.child("modules") {
                for module in list.children_named("module") {
                    let name = module.text();
                    if !name.is_empty() && !modules.contains(&name) {
                        modules.push(name);
                    }
                }
            }
        }
        modules
    }

    pub fn profiles(&self) -> impl Iterator<Item = &Element> {
        self.root()
            .child("profiles")
            .into_iter()
            .flat_map(|profiles| profiles.children_named("profile"))
    }

    pub fn profiles_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.root_mut()
            .child_mut("profiles")
            .into_iter()
            .flat_map(|profiles| profiles.children_named_mut("profile"))
    }

    pub fn property(&self, key: &str) -> Option<String> {
        base::property(self.root(), key)
    }

    pub fn properties(&self) -> Vec<(String, String)> {
        base::properties(self.root())
    }

    pub fn set_property(&mut self, key: &str, value: &str) -> bool {
        base::set_property(self.root_mut(), key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHILD: &str = r#"<project>
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>root</artifactId>
    <version>1.0</version>
  </parent>
  <artifactId>child</artifactId>
  <packaging>pom</packaging>
  <modules>
    <module>a</module>
  </modules>
  <profiles>
    <profile>
      <id>extra</id>
      <modules>
        <module>b</module>
        <module>a</module>
      </modules>
    </profile>
  </profiles>
</project>"#;

    #[test]
    fn test_inherited_coordinates() {
        let model = Model::parse(CHILD).unwrap();
        assert_eq!(model.group_id().as_deref(), Some("org.example"));
        assert_eq!(model.artifact_id().as_deref(), Some("child"));
        assert_eq!(model.version().as_deref(), Some("1.0"));
        assert_eq!(model.explicit_version(), None);
        assert_eq!(model.packaging(), "pom");
    }

    #[test]
    fn test_modules_include_profiles_once() {
        let model = Model::parse(CHILD).unwrap();
        assert_eq!(model.modules(), vec!["a", "b"]);
    }

    #[test]
    fn test_set_version_inserts_after_artifact_id() {
        let mut model = Model::parse(CHILD).unwrap();
        model.set_version("2.0");
        let xml = model.to_xml_string().unwrap();
        assert!(xml.contains("<artifactId>child</artifactId>\n  <version>2.0</version>"));
        assert_eq!(model.version().as_deref(), Some("2.0"));
    }

    #[test]
    fn test_set_parent_replaces_existing() {
        let mut model = Model::parse(CHILD).unwrap();
        model.set_parent(&ParentRef::from_gav(
            &ProjectVersionRef::new("org.other", "base", "3"),
            Some(""),
        ));
        let parent = model.parent().unwrap();
        assert_eq!(parent.group_id, "org.other");
        assert_eq!(parent.relative_path.as_deref(), Some(""));
        assert_eq!(model.root().children_named("parent").count(), 1);
    }

    #[test]
    fn test_rejects_non_project_root() {
        assert!(matches!(Model::parse("<settings/>"), Err(Error::Model(_))));
    }
}
