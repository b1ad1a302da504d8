//! Accessors over a *model base*: the `<project>` element itself or one of
//! its `<profile>` elements. Both carry the same dependency, plugin,
//! property and repository sections.

use super::model::DEFAULT_PLUGIN_GROUP;
use crate::types::{ProjectRef, ProjectVersionRef};
use crate::xml::Element;

/// A read-only view of a `<dependency>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub kind: Option<String>,
    pub scope: Option<String>,
}

impl Dependency {
    pub fn from_element(element: &Element) -> Option<Self> {
        Some(Self {
            group_id: non_empty(element.child_text("groupId"))?,
            artifact_id: non_empty(element.child_text("artifactId"))?,
            version: non_empty(element.child_text("version")),
            kind: non_empty(element.child_text("type")),
            scope: non_empty(element.child_text("scope")),
        })
    }

    pub fn key(&self) -> ProjectRef {
        ProjectRef::new(&self.group_id, &self.artifact_id)
    }

    pub fn to_element(&self) -> Element {
        let mut element = Element::new("dependency")
            .with_child(Element::with_text("groupId", &self.group_id))
            .with_child(Element::with_text("artifactId", &self.artifact_id));
        if let Some(version) = &self.version {
            element = element.with_child(Element::with_text("version", version));
        }
        if let Some(kind) = &self.kind {
            element = element.with_child(Element::with_text("type", kind));
        }
        if let Some(scope) = &self.scope {
            element = element.with_child(Element::with_text("scope", scope));
        }
        element
    }

    pub fn from_gav(gav: &ProjectVersionRef) -> Self {
        Self {
            group_id: gav.group_id.clone(),
            artifact_id: gav.artifact_id.clone(),
            version: Some(gav.version.clone()),
            kind: None,
            scope: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub fn property(base: &Element, key: &str) -> Option<String> {
    base.child("properties")?.child_text(key)
}

/// Properties in document order
pub fn properties(base: &Element) -> Vec<(String, String)> {
    base.child("properties")
        .map(|properties| {
            properties
                .elements()
                .map(|p| (p.name.clone(), p.text()))
                .collect()
        })
        .unwrap_or_default()
}

/// Set a property, creating the `<properties>` section when needed.
/// Returns true when the stored value changed.
pub fn set_property(base: &mut Element, key: &str, value: &str) -> bool {
    if property(base, key).as_deref() == Some(value) {
        return false;
    }
    base.get_or_create_child("properties").set_child_text(key, value);
    true
}

/// Overwrite a property only when it is already declared
pub fn replace_property(base: &mut Element, key: &str, value: &str) -> bool {
    match property(base, key) {
        Some(current) if current != value => set_property(base, key, value),
        _ => false,
    }
}

/// `g:a` of a dependency or plugin element. Plugins default their group.
pub fn dependency_key(element: &Element) -> Option<ProjectRef> {
    Some(ProjectRef::new(
        non_empty(element.child_text("groupId"))?,
        non_empty(element.child_text("artifactId"))?,
    ))
}

pub fn plugin_key(element: &Element) -> Option<ProjectRef> {
    let group = non_empty(element.child_text("groupId"))
        .unwrap_or_else(|| DEFAULT_PLUGIN_GROUP.to_string());
    Some(ProjectRef::new(
        group,
        non_empty(element.child_text("artifactId"))?,
    ))
}

pub fn dependencies(base: &Element) -> impl Iterator<Item = &Element> {
    base.child("dependencies")
        .into_iter()
        .flat_map(|deps| deps.children_named("dependency"))
}

pub fn managed_dependencies(base: &Element) -> impl Iterator<Item = &Element> {
    base.descendant("dependencyManagement/dependencies")
        .into_iter()
        .flat_map(|deps| deps.children_named("dependency"))
}

/// Concrete and managed dependencies of one base, for in-place edits
pub fn all_dependencies_mut(base: &mut Element) -> Vec<&mut Element> {
    let mut found = Vec::new();
    for section in base.elements_mut() {
        if section.name == "dependencies" {
            found.extend(section.children_named_mut("dependency"));
        } else if section.name == "dependencyManagement" {
            if let Some(deps) = section.child_mut("dependencies") {
                found.extend(deps.children_named_mut("dependency"));
            }
        }
    }
    found
}

pub fn plugins(base: &Element) -> impl Iterator<Item = &Element> {
    base.descendant("build/plugins")
        .into_iter()
        .flat_map(|plugins| plugins.children_named("plugin"))
}

pub fn managed_plugins(base: &Element) -> impl Iterator<Item = &Element> {
    base.descendant("build/pluginManagement/plugins")
        .into_iter()
        .flat_map(|plugins| plugins.children_named("plugin"))
}

/// Managed plugins followed by concrete plugins
pub fn all_plugins_mut(base: &mut Element) -> Vec<&mut Element> {
    let mut managed = Vec::new();
    let mut concrete = Vec::new();
    if let Some(build) = base.child_mut("build") {
        for section in build.elements_mut() {
            if section.name == "plugins" {
                concrete.extend(section.children_named_mut("plugin"));
            } else if section.name == "pluginManagement" {
                if let Some(plugins) = section.child_mut("plugins") {
                    managed.extend(plugins.children_named_mut("plugin"));
                }
            }
        }
    }
    managed.extend(concrete);
    managed
}

/// Managed and concrete declarations of the plugin `key`, managed first
pub fn plugins_by_key_mut<'a>(base: &'a mut Element, key: &ProjectRef) -> Vec<&'a mut Element> {
    all_plugins_mut(base)
        .into_iter()
        .filter(|plugin| plugin_key(plugin).as_ref() == Some(key))
        .collect()
}

/// Where a `<skip>` flag was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipContainer {
    /// The plugin-wide `<configuration>`
    Plugin,
    /// The `<configuration>` of the execution with this id
    Execution(String),
}

/// A `<skip>` node together with the configuration that holds it
#[derive(Debug)]
pub struct SkipReference<'a> {
    pub container: SkipContainer,
    pub node: &'a mut Element,
}

/// Skip flags of one plugin declaration: plugin-wide first, then executions
pub fn plugin_skip_references_mut(plugin: &mut Element) -> Vec<SkipReference<'_>> {
    let mut found = Vec::new();
    let mut in_executions = Vec::new();
    for section in plugin.elements_mut() {
        if section.name == "configuration" {
            found.extend(section.children_named_mut("skip").map(|node| SkipReference {
                container: SkipContainer::Plugin,
                node,
            }));
        } else if section.name == "executions" {
            for execution in section.children_named_mut("execution") {
                let id = execution
                    .child_text("id")
                    .unwrap_or_else(|| "default".to_string());
                if let Some(configuration) = execution.child_mut("configuration") {
                    in_executions.extend(configuration.children_named_mut("skip").map(|node| {
                        SkipReference {
                            container: SkipContainer::Execution(id.clone()),
                            node,
                        }
                    }));
                }
            }
        }
    }
    // document order of <configuration> and <executions> does not matter
    found.append(&mut in_executions);
    found
}

/// Skip flags of every managed and concrete declaration of the plugin
pub fn skip_references_mut<'a>(base: &'a mut Element, key: &ProjectRef) -> Vec<SkipReference<'a>> {
    plugins_by_key_mut(base, key)
        .into_iter()
        .flat_map(plugin_skip_references_mut)
        .collect()
}

/// `(section, entry)` element names of the two repository kinds
pub const REPOSITORY_SECTIONS: [(&str, &str); 2] = [
    ("repositories", "repository"),
    ("pluginRepositories", "pluginRepository"),
];

pub fn repositories<'a>(
    base: &'a Element,
    section: &'a str,
    entry: &'a str,
) -> impl Iterator<Item = &'a Element> + 'a {
    base.child(section)
        .into_iter()
        .flat_map(move |repos| repos.children_named(entry))
}

/// Add a repository, replacing any existing entry with the same id.
/// Returns true when the section changed.
pub fn put_repository(base: &mut Element, section: &str, entry: &str, repository: &Element) -> bool {
    let id = repository.child_text("id");
    let list = base.get_or_create_child(section);
    let existing = list
        .children_named(entry)
        .find(|r| r.child_text("id") == id)
        .cloned();
    if existing.as_ref().is_some_and(|e| same_content(e, repository)) {
        return false;
    }
    if existing.is_some() {
        list.remove_elements_where(|r| r.name == entry && r.child_text("id") == id);
    }
    list.append_child(strip_layout(repository));
    true
}

/// Compare two elements ignoring whitespace-only text
fn same_content(a: &Element, b: &Element) -> bool {
    strip_layout(a) == strip_layout(b)
}

/// Copy of `element` without whitespace-only text nodes, ready to be
/// re-indented at its new location
pub fn strip_layout(element: &Element) -> Element {
    use crate::xml::XmlNode;
    let mut copy = Element::new(element.name.clone());
    copy.attributes = element.attributes.clone();
    for node in &element.children {
        match node {
            XmlNode::Text(text) if text.trim().is_empty() && element.elements().next().is_some() => {}
            XmlNode::Element(child) => copy.children.push(XmlNode::Element(strip_layout(child))),
            other => copy.children.push(other.clone()),
        }
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pom::Model;

    const POM: &str = r#"<project>
  <modelVersion>4.0.0</modelVersion>
  <groupId>org.example</groupId>
  <artifactId>app</artifactId>
  <version>1.0</version>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.lib</groupId>
        <artifactId>managed</artifactId>
        <version>2.0</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
  <dependencies>
    <dependency>
      <groupId>org.lib</groupId>
      <artifactId>concrete</artifactId>
    </dependency>
  </dependencies>
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
    </plugins>
    <pluginManagement>
      <plugins>
        <plugin>
          <groupId>org.apache.maven.plugins</groupId>
          <artifactId>maven-install-plugin</artifactId>
          <configuration>
            <skip>false</skip>
          </configuration>
        </plugin>
      </plugins>
    </pluginManagement>
  </build>
  <repositories>
    <repository>
      <id>central</id>
      <url>https://repo.example.org</url>
    </repository>
  </repositories>
</project>"#;

    #[test]
    fn test_dependency_views() {
        let model = Model::parse(POM).unwrap();
        let managed: Vec<_> = managed_dependencies(model.root())
            .filter_map(Dependency::from_element)
            .collect();
        assert_eq!(managed.len(), 1);
        assert_eq!(managed[0].version.as_deref(), Some("2.0"));

        let concrete: Vec<_> = dependencies(model.root())
            .filter_map(Dependency::from_element)
            .collect();
        assert_eq!(concrete[0].version, None);
    }

    #[test]
    fn test_skip_references_list_managed_first() {
        let mut model = Model::parse(POM).unwrap();
        let key = ProjectRef::new(DEFAULT_PLUGIN_GROUP, "maven-install-plugin");
        let refs = skip_references_mut(model.root_mut(), &key);
        let found: Vec<_> = refs
            .iter()
            .map(|r| (r.container.clone(), r.node.text()))
            .collect();
        assert_eq!(
            found,
            vec![
                (SkipContainer::Plugin, "false".to_string()),
                (
                    SkipContainer::Execution("default-install".to_string()),
                    "true".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_put_repository_replaces_same_id() {
        let mut model = Model::parse(POM).unwrap();
        let replacement = Element::new("repository")
            .with_child(Element::with_text("id", "central"))
            .with_child(Element::with_text("url", "https://mirror.example.org"));

        assert!(put_repository(model.root_mut(), "repositories", "repository", &replacement));
        assert!(!put_repository(model.root_mut(), "repositories", "repository", &replacement));

        let urls: Vec<_> = repositories(model.root(), "repositories", "repository")
            .filter_map(|r| r.child_text("url"))
            .collect();
        assert_eq!(urls, vec!["https://mirror.example.org"]);
    }

    #[test]
    fn test_set_property_creates_section() {
        let mut model = Model::parse(POM).unwrap();
        assert!(set_property(model.root_mut(), "foo", "bar"));
        assert!(!set_property(model.root_mut(), "foo", "bar"));
        assert!(!replace_property(model.root_mut(), "missing", "x"));
        assert_eq!(property(model.root(), "foo").as_deref(), Some("bar"));
    }
}
