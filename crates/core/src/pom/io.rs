use super::{Model, Project};
use crate::error::{Error, Result};
use crate::types::ProjectRef;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Idempotence marker, relative to the execution-root directory
pub const MARKER_FILE: &str = "target/pom-manip-ext-marker.txt";

/// Reads and writes POM files
#[derive(Debug, Clone, Copy, Default)]
pub struct PomIo;

impl PomIo {
    pub fn new() -> Self {
        Self
    }

    pub fn read_model(&self, pom: &Path) -> Result<Model> {
        let source = fs::read_to_string(pom).map_err(|e| {
            Error::Model(format!("Unable to read POM {}: {e}", pom.display()))
        })?;
        Model::parse(&source)
            .map_err(|e| Error::Model(format!("Unable to parse POM {}: {e}", pom.display())))
    }

    pub fn write_model(&self, pom: &Path, model: &Model) -> Result<()> {
        if let Some(dir) = pom.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(pom, model.to_xml_string()?)?;
        debug!("Wrote {}", pom.display());
        Ok(())
    }

    /// Load the reactor rooted at `root_pom`. Modules (including profile
    /// modules) are followed recursively in discovery order. The first
    /// project is the execution root and the inheritance root.
    pub fn parse_project(&self, root_pom: &Path) -> Result<Vec<Project>> {
        let mut projects = Vec::new();
        let mut visited = HashSet::new();
        self.collect(root_pom, &mut projects, &mut visited)?;

        let keys: HashSet<ProjectRef> = projects.iter().map(Project::key).collect();
        for project in &mut projects {
            let parent = project
                .model()
                .parent()
                .map(|p| ProjectRef::new(p.group_id, p.artifact_id))
                .filter(|p| keys.contains(p));
            project.set_reactor_parent(parent);
        }
        if let Some(root) = projects.first_mut() {
            root.set_inheritance_root(true);
        }

        info!("Loaded {} project(s) from {}", projects.len(), root_pom.display());
        Ok(projects)
    }

    fn collect(
        &self,
        pom: &Path,
        projects: &mut Vec<Project>,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let canonical = pom.canonicalize().unwrap_or_else(|_| pom.to_path_buf());
        if !visited.insert(canonical) {
            return Ok(());
        }

        let model = self.read_model(pom)?;
        let modules = model.modules();
        let project = Project::new(pom, model);
        if project.group_id().is_empty() || project.artifact_id().is_empty() {
            return Err(Error::Model(format!(
                "POM {} does not declare its coordinates",
                pom.display()
            )));
        }
        let base_dir = project.base_dir();
        projects.push(project);

        for module in modules {
            let mut path = base_dir.join(&module);
            if path.is_dir() || !module.ends_with(".xml") {
                path = path.join("pom.xml");
            }
            self.collect(&path, projects, visited)?;
        }
        Ok(())
    }

    /// Write back every project whose key is in `changed`
    pub fn write_projects(&self, projects: &[Project], changed: &BTreeSet<ProjectRef>) -> Result<()> {
        for project in projects.iter().filter(|p| changed.contains(&p.key())) {
            self.write_model(project.pom(), project.model())?;
        }
        Ok(())
    }
}
