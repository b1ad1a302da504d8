use super::Model;
use crate::types::{ProjectRef, ProjectVersionRef};
use std::path::{Path, PathBuf};

/// One project of the reactor. Coordinates are always read from the live
/// model, so they reflect every manipulation applied so far.
#[derive(Debug, Clone)]
pub struct Project {
    pom: PathBuf,
    model: Model,
    original: ProjectVersionRef,
    inheritance_root: bool,
    reactor_parent: Option<ProjectRef>,
}

impl Project {
    pub fn new(pom: impl Into<PathBuf>, model: Model) -> Self {
        let mut project = Self {
            pom: pom.into(),
            model,
            original: ProjectVersionRef::new("", "", ""),
            inheritance_root: false,
            reactor_parent: None,
        };
        project.original = project.gav();
        project
    }

    pub fn pom(&self) -> &Path {
        &self.pom
    }

    /// Directory holding the POM
    pub fn base_dir(&self) -> PathBuf {
        match self.pom.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn group_id(&self) -> String {
        self.model.group_id().unwrap_or_default()
    }

    pub fn artifact_id(&self) -> String {
        self.model.artifact_id().unwrap_or_default()
    }

    /// Declared or inherited version; may still contain `${...}` references
    pub fn version(&self) -> String {
        self.model.version().unwrap_or_default()
    }

    pub fn key(&self) -> ProjectRef {
        ProjectRef::new(self.group_id(), self.artifact_id())
    }

    pub fn gav(&self) -> ProjectVersionRef {
        ProjectVersionRef::new(self.group_id(), self.artifact_id(), self.version())
    }

    /// Coordinates as loaded from disk
    pub fn original_gav(&self) -> &ProjectVersionRef {
        &self.original
    }

    pub fn is_inheritance_root(&self) -> bool {
        self.inheritance_root
    }

    pub(crate) fn set_inheritance_root(&mut self, root: bool) {
        self.inheritance_root = root;
    }

    /// `g:a` of the parent when the parent is part of the reactor
    pub fn reactor_parent(&self) -> Option<&ProjectRef> {
        self.reactor_parent.as_ref()
    }

    pub(crate) fn set_reactor_parent(&mut self, parent: Option<ProjectRef>) {
        self.reactor_parent = parent;
    }
}
