use super::ScriptStage;
use crate::config::UserProperties;
use crate::io::{FileIo, ModelIo};
use crate::pom::{PomIo, Project};
use crate::session::Session;
use crate::types::ProjectVersionRef;
use crate::utils::resolve_inherited;
use std::path::PathBuf;

/// What a running script can see and change
pub struct ScriptContext<'a> {
    session: &'a mut Session,
    stage: ScriptStage,
    pom_io: PomIo,
}

impl<'a> ScriptContext<'a> {
    pub fn new(session: &'a mut Session, stage: ScriptStage) -> Self {
        Self {
            session,
            stage,
            pom_io: PomIo::new(),
        }
    }

    pub fn stage(&self) -> ScriptStage {
        self.stage
    }

    pub fn projects(&self) -> &[Project] {
        self.session.projects()
    }

    pub fn projects_mut(&mut self) -> &mut Vec<Project> {
        self.session.projects_mut()
    }

    /// Index of the execution root: the inheritance root, else the first project
    fn current_index(&self) -> Option<usize> {
        let projects = self.session.projects();
        if projects.is_empty() {
            return None;
        }
        Some(projects.iter().position(Project::is_inheritance_root).unwrap_or(0))
    }

    /// The execution root project
    pub fn project(&self) -> Option<&Project> {
        self.current_index().map(|index| &self.session.projects()[index])
    }

    pub fn project_mut(&mut self) -> Option<&mut Project> {
        let index = self.current_index()?;
        self.session.projects_mut().get_mut(index)
    }

    /// GAV of the execution root with its version resolved
    pub fn gav(&self) -> Option<ProjectVersionRef> {
        let index = self.current_index()?;
        let projects = self.session.projects();
        let project = &projects[index];
        Some(ProjectVersionRef::new(
            project.group_id(),
            project.artifact_id(),
            resolve_inherited(projects, index, &project.version()),
        ))
    }

    /// Directory of the execution root POM
    pub fn base_dir(&self) -> PathBuf {
        self.session.root_dir()
    }

    pub fn user_properties(&self) -> &UserProperties {
        self.session.user_properties()
    }

    pub fn session(&self) -> &Session {
        &*self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut *self.session
    }

    pub fn pom_io(&self) -> &PomIo {
        &self.pom_io
    }

    pub fn file_io(&self) -> &FileIo {
        self.session.file_io()
    }

    pub fn model_io(&self) -> ModelIo<'_> {
        self.session.model_io()
    }
}
