//! Process-wide holder of everything one manipulation run works on

use crate::config::UserProperties;
use crate::error::{Error, Result};
use crate::io::{
    FileIo, MetadataReader, ModelIo, ModelResolver, RepositoryMetadataReader,
    RepositoryModelResolver,
};
use crate::pom::Project;
use crate::state::State;
use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Disables the whole run when `true`
pub const MANIPULATION_DISABLE: &str = "manipulation.disable";
/// Overrides the default local repository location
pub const LOCAL_REPOSITORY: &str = "maven.repo.local";

const DEFAULT_CENTRAL: &str = "https://repo.maven.apache.org/maven2";

/// What the host asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManipulationRequest {
    pub root_pom: PathBuf,
    pub active_profiles: Vec<String>,
    pub local_repository: PathBuf,
    pub remote_repositories: Vec<String>,
}

impl ManipulationRequest {
    pub fn new(root_pom: impl Into<PathBuf>) -> Self {
        Self {
            root_pom: root_pom.into(),
            active_profiles: Vec::new(),
            local_repository: default_local_repository(),
            remote_repositories: vec![DEFAULT_CENTRAL.to_string()],
        }
    }

    pub fn with_active_profiles(mut self, profiles: Vec<String>) -> Self {
        self.active_profiles = profiles;
        self
    }

    pub fn with_local_repository(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_repository = path.into();
        self
    }

    pub fn with_remote_repositories(mut self, urls: Vec<String>) -> Self {
        self.remote_repositories = urls;
        self
    }

    /// Directory of the execution-root POM
    pub fn root_dir(&self) -> PathBuf {
        match self.root_pom.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// `~/.m2/repository`
pub fn default_local_repository() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".m2")
        .join("repository")
}

/// Download cache below the execution root's `target` directory
const CACHE_DIR: &str = "pme-cache";

/// User properties, the reactor, every registered state and the first
/// error raised while manipulating
pub struct Session {
    request: ManipulationRequest,
    user_properties: UserProperties,
    projects: Vec<Project>,
    states: HashMap<TypeId, Box<dyn State>>,
    error: Option<Error>,
    file_io: FileIo,
    model_resolver: Arc<dyn ModelResolver>,
    metadata_reader: Arc<dyn MetadataReader>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("request", &self.request)
            .field("user_properties", &self.user_properties)
            .field("projects", &self.projects.len())
            .field("states", &self.states.values().collect::<Vec<_>>())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(request: ManipulationRequest, user_properties: UserProperties) -> Self {
        let mut request = request;
        if let Some(local) = user_properties.get_non_empty(LOCAL_REPOSITORY) {
            request.local_repository = PathBuf::from(local);
        }
        let root_dir = request.root_dir();
        let file_io = FileIo::new(&root_dir, root_dir.join("target").join(CACHE_DIR));
        let model_resolver = Arc::new(RepositoryModelResolver::new(
            &request.local_repository,
            request.remote_repositories.clone(),
            file_io.clone(),
        ));
        let metadata_reader = Arc::new(RepositoryMetadataReader::new(
            &request.local_repository,
            request.remote_repositories.clone(),
            file_io.clone(),
        ));
        Self {
            request,
            user_properties,
            projects: Vec::new(),
            states: HashMap::new(),
            error: None,
            file_io,
            model_resolver,
            metadata_reader,
        }
    }

    /// Replace the repository-backed POM resolver
    pub fn with_model_resolver(mut self, resolver: Arc<dyn ModelResolver>) -> Self {
        self.model_resolver = resolver;
        self
    }

    /// Replace the repository-backed metadata reader
    pub fn with_metadata_reader(mut self, reader: Arc<dyn MetadataReader>) -> Self {
        self.metadata_reader = reader;
        self
    }

    pub fn request(&self) -> &ManipulationRequest {
        &self.request
    }

    pub fn root_dir(&self) -> PathBuf {
        self.request.root_dir()
    }

    /// `target` directory of the execution root
    pub fn target_dir(&self) -> PathBuf {
        self.root_dir().join("target")
    }

    pub fn active_profiles(&self) -> &[String] {
        &self.request.active_profiles
    }

    pub fn local_repository(&self) -> &Path {
        &self.request.local_repository
    }

    pub fn remote_repositories(&self) -> &[String] {
        &self.request.remote_repositories
    }

    pub fn file_io(&self) -> &FileIo {
        &self.file_io
    }

    pub fn model_resolver(&self) -> Arc<dyn ModelResolver> {
        Arc::clone(&self.model_resolver)
    }

    pub fn metadata_reader(&self) -> Arc<dyn MetadataReader> {
        Arc::clone(&self.metadata_reader)
    }

    pub fn model_io(&self) -> ModelIo<'_> {
        ModelIo::new(self.model_resolver.as_ref())
    }

    pub fn user_properties(&self) -> &UserProperties {
        &self.user_properties
    }

    pub fn user_properties_mut(&mut self) -> &mut UserProperties {
        &mut self.user_properties
    }

    /// False when the run was switched off with `manipulation.disable`
    pub fn is_enabled(&self) -> bool {
        !self.user_properties.get_bool(MANIPULATION_DISABLE, false)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut Vec<Project> {
        &mut self.projects
    }

    pub fn set_projects(&mut self, projects: Vec<Project>) {
        self.projects = projects;
    }

    /// The execution-root project
    pub fn inheritance_root(&self) -> Option<&Project> {
        self.projects.iter().find(|p| p.is_inheritance_root())
    }

    /// Register `state`, replacing any previous state of the same type
    pub fn set_state<S: State>(&mut self, state: S) {
        self.states.insert(TypeId::of::<S>(), Box::new(state));
    }

    pub fn state<S: State>(&self) -> Option<&S> {
        self.states
            .get(&TypeId::of::<S>())
            .and_then(|state| (**state).as_any().downcast_ref::<S>())
    }

    /// Like [`Session::state`] but a missing state is an internal error
    pub fn require_state<S: State>(&self) -> Result<&S> {
        self.state::<S>().ok_or_else(|| {
            Error::Internal(format!("State {} has not been initialised", type_name::<S>()))
        })
    }

    /// True when a state of type `S` is registered and enabled
    pub fn is_state_enabled<S: State>(&self) -> bool {
        self.state::<S>().is_some_and(|s| s.is_enabled())
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn set_error(&mut self, error: Error) {
        self.error = Some(error);
    }

    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }
}
