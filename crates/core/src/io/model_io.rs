use super::{FileIo, artifact_dir};
use crate::error::{Error, Result};
use crate::pom::{Dependency, Model, Project, base};
use crate::types::{ProjectRef, ProjectVersionRef};
use crate::utils::resolve_inherited;
use crate::xml::Element;
use lru::LruCache;
use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

const CACHE_SIZE: usize = 128;
/// Limit on parent chains and BOM imports followed from one remote POM
const MAX_DEPTH: usize = 16;

/// Resolves remote POMs by coordinate
pub trait ModelResolver: Send + Sync {
    fn resolve_model(&self, gav: &ProjectVersionRef) -> Result<Model>;
}

/// Looks POMs up in the local repository, then in each remote repository
pub struct RepositoryModelResolver {
    local_repository: PathBuf,
    remote_repositories: Vec<String>,
    file_io: FileIo,
    cache: Mutex<LruCache<ProjectVersionRef, Model>>,
}

impl RepositoryModelResolver {
    pub fn new(local_repository: impl Into<PathBuf>, remote_repositories: Vec<String>, file_io: FileIo) -> Self {
        Self {
            local_repository: local_repository.into(),
            remote_repositories,
            file_io,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    fn cached(&self, gav: &ProjectVersionRef) -> Result<Option<Model>> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| Error::Internal("model cache lock poisoned".to_string()))?;
        Ok(cache.get(gav).cloned())
    }

    fn remember(&self, gav: &ProjectVersionRef, model: &Model) -> Result<()> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| Error::Internal("model cache lock poisoned".to_string()))?;
        cache.put(gav.clone(), model.clone());
        Ok(())
    }

    fn read_source(&self, gav: &ProjectVersionRef) -> Result<Option<String>> {
        let relative = format!(
            "{}/{}/{}-{}.pom",
            artifact_dir(&gav.as_project_ref()),
            gav.version,
            gav.artifact_id,
            gav.version
        );

        let local = self.local_repository.join(&relative);
        if local.is_file() {
            debug!("Reading {} from {}", gav, local.display());
            return Ok(Some(fs::read_to_string(&local)?));
        }

        for remote in &self.remote_repositories {
            let url = format!("{}/{}", remote.trim_end_matches('/'), relative);
            if let Some(source) = self.file_io.read_optional(&url)? {
                return Ok(Some(source));
            }
        }
        Ok(None)
    }
}

impl ModelResolver for RepositoryModelResolver {
    fn resolve_model(&self, gav: &ProjectVersionRef) -> Result<Model> {
        if let Some(model) = self.cached(gav)? {
            return Ok(model);
        }
        let source = self
            .read_source(gav)?
            .ok_or_else(|| Error::Resolution(format!("Unable to resolve POM {gav}")))?;
        let model = Model::parse(&source)
            .map_err(|e| Error::Resolution(format!("Unable to parse POM {gav}: {e}")))?;
        self.remember(gav, &model)?;
        Ok(model)
    }
}

/// Read access to remote POMs with their properties resolved through the
/// remote parent chain
pub struct ModelIo<'a> {
    resolver: &'a dyn ModelResolver,
}

impl<'a> ModelIo<'a> {
    pub fn new(resolver: &'a dyn ModelResolver) -> Self {
        Self { resolver }
    }

    pub fn resolve_model(&self, gav: &ProjectVersionRef) -> Result<Model> {
        self.resolver.resolve_model(gav)
    }

    /// The remote POM followed by as many of its parents as resolve
    fn lineage(&self, gav: &ProjectVersionRef) -> Result<Vec<Project>> {
        let model = self.resolver.resolve_model(gav)?;
        let mut projects = vec![Project::new(PathBuf::new(), model)];

        while projects.len() < MAX_DEPTH {
            let Some(parent) = projects.last().and_then(|p| p.model().parent()) else {
                break;
            };
            let parent_gav = parent.as_gav();
            match self.resolver.resolve_model(&parent_gav) {
                Ok(model) => {
                    if let Some(last) = projects.last_mut() {
                        last.set_reactor_parent(Some(parent_gav.as_project_ref()));
                    }
                    projects.push(Project::new(PathBuf::new(), model));
                }
                Err(e) => {
                    warn!("Unable to resolve parent {} of {}: {}", parent_gav, gav, e);
                    break;
                }
            }
        }
        Ok(projects)
    }

    /// Properties of a remote POM, inherited ones included. Nearer POMs win.
    pub fn remote_properties(&self, gav: &ProjectVersionRef) -> Result<Vec<(String, String)>> {
        let lineage = self.lineage(gav)?;
        let mut properties: Vec<(String, String)> = Vec::new();
        for project in &lineage {
            for (key, value) in project.model().properties() {
                if !properties.iter().any(|(k, _)| *k == key) {
                    properties.push((key, value));
                }
            }
        }
        Ok(properties)
    }

    /// Managed dependencies of a remote BOM with resolved versions.
    /// Imported BOMs contribute entries the BOM does not declare itself.
    pub fn remote_dependency_versions(&self, gav: &ProjectVersionRef) -> Result<Vec<(ProjectRef, String)>> {
        let mut found = Vec::new();
        self.collect_dependency_versions(gav, &mut found, 0)?;
        Ok(found)
    }

    fn collect_dependency_versions(
        &self,
        gav: &ProjectVersionRef,
        found: &mut Vec<(ProjectRef, String)>,
        depth: usize,
    ) -> Result<()> {
        if depth >= MAX_DEPTH {
            return Err(Error::Resolution(format!("BOM imports of {gav} nest too deeply")));
        }
        let lineage = self.lineage(gav)?;
        let mut imports = Vec::new();

        for (index, project) in lineage.iter().enumerate() {
            for element in base::managed_dependencies(project.model().root()) {
                let Some(dependency) = Dependency::from_element(element) else {
                    continue;
                };
                let Some(version) = &dependency.version else {
                    continue;
                };
                let version = resolve_inherited(&lineage, index, version);
                if dependency.scope.as_deref() == Some("import") {
                    imports.push(ProjectVersionRef::new(
                        &dependency.group_id,
                        &dependency.artifact_id,
                        version,
                    ));
                    continue;
                }
                let key = dependency.key();
                if !found.iter().any(|(k, _)| *k == key) {
                    found.push((key, version));
                }
            }
        }

        for import in imports {
            self.collect_dependency_versions(&import, found, depth + 1)?;
        }
        Ok(())
    }

    /// Managed and concrete plugin versions of a remote POM
    pub fn remote_plugin_versions(&self, gav: &ProjectVersionRef) -> Result<Vec<(ProjectRef, String)>> {
        let lineage = self.lineage(gav)?;
        let mut found: Vec<(ProjectRef, String)> = Vec::new();
        for (index, project) in lineage.iter().enumerate() {
            let root = project.model().root();
            for plugin in base::managed_plugins(root).chain(base::plugins(root)) {
                let (Some(key), Some(version)) = (base::plugin_key(plugin), plugin.child_text("version")) else {
                    continue;
                };
                if version.is_empty() || found.iter().any(|(k, _)| *k == key) {
                    continue;
                }
                found.push((key, resolve_inherited(&lineage, index, &version)));
            }
        }
        Ok(found)
    }

    /// `(section, entry, element)` for each repository and plugin
    /// repository of a remote POM
    pub fn remote_repositories(&self, gav: &ProjectVersionRef) -> Result<Vec<(&'static str, &'static str, Element)>> {
        let model = self.resolver.resolve_model(gav)?;
        let mut found = Vec::new();
        for (section, entry) in base::REPOSITORY_SECTIONS {
            for repository in base::repositories(model.root(), section, entry) {
                found.push((section, entry, repository.clone()));
            }
        }
        Ok(found)
    }
}
