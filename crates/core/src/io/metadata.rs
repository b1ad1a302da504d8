use super::{FileIo, artifact_dir};
use crate::error::{Error, Result};
use crate::types::ProjectRef;
use crate::xml::Document;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Source of the versions already published for an artifact
pub trait MetadataReader: Send + Sync {
    fn versions(&self, project: &ProjectRef) -> Result<BTreeSet<String>>;
}

/// Reads `maven-metadata*.xml` from the local repository and every remote
pub struct RepositoryMetadataReader {
    local_repository: PathBuf,
    remote_repositories: Vec<String>,
    file_io: FileIo,
}

impl RepositoryMetadataReader {
    pub fn new(local_repository: impl Into<PathBuf>, remote_repositories: Vec<String>, file_io: FileIo) -> Self {
        Self {
            local_repository: local_repository.into(),
            remote_repositories,
            file_io,
        }
    }

    fn local_versions(&self, project: &ProjectRef, versions: &mut BTreeSet<String>) -> Result<()> {
        let dir = self.local_repository.join(artifact_dir(project));
        if !dir.is_dir() {
            return Ok(());
        }
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_metadata = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("maven-metadata") && name.ends_with(".xml"));
            if is_metadata {
                trace!("Reading metadata {}", path.display());
                versions.extend(parse_versions(&fs::read_to_string(&path)?, project)?);
            }
        }
        Ok(())
    }
}

impl MetadataReader for RepositoryMetadataReader {
    fn versions(&self, project: &ProjectRef) -> Result<BTreeSet<String>> {
        let mut versions = BTreeSet::new();
        self.local_versions(project, &mut versions)?;

        for remote in &self.remote_repositories {
            let url = format!(
                "{}/{}/maven-metadata.xml",
                remote.trim_end_matches('/'),
                artifact_dir(project)
            );
            if let Some(source) = self.file_io.read_optional(&url)? {
                versions.extend(parse_versions(&source, project)?);
            }
        }

        debug!("Found {} published versions of {}", versions.len(), project);
        Ok(versions)
    }
}

fn parse_versions(source: &str, project: &ProjectRef) -> Result<BTreeSet<String>> {
    let document = Document::parse(source)
        .map_err(|e| Error::Resolution(format!("Unable to parse metadata of {project}: {e}")))?;
    Ok(document
        .root
        .descendant("versioning/versions")
        .map(|versions| {
            versions
                .children_named("version")
                .map(|v| v.text())
                .filter(|v| !v.is_empty())
                .collect()
        })
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_file;
    use tempfile::TempDir;

    fn metadata(versions: &[&str]) -> String {
        let versions: String = versions
            .iter()
            .map(|v| format!("      <version>{v}</version>\n"))
            .collect();
        format!(
            "<metadata>\n  <groupId>org.example</groupId>\n  <versioning>\n    <versions>\n{versions}    </versions>\n  </versioning>\n</metadata>\n"
        )
    }

    #[test]
    fn test_merges_local_and_remote_versions() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "local/org/example/app/maven-metadata-central.xml",
            &metadata(&["1.0.0.redhat-1"]),
        );
        write_file(
            dir.path(),
            "local/org/example/app/maven-metadata-local.xml",
            &metadata(&["1.0.0.redhat-2"]),
        );
        write_file(
            dir.path(),
            "remote/org/example/app/maven-metadata.xml",
            &metadata(&["1.0.0.redhat-2", "1.0.0.redhat-4"]),
        );

        let reader = RepositoryMetadataReader::new(
            dir.path().join("local"),
            vec![format!("file://{}", dir.path().join("remote").display())],
            FileIo::new(dir.path(), dir.path().join("cache")),
        );
        let versions = reader.versions(&ProjectRef::new("org.example", "app")).unwrap();
        assert_eq!(
            versions.into_iter().collect::<Vec<_>>(),
            vec!["1.0.0.redhat-1", "1.0.0.redhat-2", "1.0.0.redhat-4"]
        );
        assert!(
            reader
                .versions(&ProjectRef::new("org.example", "missing"))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_invalid_metadata_is_a_resolution_error() {
        let project = ProjectRef::new("org.example", "app");
        assert!(matches!(
            parse_versions("<metadata><versioning>", &project),
            Err(Error::Resolution(_))
        ));
    }
}
