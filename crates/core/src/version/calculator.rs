use super::{
    append_qualifier_suffix, build_number_padding, find_highest_matching_build_number,
    has_build_number, integer_build_number, osgi_version, pad_build_number, remove_snapshot,
    set_build_number,
};
use crate::error::Result;
use crate::io::MetadataReader;
use crate::pom::Project;
use crate::state::VersioningState;
use crate::types::ProjectRef;
use crate::utils::resolve_inherited;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Computes new project versions from a [`VersioningState`]
pub struct VersionCalculator<'a> {
    metadata: &'a dyn MetadataReader,
}

impl<'a> VersionCalculator<'a> {
    pub fn new(metadata: &'a dyn MetadataReader) -> Self {
        Self { metadata }
    }

    /// New version of every project, keyed by `g:a`.
    ///
    /// Versions are first calculated one by one, then reconciled so that
    /// projects sharing a base version also share a build number.
    pub fn calculate_versioning_changes(
        &self,
        projects: &[Project],
        state: &VersioningState,
    ) -> Result<BTreeMap<ProjectRef, String>> {
        let mut versions = BTreeMap::new();
        let mut with_build_numbers = BTreeSet::new();

        for (index, project) in projects.iter().enumerate() {
            let original = resolve_inherited(projects, index, &project.version());
            let modified = self.calculate(&project.key(), &original, state)?;
            debug!(
                "Caching version against project {} with modified version {}",
                project.key(),
                modified
            );
            if has_build_number(&modified) {
                with_build_numbers.insert(modified.clone());
            }
            versions.insert(project.key(), modified);
        }

        debug!("Syncing projects within reactor...");
        let padding = if state.suffix.is_none() {
            state.incremental_padding
        } else {
            0
        };
        for project in projects {
            let key = project.key();
            let Some(mut modified) = versions.get(&key).cloned() else {
                continue;
            };
            let build_number = find_highest_matching_build_number(&modified, &with_build_numbers);
            if build_number > 0 {
                let width = build_number_padding(padding, &with_build_numbers);
                modified = set_build_number(&modified, &pad_build_number(build_number, width));
            }
            with_build_numbers.insert(modified.clone());
            debug!("{} has updated version: {}", key, modified);
            versions.insert(key, modified);
        }

        Ok(versions)
    }

    /// New version of one artifact
    pub fn calculate(&self, key: &ProjectRef, version: &str, state: &VersioningState) -> Result<String> {
        debug!(
            "Got the following original version: {} for {} (static suffix {:?}, incremental suffix {:?}, override {:?})",
            version, key, state.suffix, state.incremental_suffix, state.override_version
        );

        let mut new_version = handle_alternate(state, version);
        if new_version != version {
            debug!("Resetting version {} to {}", version, new_version);
        }

        if let Some(override_version) = &state.override_version {
            new_version = override_version.clone();
        }

        if let Some(suffix) = &state.suffix {
            new_version = append_qualifier_suffix(&new_version, suffix);
        } else if let Some(incremental) = &state.incremental_suffix {
            let candidates = self.version_candidates(key, state)?;
            new_version = append_qualifier_suffix(&new_version, incremental);

            let next = find_highest_matching_build_number(&new_version, &candidates) + 1;
            if next > integer_build_number(&new_version) {
                let width = build_number_padding(state.incremental_padding, &candidates);
                new_version = set_build_number(&new_version, &pad_build_number(next, width));
            }
        }

        if !state.preserve_snapshot {
            new_version = remove_snapshot(&new_version);
        }
        if state.osgi {
            new_version = osgi_version(&new_version);
        }
        Ok(new_version)
    }

    /// Known versions of `key`: the preloaded metadata when supplied (even
    /// if it has no entry for `key`), else repository metadata
    fn version_candidates(&self, key: &ProjectRef, state: &VersioningState) -> Result<BTreeSet<String>> {
        match &state.preloaded_metadata {
            Some(preloaded) => Ok(preloaded.get(key).cloned().unwrap_or_default()),
            None => {
                debug!("Reading available versions from repository metadata for: {}", key);
                self.metadata.versions(key)
            }
        }
    }
}

/// Strip a previously applied alternate suffix (`1.0.redhat-3` becomes
/// `1.0`) unless the version already carries the rebuild suffix
pub fn handle_alternate(state: &VersioningState, version: &str) -> String {
    let rebuilt = !state.rebuild_suffix.is_empty() && version.contains(&state.rebuild_suffix);
    if rebuilt {
        return version.to_string();
    }
    for suffix in &state.suffix_alternatives {
        let pattern = format!(r"^(.*)([.|-])({}-\d+)$", regex::escape(suffix));
        let Ok(regex) = Regex::new(&pattern) else {
            continue;
        };
        if let Some(kept) = regex.captures(version).and_then(|c| c.get(1)) {
            return kept.as_str().to_string();
        }
    }
    version.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserProperties;
    use crate::error::Error;
    use crate::pom::Model;
    use crate::state::PreloadedMetadata;
    use crate::test_support::pom;

    struct FixedMetadata(BTreeSet<String>);

    impl MetadataReader for FixedMetadata {
        fn versions(&self, _project: &ProjectRef) -> Result<BTreeSet<String>> {
            Ok(self.0.clone())
        }
    }

    struct FailingMetadata;

    impl MetadataReader for FailingMetadata {
        fn versions(&self, project: &ProjectRef) -> Result<BTreeSet<String>> {
            Err(Error::Resolution(format!("no metadata for {project}")))
        }
    }

    fn state(props: &[(&str, &str)]) -> VersioningState {
        let props: UserProperties = props.iter().copied().collect();
        VersioningState::new(&props).unwrap()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn key() -> ProjectRef {
        ProjectRef::new("org.example", "app")
    }

    #[test]
    fn test_incremental_suffix_from_repository_metadata() {
        let metadata = FixedMetadata(set(&["1.0.0.rebuild-1", "1.0.0.rebuild-4"]));
        let calculator = VersionCalculator::new(&metadata);
        let state = state(&[("versionIncrementalSuffix", "rebuild")]);
        assert_eq!(
            calculator.calculate(&key(), "1.0.0", &state).unwrap(),
            "1.0.0.rebuild-5"
        );
    }

    #[test]
    fn test_incremental_suffix_without_candidates() {
        let metadata = FixedMetadata(BTreeSet::new());
        let calculator = VersionCalculator::new(&metadata);
        let state = state(&[("versionIncrementalSuffix", "rebuild")]);
        assert_eq!(
            calculator.calculate(&key(), "1.0-SNAPSHOT", &state).unwrap(),
            "1.0.0.rebuild-1"
        );
    }

    #[test]
    fn test_padding_follows_candidates() {
        let metadata = FixedMetadata(set(&["1.0.0.rebuild-00003"]));
        let calculator = VersionCalculator::new(&metadata);
        let state = state(&[("versionIncrementalSuffix", "rebuild")]);
        assert_eq!(
            calculator.calculate(&key(), "1.0.0", &state).unwrap(),
            "1.0.0.rebuild-00004"
        );

        let state = VersioningState {
            incremental_padding: 3,
            ..state
        };
        let empty = FixedMetadata(BTreeSet::new());
        let calculator = VersionCalculator::new(&empty);
        assert_eq!(
            calculator.calculate(&key(), "1.0.0", &state).unwrap(),
            "1.0.0.rebuild-001"
        );
    }

    #[test]
    fn test_preloaded_metadata_replaces_reader() {
        let preloaded: PreloadedMetadata =
            [(key(), set(&["1.0.0.rebuild-2"]))].into_iter().collect();
        let state = state(&[("versionIncrementalSuffix", "rebuild")]).with_preloaded_metadata(preloaded);
        let calculator = VersionCalculator::new(&FailingMetadata);

        assert_eq!(
            calculator.calculate(&key(), "1.0.0", &state).unwrap(),
            "1.0.0.rebuild-3"
        );
        assert_eq!(
            calculator
                .calculate(&ProjectRef::new("org.other", "lib"), "2.0", &state)
                .unwrap(),
            "2.0.0.rebuild-1"
        );
    }

    #[test]
    fn test_reader_failure_propagates() {
        let calculator = VersionCalculator::new(&FailingMetadata);
        let state = state(&[("versionIncrementalSuffix", "rebuild")]);
        assert!(matches!(
            calculator.calculate(&key(), "1.0", &state),
            Err(Error::Resolution(_))
        ));
    }

    #[test]
    fn test_static_suffix_override_and_snapshot() {
        let calculator = VersionCalculator::new(&FailingMetadata);

        let static_suffix = state(&[("versionSuffix", "redhat-2")]);
        assert_eq!(
            calculator.calculate(&key(), "1.2-SNAPSHOT", &static_suffix).unwrap(),
            "1.2.0.redhat-2"
        );

        let preserved = state(&[("versionSuffix", "redhat-2"), ("preserveSnapshot", "true")]);
        assert_eq!(
            calculator.calculate(&key(), "1.2-SNAPSHOT", &preserved).unwrap(),
            "1.2.0.redhat-2-SNAPSHOT"
        );

        let overridden = state(&[("versionOverride", "3.0"), ("versionOsgi", "false")]);
        assert_eq!(calculator.calculate(&key(), "1.2", &overridden).unwrap(), "3.0");
    }

    #[test]
    fn test_alternate_suffix_reconciliation() {
        let rebuild = state(&[("versionIncrementalSuffix", "rebuild")]);
        assert_eq!(handle_alternate(&rebuild, "1.0.0.redhat-3"), "1.0.0");
        assert_eq!(handle_alternate(&rebuild, "1.0.0-redhat-3"), "1.0.0");
        assert_eq!(handle_alternate(&rebuild, "1.0.0.Final"), "1.0.0.Final");

        let redhat = state(&[("versionIncrementalSuffix", "redhat")]);
        assert_eq!(handle_alternate(&redhat, "1.0.0.redhat-3"), "1.0.0.redhat-3");
    }

    #[test]
    fn test_reactor_shares_build_number() {
        let metadata = FixedMetadata(BTreeSet::new());
        let calculator = VersionCalculator::new(&metadata);
        let preloaded: PreloadedMetadata =
            [(ProjectRef::new("org.example", "b"), set(&["1.0.0.rebuild-3"]))]
                .into_iter()
                .collect();
        let state = state(&[("versionIncrementalSuffix", "rebuild")]).with_preloaded_metadata(preloaded);

        let projects = vec![
            Project::new("a/pom.xml", Model::parse(&pom("org.example", "a", "1.0", "")).unwrap()),
            Project::new("b/pom.xml", Model::parse(&pom("org.example", "b", "1.0", "")).unwrap()),
            Project::new("c/pom.xml", Model::parse(&pom("org.example", "c", "2.0", "")).unwrap()),
        ];

        let versions = calculator.calculate_versioning_changes(&projects, &state).unwrap();
        assert_eq!(versions[&ProjectRef::new("org.example", "a")], "1.0.0.rebuild-4");
        assert_eq!(versions[&ProjectRef::new("org.example", "b")], "1.0.0.rebuild-4");
        assert_eq!(versions[&ProjectRef::new("org.example", "c")], "2.0.0.rebuild-1");
    }
}
