use super::State;
use crate::config::{ConfigValue, UserProperties};
use crate::error::Result;
use crate::types::ProjectRef;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

pub const VERSION_SUFFIX: &str = "versionSuffix";
pub const INCREMENTAL_SUFFIX: &str = "versionIncrementalSuffix";
pub const VERSION_OVERRIDE: &str = "versionOverride";
pub const PRESERVE_SNAPSHOT: &str = "preserveSnapshot";
pub const SUFFIX_SNAPSHOT: &str = "versionSuffixSnapshot";
pub const VERSION_OSGI: &str = "versionOsgi";
pub const INCREMENTAL_PADDING: &str = "versionIncrementalSuffixPadding";
pub const SUFFIX_ALTERNATIVES: &str = "versionSuffixAlternatives";

pub(crate) const CONFIG_VALUES: &[ConfigValue] = &[
    ConfigValue::new(VERSION_SUFFIX, "project-version-manip.html#manual-version-suffix"),
    ConfigValue::new(INCREMENTAL_SUFFIX, "project-version-manip.html#automatic-version-increment"),
    ConfigValue::new(VERSION_OVERRIDE, "project-version-manip.html#version-override"),
    ConfigValue::new(PRESERVE_SNAPSHOT, "project-version-manip.html#snapshot-detection"),
    ConfigValue::deprecated(SUFFIX_SNAPSHOT, "project-version-manip.html#snapshot-detection"),
    ConfigValue::new(VERSION_OSGI, "project-version-manip.html#osgi-compliance"),
    ConfigValue::new(INCREMENTAL_PADDING, "project-version-manip.html#version-increment-padding"),
    ConfigValue::new(SUFFIX_ALTERNATIVES, "project-version-manip.html#alternate-suffix-handling"),
];

const DEFAULT_ALTERNATIVES: &str = "redhat";

static TRAILING_BUILD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d+$").expect("valid regex"));

/// Known versions per artifact, supplied up front instead of reading
/// repository metadata
pub type PreloadedMetadata = HashMap<ProjectRef, BTreeSet<String>>;

/// Configuration of the project version calculator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersioningState {
    pub suffix: Option<String>,
    pub incremental_suffix: Option<String>,
    pub override_version: Option<String>,
    pub preserve_snapshot: bool,
    pub osgi: bool,
    pub incremental_padding: usize,
    pub suffix_alternatives: Vec<String>,
    /// Qualifier marking versions this tool already produced
    pub rebuild_suffix: String,
    pub preloaded_metadata: Option<PreloadedMetadata>,
}

impl VersioningState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        let suffix = props.get_non_empty(VERSION_SUFFIX).map(str::to_string);
        let incremental_suffix = props.get_non_empty(INCREMENTAL_SUFFIX).map(str::to_string);

        let preserve_snapshot =
            props.get_bool(SUFFIX_SNAPSHOT, false) || props.get_bool(PRESERVE_SNAPSHOT, false);

        let rebuild_suffix = match (&suffix, &incremental_suffix) {
            (Some(suffix), _) => TRAILING_BUILD_NUMBER.replace(suffix, "").into_owned(),
            (None, Some(incremental)) => incremental.clone(),
            (None, None) => String::new(),
        };

        Ok(Self {
            suffix,
            incremental_suffix,
            override_version: props.get_non_empty(VERSION_OVERRIDE).map(str::to_string),
            preserve_snapshot,
            osgi: props.get_bool(VERSION_OSGI, true),
            incremental_padding: props.get_usize(INCREMENTAL_PADDING, 0)?,
            suffix_alternatives: match props.get(SUFFIX_ALTERNATIVES) {
                Some(_) => props.get_list(SUFFIX_ALTERNATIVES),
                None => vec![DEFAULT_ALTERNATIVES.to_string()],
            },
            rebuild_suffix,
            preloaded_metadata: None,
        })
    }

    /// Use `metadata` as the version candidates instead of reading
    /// repository metadata
    pub fn with_preloaded_metadata(mut self, metadata: PreloadedMetadata) -> Self {
        self.preloaded_metadata = Some(metadata);
        self
    }

    /// The suffix whose base marks a rebuilt version: the static suffix when
    /// set, else the incremental one
    pub fn configured_suffix(&self) -> Option<&str> {
        self.suffix.as_deref().or(self.incremental_suffix.as_deref())
    }
}

impl State for VersioningState {
    fn is_enabled(&self) -> bool {
        self.suffix.is_some() || self.incremental_suffix.is_some() || self.override_version.is_some()
    }
}
