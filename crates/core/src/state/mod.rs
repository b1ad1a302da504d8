//! Per-manipulator configuration, built from user properties during `init`
//! and read-only while changes are applied

mod bom;
mod common;
mod dependency;
mod distribution;
mod json;
mod parent;
mod plugin;
mod project_version;
mod property;
mod repo_reporting;
mod repository;
mod script;
mod suffix;
mod versioning;

pub use bom::BomState;
pub use common::CommonState;
pub use dependency::DependencyState;
pub use distribution::{DistributionEnforcingState, EnforcingMode};
pub use json::{JsonOperation, JsonState};
pub use parent::ParentInjectionState;
pub use plugin::PluginState;
pub use project_version::ProjectVersionEnforcingState;
pub use property::PropertyState;
pub use repo_reporting::{DEFAULT_BACKUP, RepoReportingState};
pub use repository::RepositoryInjectionState;
pub use script::ScriptState;
pub use suffix::SuffixState;
pub use versioning::{PreloadedMetadata, VersioningState};

use crate::config::{ConfigValue, UserProperties};
use crate::error::{Error, Result};
use crate::types::{ProjectRef, ProjectVersionRef, WildcardMap};
use std::any::Any;
use std::fmt::Debug;

/// Upcast to `Any` so stored states can be downcast to their concrete type
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Configuration owned by one manipulator
pub trait State: AsAny + Debug + Send + Sync + 'static {
    /// A manipulator whose state is disabled makes no changes
    fn is_enabled(&self) -> bool;
}

/// Every documented property, grouped by the state reading it
pub fn config_values() -> Vec<ConfigValue> {
    [
        bom::CONFIG_VALUES,
        common::CONFIG_VALUES,
        dependency::CONFIG_VALUES,
        distribution::CONFIG_VALUES,
        json::CONFIG_VALUES,
        parent::CONFIG_VALUES,
        plugin::CONFIG_VALUES,
        project_version::CONFIG_VALUES,
        property::CONFIG_VALUES,
        repo_reporting::CONFIG_VALUES,
        repository::CONFIG_VALUES,
        script::CONFIG_VALUES,
        suffix::CONFIG_VALUES,
        versioning::CONFIG_VALUES,
    ]
    .concat()
}

/// Collect `<prefix>g:a@*=version` overrides. An empty version excludes
/// the coordinate from alignment.
pub(crate) fn parse_overrides(props: &UserProperties, prefix: &str) -> Result<WildcardMap<String>> {
    let mut overrides = WildcardMap::new();
    for (key, value) in props.with_prefix(prefix) {
        let coordinate = key.strip_suffix("@*").unwrap_or(key);
        let project = ProjectRef::parse(coordinate).map_err(|_| {
            Error::Config(format!("Invalid override {prefix}{key}; expected groupId:artifactId"))
        })?;
        overrides.put(&project, value.trim().to_string());
    }
    Ok(overrides)
}

/// Parse a `g:a:v` list property
pub(crate) fn parse_gavs(props: &UserProperties, key: &str) -> Result<Vec<ProjectVersionRef>> {
    match props.get_non_empty(key) {
        Some(value) => ProjectVersionRef::parse_list(value),
        None => Ok(Vec::new()),
    }
}
