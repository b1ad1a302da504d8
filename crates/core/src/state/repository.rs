use super::State;
use crate::config::{ConfigValue, UserProperties};
use crate::error::Result;
use crate::types::{ProjectRef, ProjectVersionRef};

pub const REPOSITORY_INJECTION: &str = "repositoryInjection";
pub const REPOSITORY_INJECTION_POMS: &str = "repositoryInjectionPoms";

pub(crate) const CONFIG_VALUES: &[ConfigValue] = &[
    ConfigValue::new(REPOSITORY_INJECTION, "misc.html#repository-injection"),
    ConfigValue::new(REPOSITORY_INJECTION_POMS, "misc.html#repository-injection"),
];

/// Remote POM whose repositories are injected, and where they go
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryInjectionState {
    pub remote_pom: Option<ProjectVersionRef>,
    /// Target projects; empty means the inheritance root
    pub targets: Vec<ProjectRef>,
}

impl RepositoryInjectionState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        Ok(Self {
            remote_pom: props
                .get_non_empty(REPOSITORY_INJECTION)
                .map(ProjectVersionRef::parse)
                .transpose()?,
            targets: props
                .get_non_empty(REPOSITORY_INJECTION_POMS)
                .map(ProjectRef::parse_list)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

impl State for RepositoryInjectionState {
    fn is_enabled(&self) -> bool {
        self.remote_pom.is_some()
    }
}
