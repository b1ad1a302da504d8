use super::State;
use crate::config::{ConfigValue, UserProperties};
use crate::error::Result;
use crate::types::ProjectVersionRef;

pub const PARENT_INJECTION: &str = "parentInjection";

pub(crate) const CONFIG_VALUES: &[ConfigValue] =
    &[ConfigValue::new(PARENT_INJECTION, "misc.html#parent-injection")];

/// Parent to inject into the inheritance root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentInjectionState {
    pub parent: Option<ProjectVersionRef>,
}

impl ParentInjectionState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        Ok(Self {
            parent: props
                .get_non_empty(PARENT_INJECTION)
                .map(ProjectVersionRef::parse)
                .transpose()?,
        })
    }
}

impl State for ParentInjectionState {
    fn is_enabled(&self) -> bool {
        self.parent.is_some()
    }
}
