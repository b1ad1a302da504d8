use super::State;
use crate::config::{ConfigValue, UserProperties};
use crate::error::Result;
use crate::manip::ManipulatorKind;

pub const ENFORCE_PROJECT_VERSION: &str = "enforceProjectVersion";

pub(crate) const CONFIG_VALUES: &[ConfigValue] = &[ConfigValue::new(
    ENFORCE_PROJECT_VERSION,
    "misc.html#projectversion-expression-replacement",
)];

/// Replacement of `${project.version}` in dependency versions. On unless
/// explicitly disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectVersionEnforcingState {
    pub enabled: bool,
}

impl ProjectVersionEnforcingState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        Ok(Self {
            enabled: props.get_bool(
                ENFORCE_PROJECT_VERSION,
                ManipulatorKind::ProjectVersionEnforcing.default_on(),
            ),
        })
    }
}

impl State for ProjectVersionEnforcingState {
    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
