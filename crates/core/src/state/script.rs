use super::State;
use crate::config::{ConfigValue, UserProperties};
use crate::error::Result;

pub const MANIPULATION_SCRIPTS: &str = "manipulationScripts";

pub(crate) const CONFIG_VALUES: &[ConfigValue] =
    &[ConfigValue::new(MANIPULATION_SCRIPTS, "groovy.html")];

/// Script locations: file paths or URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptState {
    pub locations: Vec<String>,
}

impl ScriptState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        Ok(Self {
            locations: props.get_list(MANIPULATION_SCRIPTS),
        })
    }
}

impl State for ScriptState {
    fn is_enabled(&self) -> bool {
        !self.locations.is_empty()
    }
}
