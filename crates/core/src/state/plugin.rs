use super::{State, parse_gavs, parse_overrides};
use crate::config::{ConfigValue, UserProperties};
use crate::error::Result;
use crate::types::{ProjectVersionRef, WildcardMap};

pub const PLUGIN_MANAGEMENT: &str = "pluginManagement";
pub const PLUGIN_OVERRIDE_PREFIX: &str = "pluginOverride.";

pub(crate) const CONFIG_VALUES: &[ConfigValue] = &[
    ConfigValue::new(PLUGIN_MANAGEMENT, "plugin-manip.html#remote-plugin-management"),
    ConfigValue::new("pluginOverride", "plugin-manip.html#plugin-overrides"),
];

/// Plugin versions to align to
#[derive(Debug, Clone, Default)]
pub struct PluginState {
    pub remote_boms: Vec<ProjectVersionRef>,
    pub overrides: WildcardMap<String>,
}

impl PluginState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        Ok(Self {
            remote_boms: parse_gavs(props, PLUGIN_MANAGEMENT)?,
            overrides: parse_overrides(props, PLUGIN_OVERRIDE_PREFIX)?,
        })
    }
}

impl State for PluginState {
    fn is_enabled(&self) -> bool {
        !self.remote_boms.is_empty() || !self.overrides.is_empty()
    }
}
