use super::State;
use crate::config::{ConfigValue, UserProperties};
use crate::error::{Error, Result};
use crate::types::ProjectRef;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const ENFORCE_SKIP: &str = "enforce-skip";
pub const ENFORCE_SKIP_PREFIX: &str = "enforceSkip.";

pub(crate) const CONFIG_VALUES: &[ConfigValue] = &[
    ConfigValue::new(ENFORCE_SKIP, "distribution-artifacts.html"),
    ConfigValue::new("enforceSkip", "distribution-artifacts.html#per-project-overrides"),
];

/// How install and deploy skip flags are enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnforcingMode {
    /// Force `skip=true`
    On,
    /// Force `skip=false`
    Off,
    /// Copy the install plugin's flag to every other flag
    Detect,
    #[default]
    None,
}

impl EnforcingMode {
    /// The value to enforce; `None` means it has to be detected
    pub fn default_value(self) -> Option<bool> {
        match self {
            EnforcingMode::On => Some(true),
            EnforcingMode::Off => Some(false),
            EnforcingMode::Detect | EnforcingMode::None => None,
        }
    }
}

impl FromStr for EnforcingMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "on" | "true" => Ok(EnforcingMode::On),
            "off" | "false" => Ok(EnforcingMode::Off),
            "detect" => Ok(EnforcingMode::Detect),
            "none" => Ok(EnforcingMode::None),
            other => Err(Error::Config(format!(
                "Invalid value '{other}' for {ENFORCE_SKIP}; expected on, off, detect or none"
            ))),
        }
    }
}

impl fmt::Display for EnforcingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnforcingMode::On => "on",
            EnforcingMode::Off => "off",
            EnforcingMode::Detect => "detect",
            EnforcingMode::None => "none",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionEnforcingState {
    pub mode: EnforcingMode,
    /// Per-project modes taking precedence over `mode`
    pub overrides: HashMap<ProjectRef, EnforcingMode>,
}

impl DistributionEnforcingState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        let mode = match props.get_non_empty(ENFORCE_SKIP) {
            Some(value) => value.parse()?,
            None => EnforcingMode::None,
        };
        let mut overrides = HashMap::new();
        for (key, value) in props.with_prefix(ENFORCE_SKIP_PREFIX) {
            overrides.insert(ProjectRef::parse(key)?, value.parse()?);
        }
        Ok(Self { mode, overrides })
    }

    pub fn mode_for(&self, project: &ProjectRef) -> EnforcingMode {
        self.overrides.get(project).copied().unwrap_or(self.mode)
    }
}

impl State for DistributionEnforcingState {
    fn is_enabled(&self) -> bool {
        self.mode != EnforcingMode::None || !self.overrides.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes() {
        assert_eq!("TRUE".parse::<EnforcingMode>().unwrap(), EnforcingMode::On);
        assert_eq!("off".parse::<EnforcingMode>().unwrap(), EnforcingMode::Off);
        assert_eq!(EnforcingMode::Detect.default_value(), None);
        assert!("sometimes".parse::<EnforcingMode>().is_err());
    }

    #[test]
    fn test_per_project_override() {
        let props: UserProperties = [(ENFORCE_SKIP, "on"), ("enforceSkip.org.foo:bar", "none")]
            .into_iter()
            .collect();
        let state = DistributionEnforcingState::new(&props).unwrap();
        assert!(state.is_enabled());
        assert_eq!(state.mode_for(&ProjectRef::new("org.foo", "bar")), EnforcingMode::None);
        assert_eq!(state.mode_for(&ProjectRef::new("org.foo", "baz")), EnforcingMode::On);
    }

    #[test]
    fn test_disabled_by_default() {
        assert!(!DistributionEnforcingState::new(&UserProperties::new()).unwrap().is_enabled());
    }
}
