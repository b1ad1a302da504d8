use super::{State, parse_gavs, parse_overrides};
use crate::config::{ConfigValue, UserProperties};
use crate::error::Result;
use crate::types::{ProjectVersionRef, WildcardMap};

pub const DEPENDENCY_MANAGEMENT: &str = "dependencyManagement";
pub const DEPENDENCY_OVERRIDE_PREFIX: &str = "dependencyOverride.";

pub(crate) const CONFIG_VALUES: &[ConfigValue] = &[
    ConfigValue::new(DEPENDENCY_MANAGEMENT, "dep-manip.html#remote-bom"),
    ConfigValue::new("dependencyOverride", "dep-manip.html#dependency-overrides"),
];

/// Dependency versions to align to: remote BOMs plus explicit overrides
#[derive(Debug, Clone, Default)]
pub struct DependencyState {
    pub remote_boms: Vec<ProjectVersionRef>,
    /// `g:a` (or `g:*`) to version; an empty version excludes the artifact
    pub overrides: WildcardMap<String>,
}

impl DependencyState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        Ok(Self {
            remote_boms: parse_gavs(props, DEPENDENCY_MANAGEMENT)?,
            overrides: parse_overrides(props, DEPENDENCY_OVERRIDE_PREFIX)?,
        })
    }
}

impl State for DependencyState {
    fn is_enabled(&self) -> bool {
        !self.remote_boms.is_empty() || !self.overrides.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProjectRef;

    #[test]
    fn test_overrides_and_exclusions() {
        let props: UserProperties = [
            ("dependencyOverride.org.foo:bar@*", "1.2"),
            ("dependencyOverride.org.baz:*@*", ""),
            ("dependencyManagement", "org.bom:bom:1.0"),
        ]
        .into_iter()
        .collect();

        let state = DependencyState::new(&props).unwrap();
        assert!(state.is_enabled());
        assert_eq!(state.remote_boms[0].to_string(), "org.bom:bom:1.0");
        assert_eq!(
            state.overrides.get(&ProjectRef::new("org.foo", "bar")).map(String::as_str),
            Some("1.2")
        );
        assert_eq!(
            state.overrides.get(&ProjectRef::new("org.baz", "any")).map(String::as_str),
            Some("")
        );
    }

    #[test]
    fn test_bad_override_key() {
        let props: UserProperties = [("dependencyOverride.nonsense", "1")].into_iter().collect();
        assert!(DependencyState::new(&props).is_err());
    }
}
