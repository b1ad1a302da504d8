use super::State;
use crate::config::{ConfigValue, UserProperties};
use crate::error::{Error, Result};
use regex::Regex;

pub const SUFFIX_STRIP: &str = "versionSuffixStrip";
pub const DEFAULT_SUFFIX_STRIP: &str = r"(.*)(.jbossorg-\d+)$";

/// Value of `versionSuffixStrip` that turns stripping off
const DISABLED: &str = "NONE";

pub(crate) const CONFIG_VALUES: &[ConfigValue] =
    &[ConfigValue::new(SUFFIX_STRIP, "project-version-manip.html#suffix-stripping")];

/// Pattern stripping a suffix from project versions. Capture group 1 is
/// the version to keep.
#[derive(Debug, Clone, Default)]
pub struct SuffixState {
    pub pattern: Option<Regex>,
}

impl SuffixState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        let pattern = match props.get(SUFFIX_STRIP).map(str::trim) {
            None => None,
            Some(value) if value.eq_ignore_ascii_case(DISABLED) => None,
            Some("") => Some(compile(DEFAULT_SUFFIX_STRIP)?),
            Some(value) => Some(compile(value)?),
        };
        Ok(Self { pattern })
    }

    /// Version with the suffix removed, if the pattern matches
    pub fn strip(&self, version: &str) -> Option<String> {
        let captures = self.pattern.as_ref()?.captures(version)?;
        let kept = captures.get(1)?.as_str();
        (kept != version).then(|| kept.to_string())
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::Config(format!("Invalid {SUFFIX_STRIP} pattern '{pattern}': {e}")))
}

impl State for SuffixState {
    fn is_enabled(&self) -> bool {
        self.pattern.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(value: &str) -> SuffixState {
        let props: UserProperties = [(SUFFIX_STRIP, value)].into_iter().collect();
        SuffixState::new(&props).unwrap()
    }

    #[test]
    fn test_default_pattern() {
        let state = state("");
        assert_eq!(state.strip("1.0.0.jbossorg-3").as_deref(), Some("1.0.0"));
        assert_eq!(state.strip("1.0.0"), None);
    }

    #[test]
    fn test_none_disables() {
        assert!(!state("NONE").is_enabled());
        assert!(!SuffixState::new(&UserProperties::new()).unwrap().is_enabled());
    }

    #[test]
    fn test_custom_pattern() {
        let state = state(r"(.*)(-foo)$");
        assert_eq!(state.strip("2.1-foo").as_deref(), Some("2.1"));
        let props: UserProperties = [(SUFFIX_STRIP, "(unclosed")].into_iter().collect();
        assert!(SuffixState::new(&props).is_err());
    }
}
