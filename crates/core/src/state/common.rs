use super::State;
use crate::config::{ConfigValue, UserProperties};
use crate::error::Result;

pub const STRICT_ALIGNMENT: &str = "strictAlignment";
pub const STRICT_IGNORE_SUFFIX: &str = "strictAlignmentIgnoreSuffix";
pub const STRICT_VIOLATION_FAILS: &str = "strictViolationFails";
pub const SCAN_ACTIVE_PROFILES: &str = "scanActiveProfiles";

pub(crate) const CONFIG_VALUES: &[ConfigValue] = &[
    ConfigValue::new(STRICT_ALIGNMENT, "dep-manip.html#strict-mode-version-alignment"),
    ConfigValue::new(STRICT_IGNORE_SUFFIX, "dep-manip.html#strict-mode-version-alignment"),
    ConfigValue::new(STRICT_VIOLATION_FAILS, "dep-manip.html#strict-mode-version-alignment"),
    ConfigValue::new(SCAN_ACTIVE_PROFILES, "index.html#profiles"),
];

/// Settings shared by several manipulators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonState {
    pub strict_alignment: bool,
    pub strict_ignore_suffix: bool,
    pub strict_violation_fails: bool,
    /// Only touch profiles that are active for this build
    pub scan_active_profiles: bool,
}

impl CommonState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        Ok(Self {
            strict_alignment: props.get_bool(STRICT_ALIGNMENT, false),
            strict_ignore_suffix: props.get_bool(STRICT_IGNORE_SUFFIX, true),
            strict_violation_fails: props.get_bool(STRICT_VIOLATION_FAILS, false),
            scan_active_profiles: props.get_bool(SCAN_ACTIVE_PROFILES, false),
        })
    }
}

impl State for CommonState {
    fn is_enabled(&self) -> bool {
        true
    }
}
