use super::State;
use crate::config::{ConfigValue, UserProperties};
use crate::error::Result;

pub const REPO_REPORTING_REMOVAL: &str = "repoReportingRemoval";
pub const IGNORE_LOCALHOST: &str = "repoRemovalIgnorelocalhost";
pub const REMOVAL_BACKUP: &str = "repoRemovalBackup";

/// `repoRemovalBackup` value selecting `settings.xml` in the target directory
pub const DEFAULT_BACKUP: &str = "settings.xml";

pub(crate) const CONFIG_VALUES: &[ConfigValue] = &[
    ConfigValue::new(REPO_REPORTING_REMOVAL, "misc.html#repository-and-reporting-removal"),
    ConfigValue::new(IGNORE_LOCALHOST, "misc.html#repository-and-reporting-removal"),
    ConfigValue::new(REMOVAL_BACKUP, "misc.html#repository-and-reporting-removal"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoReportingState {
    pub removal: bool,
    /// Keep repositories pointing at the local machine
    pub ignore_local: bool,
    /// Where removed repositories are backed up as a settings file
    pub backup_settings: Option<String>,
}

impl RepoReportingState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        Ok(Self {
            removal: props.get_bool(REPO_REPORTING_REMOVAL, false),
            ignore_local: props.get_bool(IGNORE_LOCALHOST, false),
            backup_settings: props.get_non_empty(REMOVAL_BACKUP).map(str::to_string),
        })
    }
}

impl State for RepoReportingState {
    fn is_enabled(&self) -> bool {
        self.removal
    }
}
