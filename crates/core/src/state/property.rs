use super::{State, parse_gavs};
use crate::config::{ConfigValue, UserProperties};
use crate::error::Result;
use crate::types::ProjectVersionRef;

pub const PROPERTY_MANAGEMENT: &str = "propertyManagement";

pub(crate) const CONFIG_VALUES: &[ConfigValue] =
    &[ConfigValue::new(PROPERTY_MANAGEMENT, "misc.html#property-override")];

/// Remote POMs whose properties are injected into the reactor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyState {
    pub remote_poms: Vec<ProjectVersionRef>,
}

impl PropertyState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        Ok(Self {
            remote_poms: parse_gavs(props, PROPERTY_MANAGEMENT)?,
        })
    }
}

impl State for PropertyState {
    fn is_enabled(&self) -> bool {
        !self.remote_poms.is_empty()
    }
}
