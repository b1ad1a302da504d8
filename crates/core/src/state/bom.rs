use super::State;
use crate::config::{ConfigValue, UserProperties};
use crate::error::Result;

pub const BOM_BUILDER: &str = "bomBuilder";

pub(crate) const CONFIG_VALUES: &[ConfigValue] =
    &[ConfigValue::new(BOM_BUILDER, "dep-manip.html#bom-generation")];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BomState {
    pub enabled: bool,
}

impl BomState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        Ok(Self {
            enabled: props.get_bool(BOM_BUILDER, false),
        })
    }
}

impl State for BomState {
    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
