//! Configuration: the flat user property bag, the side-car file beside the
//! root POM and the index of documented properties

mod config_io;
pub mod docs;
mod properties;

pub use config_io::{CONFIG_DIR, CONFIG_FILES, ConfigIo, ConfigScalar, SEALED_PROPERTY, SideCarConfig};
pub use properties::UserProperties;
pub(crate) use properties::parse_bool;

/// A documented property key, declared next to the state that reads it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigValue {
    pub name: &'static str,
    /// Page (and anchor) of the user guide describing the key
    pub doc_index: &'static str,
    pub deprecated: bool,
}

impl ConfigValue {
    pub const fn new(name: &'static str, doc_index: &'static str) -> Self {
        Self {
            name,
            doc_index,
            deprecated: false,
        }
    }

    pub const fn deprecated(name: &'static str, doc_index: &'static str) -> Self {
        Self {
            name,
            doc_index,
            deprecated: true,
        }
    }
}
