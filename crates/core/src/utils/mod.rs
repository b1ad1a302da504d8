//! Helpers shared by the manipulators

pub mod json_path;
pub mod profiles;
pub mod properties;

pub use profiles::ProfileFilter;
pub use properties::{
    lineage, project_index, property_owner, property_reference, resolve_inherited,
};
