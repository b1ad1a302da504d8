//! Maven project model on top of the XML tree

pub mod base;
mod io;
mod model;
mod project;

pub use base::{Dependency, SkipContainer, SkipReference};
pub use io::{MARKER_FILE, PomIo};
pub use model::{DEFAULT_PLUGIN_GROUP, Model, ParentRef};
pub use project::Project;
