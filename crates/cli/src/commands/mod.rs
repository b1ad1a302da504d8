pub mod apply;
pub mod docs;

pub use apply::{ApplyArgs, apply_command};
pub use docs::docs_command;
