//! Coordinate types shared across the engine

mod coordinates;
mod wildcard_map;

pub use coordinates::{ProjectRef, ProjectVersionRef, WILDCARD};
pub use wildcard_map::WildcardMap;
