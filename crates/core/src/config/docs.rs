//! Markdown index of every documented property

use super::ConfigValue;
use crate::error::Result;
use crate::state::config_values;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

/// Default output, relative to the project directory
pub const DEFAULT_INDEX: &str = "target/property-index.md";

/// Sorted `name -> value` for every documented key
pub fn lookup() -> BTreeMap<&'static str, ConfigValue> {
    index(&config_values())
}

/// Names of the deprecated keys
pub fn deprecated() -> impl Iterator<Item = &'static str> {
    config_values()
        .into_iter()
        .filter(|value| value.deprecated)
        .map(|value| value.name)
}

fn index(values: &[ConfigValue]) -> BTreeMap<&'static str, ConfigValue> {
    values.iter().map(|value| (value.name, *value)).collect()
}

pub fn render_index(values: &[ConfigValue]) -> String {
    let mut out = String::from("---\ntitle: \"Index of Properties\"\n---\n\n");
    for (name, value) in index(values) {
        let deprecated = if value.deprecated { "\t(deprecated)" } else { "" };
        let _ = writeln!(out, "  * [{name}]({}){deprecated}", value.doc_index);
    }
    out
}

/// Render every documented key into `path`
pub fn write_index(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_index(&config_values()))?;
    info!("Wrote property index to {}", path.display());
    Ok(())
}
