//! Side-car configuration stored beside the root POM
//!
//! The file lives in `<root>/.mvn/` and is one of `pme.json`, `pme.toml` or
//! `pme.properties`. JSON and TOML files carry two tables:
//!
//! - `properties`: defaults the user may override on the command line
//! - `sealed`: values the user may not change
//!
//! A `.properties` file only holds overridable keys.

use super::UserProperties;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CONFIG_DIR: &str = ".mvn";
pub const CONFIG_FILES: [&str; 3] = ["pme.json", "pme.toml", "pme.properties"];

/// User property listing keys that overridable file entries may not set
pub const SEALED_PROPERTY: &str = "manipulation.sealed";

/// A scalar configuration value as written in JSON or TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigScalar {
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for ConfigScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigScalar::String(s) => write!(f, "{s}"),
            ConfigScalar::Bool(b) => write!(f, "{b}"),
            ConfigScalar::Integer(i) => write!(f, "{i}"),
            ConfigScalar::Float(x) => write!(f, "{x}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SideCarConfig {
    #[serde(default)]
    pub properties: BTreeMap<String, ConfigScalar>,
    #[serde(default)]
    pub sealed: BTreeMap<String, ConfigScalar>,
}

impl SideCarConfig {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.sealed.is_empty()
    }
}

/// Locates, parses and merges the side-car file
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigIo;

impl ConfigIo {
    pub fn new() -> Self {
        Self
    }

    /// The side-car file under `root_dir`, if any. Finding more than one
    /// candidate is a configuration error.
    pub fn find(&self, root_dir: &Path) -> Result<Option<PathBuf>> {
        let dir = root_dir.join(CONFIG_DIR);
        let found: Vec<PathBuf> = CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .filter(|path| path.is_file())
            .collect();

        match found.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(single.clone())),
            _ => Err(Error::Config(format!(
                "Found multiple configuration files in {}: {}",
                dir.display(),
                found
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    pub fn load(&self, path: &Path) -> Result<SideCarConfig> {
        let content = fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Unable to parse {}: {e}", path.display()))
            })?,
            _ => SideCarConfig {
                properties: parse_properties(&content)
                    .into_iter()
                    .map(|(k, v)| (k, ConfigScalar::String(v)))
                    .collect(),
                sealed: BTreeMap::new(),
            },
        };
        debug!("Loaded configuration {:?} from {}", config, path.display());
        Ok(config)
    }

    /// Find, load and merge the side-car file of `root_dir` into `properties`.
    /// Returns the file that was applied.
    pub fn apply(&self, root_dir: &Path, properties: &mut UserProperties) -> Result<Option<PathBuf>> {
        let Some(path) = self.find(root_dir)? else {
            return Ok(None);
        };
        let config = self.load(&path)?;
        self.merge(&config, properties)?;
        info!("Applied configuration from {}", path.display());
        Ok(Some(path))
    }

    /// Merge `config` into `properties`.
    ///
    /// Sealed file keys are used when absent from the user properties and
    /// must not be given a different value. For overridable keys the user
    /// value wins, and keys listed in `manipulation.sealed` are never taken
    /// from the file even when the user gives no value.
    pub fn merge(&self, config: &SideCarConfig, properties: &mut UserProperties) -> Result<()> {
        if let Some(key) = config.sealed.keys().find(|k| config.properties.contains_key(*k)) {
            return Err(Error::Config(format!(
                "Property {key} is declared both overridable and sealed"
            )));
        }

        let user_sealed = properties.get_list(SEALED_PROPERTY);

        for (key, value) in &config.sealed {
            let value = value.to_string();
            match properties.get(key) {
                None => {
                    properties.insert(key.as_str(), value);
                }
                Some(current) if current == value => {}
                Some(current) => {
                    return Err(Error::Config(format!(
                        "Property {key} is sealed with value '{value}' but was given '{current}'"
                    )));
                }
            }
        }

        for (key, value) in &config.properties {
            let value = value.to_string();
            if user_sealed.iter().any(|k| k == key) {
                debug!("Ignoring configured {key}='{value}' as the user sealed it");
                continue;
            }
            match properties.get(key) {
                None => {
                    properties.insert(key.as_str(), value);
                }
                Some(current) if current != value => {
                    warn!("User property {key}={current} overrides configured value '{value}'");
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Minimal `.properties` reader: `key=value` or `key: value` lines, `#` and
/// `!` comments
fn parse_properties(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let split = line.find(['=', ':'])?;
            let (key, value) = (&line[..split], &line[split + 1..]);
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}
