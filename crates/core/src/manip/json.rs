use super::{Manipulator, ManipulatorKind};
use crate::error::{Error, Result};
use crate::session::Session;
use crate::state::{JsonOperation, JsonState};
use crate::types::ProjectRef;
use crate::utils::json_path::{self, JsonPath};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Edits JSON files next to the build (`package.json` and friends). Only
/// touches those files, so no project is ever reported as changed.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonManipulator;

fn apply_operation(root_dir: &Path, operation: &JsonOperation) -> Result<()> {
    let file = root_dir.join(&operation.file);
    if !file.is_file() {
        return Err(Error::Model(format!(
            "Unable to locate JSON file {}",
            file.display()
        )));
    }
    let path = JsonPath::parse(&operation.path)?;
    let mut document: Value = serde_json::from_str(&fs::read_to_string(&file)?)?;

    let matches = path.select(&document);
    if matches.is_empty() {
        return Err(Error::Model(format!(
            "Unable to locate object in JSON file {} with path {path}",
            file.display()
        )));
    }

    if operation.update.is_empty() {
        // Later siblings shift when an array entry goes, so remove from the back
        for steps in matches.iter().rev() {
            json_path::remove(&mut document, steps);
        }
    } else {
        for steps in &matches {
            json_path::set(&mut document, steps, Value::String(operation.update.clone()));
        }
    }

    let mut contents = serde_json::to_string_pretty(&document)?;
    contents.push('\n');
    fs::write(&file, contents)?;
    debug!("Updated {} node(s) of {}", matches.len(), file.display());
    Ok(())
}

impl Manipulator for JsonManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::JsonUpdate
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        let state = JsonState::new(session.user_properties())?;
        session.set_state(state);
        Ok(())
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<JsonState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let state = session.require_state::<JsonState>()?;
        let root_dir = session.root_dir();
        for operation in &state.operations {
            info!("Applying {operation}");
            apply_operation(&root_dir, operation)?;
        }
        Ok(BTreeSet::new())
    }
}
