//! Drives one manipulation run over a reactor

use crate::config::docs;
use crate::error::Result;
use crate::manip::{ManipulatorKind, ManipulatorRegistry};
use crate::pom::{MARKER_FILE, PomIo};
use crate::session::Session;
use crate::types::ProjectRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Manipulation report, relative to the execution-root directory
pub const REPORT_FILE: &str = "target/manipulation.json";

/// Before and after coordinates of one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub pom: String,
    pub original: String,
    pub result: String,
    pub changed: bool,
}

/// What a run did, written to [`REPORT_FILE`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManipulationReport {
    /// Names of the manipulators that ran, in execution order
    pub manipulators: Vec<String>,
    pub projects: Vec<ProjectReport>,
}

#[derive(Debug, Clone)]
pub struct ManipulationManager {
    registry: ManipulatorRegistry,
    pom_io: PomIo,
}

impl Default for ManipulationManager {
    fn default() -> Self {
        Self::new(ManipulatorRegistry::default())
    }
}

impl ManipulationManager {
    pub fn new(registry: ManipulatorRegistry) -> Self {
        Self {
            registry,
            pom_io: PomIo::new(),
        }
    }

    pub fn registry(&self) -> &ManipulatorRegistry {
        &self.registry
    }

    /// Build and register the state of every manipulator
    pub fn init(&self, session: &mut Session) -> Result<()> {
        for key in docs::deprecated() {
            if session.user_properties().contains_key(key) {
                warn!("Property {} is deprecated; see the property index for its replacement", key);
            }
        }
        for manipulator in self.registry.ordered() {
            debug!("Initialising {}", manipulator.kind());
            manipulator.init(session)?;
        }
        Ok(())
    }

    /// Load the reactor unless the session already holds one, run every
    /// enabled manipulator in order and write the results.
    ///
    /// Returns `None` when the session is disabled or a previous run left
    /// its marker behind.
    pub fn scan_and_apply(&self, session: &mut Session) -> Result<Option<ManipulationReport>> {
        if !session.is_enabled() {
            info!("Manipulation engine disabled via command-line option");
            return Ok(None);
        }
        let root_dir = session.root_dir();
        let marker = root_dir.join(MARKER_FILE);
        if marker.exists() {
            info!("Skipping manipulation as previous execution found.");
            return Ok(None);
        }

        if session.projects().is_empty() {
            let projects = self.pom_io.parse_project(&session.request().root_pom)?;
            session.set_projects(projects);
        }

        let mut changed = BTreeSet::new();
        let mut executed = Vec::new();
        for manipulator in self.registry.ordered() {
            let kind = manipulator.kind();
            if !manipulator.is_enabled(session) {
                debug!("Skipping disabled manipulator {}", kind);
                continue;
            }
            info!("Running manipulator {} (index {})", kind, kind.index());
            let touched = manipulator.apply_changes(session)?;
            debug!("{} changed {} project(s)", kind, touched.len());
            changed.extend(touched);
            executed.push(kind);
        }

        self.pom_io.write_projects(session.projects(), &changed)?;
        info!("Maven-Manipulation-Extension: Finished. {} project(s) changed", changed.len());

        let report = report(session, &executed, &changed, &root_dir);
        write_outputs(&root_dir, &marker, &report)?;
        Ok(Some(report))
    }
}

fn report(
    session: &Session,
    executed: &[ManipulatorKind],
    changed: &BTreeSet<ProjectRef>,
    root_dir: &Path,
) -> ManipulationReport {
    let projects = session
        .projects()
        .iter()
        .map(|project| {
            let pom = project.pom();
            ProjectReport {
                pom: pom.strip_prefix(root_dir).unwrap_or(pom).display().to_string(),
                original: project.original_gav().to_string(),
                result: project.gav().to_string(),
                changed: changed.contains(&project.key()),
            }
        })
        .collect();
    ManipulationReport {
        manipulators: executed.iter().map(|kind| kind.name().to_string()).collect(),
        projects,
    }
}

fn write_outputs(root_dir: &Path, marker: &Path, report: &ManipulationReport) -> Result<()> {
    if let Some(dir) = marker.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(marker, "")?;

    let path = root_dir.join(REPORT_FILE);
    let mut contents = serde_json::to_string_pretty(report)?;
    contents.push('\n');
    fs::write(&path, contents)?;
    debug!("Wrote marker {} and report {}", marker.display(), path.display());
    Ok(())
}
