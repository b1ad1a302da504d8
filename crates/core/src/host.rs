//! Bridge between a host build tool's lifecycle and the manager

use crate::config::ConfigIo;
use crate::error::{Error, Result};
use crate::manager::{ManipulationManager, ManipulationReport};
use crate::session::Session;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

/// Fail the build right away instead of at [`HostEvent::ProjectsRead`]
pub const MANIPULATION_REQUIRED: &str = "manipulation.required";

/// Lifecycle points the host reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The host is about to read the POM tree; manipulation runs here
    ProjectDiscoveryStarted,
    /// The host has read the (manipulated) projects
    ProjectsRead,
}

/// Runs the manager once per build and turns failures into what the host
/// expects: an immediate error when `manipulation.required` is set, an
/// error at [`HostEvent::ProjectsRead`] otherwise
#[derive(Debug, Clone, Default)]
pub struct ManipulatingHost {
    manager: ManipulationManager,
    config_io: ConfigIo,
}

impl ManipulatingHost {
    pub fn new(manager: ManipulationManager) -> Self {
        Self {
            manager,
            config_io: ConfigIo::new(),
        }
    }

    pub fn on_event(&self, event: HostEvent, session: &mut Session) -> Result<Option<ManipulationReport>> {
        match event {
            HostEvent::ProjectDiscoveryStarted => self.project_discovery_started(session),
            HostEvent::ProjectsRead => self.after_projects_read(session).map(|()| None),
        }
    }

    fn project_discovery_started(&self, session: &mut Session) -> Result<Option<ManipulationReport>> {
        let required = session.user_properties().get_bool(MANIPULATION_REQUIRED, false);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(session)))
            .unwrap_or_else(|payload| Err(Error::Internal(panic_message(payload.as_ref()))));

        match outcome {
            Ok(report) => Ok(report),
            Err(err) => {
                error!("Extension failure: {}", err);
                if required {
                    Err(err)
                } else {
                    session.set_error(err);
                    Ok(None)
                }
            }
        }
    }

    fn run(&self, session: &mut Session) -> Result<Option<ManipulationReport>> {
        let root_dir = session.root_dir();
        self.config_io.apply(&root_dir, session.user_properties_mut())?;
        self.manager.init(session)?;
        self.manager.scan_and_apply(session)
    }

    /// Raise the error stored by an earlier, non-required failure
    pub fn after_projects_read(&self, session: &mut Session) -> Result<()> {
        match session.take_error() {
            Some(err) => Err(Error::Manipulation(format!("POM Manipulation failed: {err}"))),
            None => Ok(()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
