#![allow(dead_code)]

use pme::{HostEvent, ManipulatingHost, ManipulationReport, ManipulationRequest, Session};
use std::fs;
use std::path::{Path, PathBuf};

/// Write `contents` to `dir/relative`, creating parent directories
pub fn write(dir: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

pub fn read(dir: &Path, relative: &str) -> String {
    fs::read_to_string(dir.join(relative)).unwrap()
}

/// Session over `dir/pom.xml` resolving only from `dir/repository`
pub fn session(dir: &Path, props: &[(&str, &str)]) -> Session {
    let request = ManipulationRequest::new(dir.join("pom.xml"))
        .with_local_repository(dir.join("repository"))
        .with_remote_repositories(Vec::new());
    Session::new(request, props.iter().copied().collect())
}

/// Run one manipulation the way a host would, failing on stored errors
pub fn manipulate(dir: &Path, props: &[(&str, &str)]) -> pme::Result<Option<ManipulationReport>> {
    let mut session = session(dir, props);
    let host = ManipulatingHost::default();
    let report = host.on_event(HostEvent::ProjectDiscoveryStarted, &mut session)?;
    host.on_event(HostEvent::ProjectsRead, &mut session)?;
    Ok(report)
}
