use anyhow::{Context, Result, bail};
use pme_core::{HostEvent, ManipulatingHost, ManipulationRequest, Session, UserProperties};
use std::path::PathBuf;
use tracing::debug;

use crate::display::format_report;

/// Options of `pme apply`
#[derive(Debug, Clone, Default)]
pub struct ApplyArgs {
    pub file: PathBuf,
    pub define: Vec<String>,
    pub profiles: Vec<String>,
    pub remote_repositories: Vec<String>,
    pub local_repository: Option<PathBuf>,
}

fn user_properties(definitions: &[String]) -> Result<UserProperties> {
    let mut properties = UserProperties::new();
    for definition in definitions {
        let (key, value) = UserProperties::parse_definition(definition)?;
        properties.insert(key, value);
    }
    Ok(properties)
}

fn request(args: &ApplyArgs) -> ManipulationRequest {
    let mut request = ManipulationRequest::new(&args.file).with_active_profiles(args.profiles.clone());
    if !args.remote_repositories.is_empty() {
        request = request.with_remote_repositories(args.remote_repositories.clone());
    }
    if let Some(local) = &args.local_repository {
        request = request.with_local_repository(local);
    }
    request
}

/// Act as the host: discover, manipulate, then surface any stored failure
pub fn apply_command(args: ApplyArgs) -> Result<()> {
    if !args.file.is_file() {
        bail!("POM file {} does not exist", args.file.display());
    }
    let properties = user_properties(&args.define).context("Invalid -D definition")?;
    let request = request(&args);
    debug!("Manipulating with {:?}", request);

    let mut session = Session::new(request, properties);
    let host = ManipulatingHost::default();
    let report = host
        .on_event(HostEvent::ProjectDiscoveryStarted, &mut session)
        .with_context(|| format!("Failed to manipulate {}", args.file.display()))?;
    host.on_event(HostEvent::ProjectsRead, &mut session)?;

    match report {
        Some(report) => print!("{}", format_report(&report)),
        None => println!("No manipulation performed"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_properties_from_definitions() {
        let properties = user_properties(&["a=1".to_string(), "flag".to_string(), "b=x=y".to_string()]).unwrap();
        assert_eq!(properties.get("a"), Some("1"));
        assert_eq!(properties.get("flag"), Some("true"));
        assert_eq!(properties.get("b"), Some("x=y"));
        assert!(user_properties(&["=oops".to_string()]).is_err());
    }
}
