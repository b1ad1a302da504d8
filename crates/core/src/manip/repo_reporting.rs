use super::{Manipulator, ManipulatorKind};
use crate::error::Result;
use crate::pom::base;
use crate::session::Session;
use crate::state::{DEFAULT_BACKUP, RepoReportingState};
use crate::types::ProjectRef;
use crate::utils::ProfileFilter;
use crate::xml::{Document, Element};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::{Host, Url};

const BACKUP_PROFILE_PREFIX: &str = "removed-by-pme-";

const SETTINGS_SKELETON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<settings xmlns="http://maven.apache.org/SETTINGS/1.0.0" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://maven.apache.org/SETTINGS/1.0.0 http://maven.apache.org/xsd/settings-1.0.0.xsd">
  <profiles>
  </profiles>
  <activeProfiles>
  </activeProfiles>
</settings>
"#;

/// Strips `<repositories>`, `<pluginRepositories>` and `<reporting>` from
/// every project and profile, optionally backing the repositories up into a
/// settings file
#[derive(Debug, Default, Clone, Copy)]
pub struct RepoReportingManipulator;

/// A removed repository together with the section it came from
type Removed = (&'static str, &'static str, Element);

/// `file:` URLs and URLs on a loopback host
fn is_local(location: &str) -> bool {
    let Ok(url) = Url::parse(location.trim()) else {
        return false;
    };
    if url.scheme() == "file" {
        return true;
    }
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

fn strip_base(model_base: &mut Element, ignore_local: bool, removed: &mut Vec<Removed>) -> bool {
    let mut changed = false;
    for (section, entry) in base::REPOSITORY_SECTIONS {
        if ignore_local {
            let Some(list) = model_base.child_mut(section) else {
                continue;
            };
            let gone = list.remove_elements_where(|repo| {
                repo.name == entry && !is_local(&repo.child_text("url").unwrap_or_default())
            });
            let now_empty = list.elements().next().is_none();
            changed |= !gone.is_empty();
            removed.extend(gone.into_iter().map(|repo| (section, entry, repo)));
            if now_empty {
                model_base.remove_children_named(section);
                changed = true;
            }
        } else {
            for list in model_base.remove_children_named(section) {
                changed = true;
                removed.extend(list.children_named(entry).map(|repo| (section, entry, repo.clone())));
            }
        }
    }
    changed |= !model_base.remove_children_named("reporting").is_empty();
    changed
}

fn backup_profile(key: &ProjectRef, removed: &[Removed]) -> Element {
    let mut profile = Element::new("profile").with_child(Element::with_text(
        "id",
        format!("{BACKUP_PROFILE_PREFIX}{key}"),
    ));
    for (section, _, repository) in removed {
        profile
            .get_or_create_child(section)
            .append_child(base::strip_layout(repository));
    }
    profile
}

impl RepoReportingManipulator {
    fn backup_path(session: &Session, backup: &str) -> PathBuf {
        if backup == DEFAULT_BACKUP {
            session.target_dir().join(DEFAULT_BACKUP)
        } else {
            session.root_dir().join(backup)
        }
    }

    fn write_backup(path: &Path, profiles: Vec<Element>) -> Result<()> {
        let mut settings = Document::parse(SETTINGS_SKELETON)?;
        for profile in profiles {
            let id = profile.child_text("id").unwrap_or_default();
            if let Some(list) = settings.root.child_mut("profiles") {
                list.append_child(profile);
            }
            if let Some(active) = settings.root.child_mut("activeProfiles") {
                active.append_child(Element::with_text("activeProfile", id));
            }
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, settings.to_xml_string()?)?;
        info!("Backed up removed repositories to {}", path.display());
        Ok(())
    }
}

impl Manipulator for RepoReportingManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::RepoReportingRemoval
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        let state = RepoReportingState::new(session.user_properties())?;
        session.set_state(state);
        Ok(())
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<RepoReportingState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let state = session.require_state::<RepoReportingState>()?.clone();
        let mut changed = BTreeSet::new();
        let mut backups = Vec::new();

        for project in session.projects_mut().iter_mut() {
            let key = project.key();
            let mut removed = Vec::new();
            let touched = ProfileFilter::all().for_each_base_mut(project.model_mut(), |model_base| {
                Ok(strip_base(model_base, state.ignore_local, &mut removed))
            })?;
            if touched {
                debug!("Removed {} repositories and any reporting from {}", removed.len(), key);
                changed.insert(key.clone());
            }
            if !removed.is_empty() {
                backups.push(backup_profile(&key, &removed));
            }
        }

        if let Some(backup) = state.backup_settings.as_deref() {
            if !backups.is_empty() {
                Self::write_backup(&Self::backup_path(session, backup), backups)?;
            }
        }
        Ok(changed)
    }
}
