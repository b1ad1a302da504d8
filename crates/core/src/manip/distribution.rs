use super::{Manipulator, ManipulatorKind};
use crate::config::parse_bool;
use crate::error::Result;
use crate::pom::{DEFAULT_PLUGIN_GROUP, SkipContainer, SkipReference, base};
use crate::session::Session;
use crate::state::{DistributionEnforcingState, EnforcingMode};
use crate::types::ProjectRef;
use crate::utils::ProfileFilter;
use crate::xml::Element;
use std::collections::BTreeSet;
use tracing::{debug, warn};

const INSTALL_PLUGIN: &str = "maven-install-plugin";
const DEPLOY_PLUGIN: &str = "maven-deploy-plugin";
const DEFAULT_INSTALL_EXECUTION: &str = "default-install";
const DEPLOY_SKIP_PROPERTY: &str = "maven.deploy.skip";

/// Forces the `<skip>` flags of the install and deploy plugins to one value.
///
/// The value comes from the enforcing mode, or with `detect` from the
/// install plugin's own plugin-wide or `default-install` flag. Profiles get
/// the value resolved for the main model.
#[derive(Debug, Default, Clone, Copy)]
pub struct DistributionEnforcingManipulator;

fn plugin_key(artifact: &str) -> ProjectRef {
    ProjectRef::new(DEFAULT_PLUGIN_GROUP, artifact)
}

/// Value of an install flag held by the plugin-wide configuration or the
/// `default-install` execution, when it is not empty
fn detect(reference: &SkipReference<'_>) -> Option<bool> {
    let detectable = match &reference.container {
        SkipContainer::Plugin => true,
        SkipContainer::Execution(id) => id == DEFAULT_INSTALL_EXECUTION,
    };
    let text = reference.node.text();
    (detectable && !text.is_empty()).then(|| parse_bool(&text))
}

fn set_flag(reference: &mut SkipReference<'_>, skip: bool) -> bool {
    let old = reference.node.text();
    let new = skip.to_string();
    reference.node.set_text(new.as_str());
    old != new
}

/// Give every declaration of `key` a plugin-wide `<skip>`
fn add_plugin_skip(model_base: &mut Element, key: &ProjectRef, skip: bool) -> bool {
    let mut added = false;
    for plugin in base::plugins_by_key_mut(model_base, key) {
        plugin
            .get_or_create_child("configuration")
            .append_child(Element::with_text("skip", skip.to_string()));
        added = true;
    }
    added
}

/// Enforce `base_value` (or the detected value) on one model base. Returns
/// the enforced value and whether the base changed.
fn enforce_skip_flag(model_base: &mut Element, base_value: Option<bool>, detect_value: bool) -> (Option<bool>, bool) {
    let install = plugin_key(INSTALL_PLUGIN);
    let mut install_refs = base::skip_references_mut(model_base, &install);

    let mut value = base_value;
    if detect_value && value.is_none() {
        value = if install_refs.is_empty() {
            Some(false)
        } else {
            install_refs.iter().find_map(detect)
        };
    }
    let Some(skip) = value else {
        warn!("No setting to enforce for skip-flag! Aborting enforcement...");
        return (None, false);
    };

    let mut changed = false;
    for reference in &mut install_refs {
        changed |= set_flag(reference, skip);
    }
    drop(install_refs);

    let deploy = plugin_key(DEPLOY_PLUGIN);
    let mut deploy_refs = base::skip_references_mut(model_base, &deploy);
    let has_deploy_flags = !deploy_refs.is_empty();
    for reference in &mut deploy_refs {
        changed |= set_flag(reference, skip);
    }
    drop(deploy_refs);

    if !has_deploy_flags && skip {
        changed |= add_plugin_skip(model_base, &deploy, skip);
    }
    (Some(skip), changed)
}

impl Manipulator for DistributionEnforcingManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::DistributionEnforcing
    }

    fn init(&self, session: &mut Session) -> Result<()> {
        let state = DistributionEnforcingState::new(session.user_properties())?;
        session.set_state(state);
        Ok(())
    }

    fn is_enabled(&self, session: &Session) -> bool {
        session.is_state_enabled::<DistributionEnforcingState>()
    }

    fn apply_changes(&self, session: &mut Session) -> Result<BTreeSet<ProjectRef>> {
        let state = session.require_state::<DistributionEnforcingState>()?.clone();
        let profiles = ProfileFilter::from_session(session);
        let mut changed = BTreeSet::new();

        for project in session.projects_mut().iter_mut() {
            let key = project.key();
            let mode = state.mode_for(&key);
            if mode == EnforcingMode::None {
                debug!("Install/Deploy skip-flag enforcement is disabled for {}", key);
                continue;
            }
            debug!("Applying skip-flag enforcement mode of {} to {}", mode, key);

            let (base_value, mut touched) =
                enforce_skip_flag(project.model_mut().root_mut(), mode.default_value(), true);
            for profile in profiles.profiles_mut(project.model_mut()) {
                touched |= enforce_skip_flag(profile, base_value, false).1;
            }

            if base_value == Some(false) && project.model().property(DEPLOY_SKIP_PROPERTY).is_some() {
                touched |= project.model_mut().set_property(DEPLOY_SKIP_PROPERTY, "false");
            }
            if touched {
                changed.insert(key);
            }
        }
        Ok(changed)
    }
}
