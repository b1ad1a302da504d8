//! Version alignment of dependencies and plugins against a coordinate map

mod strict;

pub use strict::check_strict_value;

use crate::error::{Error, Result};
use crate::pom::{Project, base};
use crate::session::Session;
use crate::state::{CommonState, VersioningState};
use crate::types::{ProjectRef, WildcardMap};
use crate::utils::{ProfileFilter, property_owner, property_reference, resolve_inherited};
use crate::xml::Element;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Which declarations of a model base are aligned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declarations {
    Dependencies,
    Plugins,
}

impl Declarations {
    fn label(self) -> &'static str {
        match self {
            Self::Dependencies => "dependency",
            Self::Plugins => "plugin",
        }
    }

    fn key(self, element: &Element) -> Option<ProjectRef> {
        match self {
            Self::Dependencies => base::dependency_key(element),
            Self::Plugins => base::plugin_key(element),
        }
    }

    fn in_base(self, model_base: &Element) -> Vec<&Element> {
        match self {
            Self::Dependencies => base::dependencies(model_base)
                .chain(base::managed_dependencies(model_base))
                .collect(),
            Self::Plugins => base::managed_plugins(model_base)
                .chain(base::plugins(model_base))
                .collect(),
        }
    }

    fn in_base_mut(self, model_base: &mut Element) -> Vec<&mut Element> {
        match self {
            Self::Dependencies => base::all_dependencies_mut(model_base),
            Self::Plugins => base::all_plugins_mut(model_base),
        }
    }
}

/// `strictAlignment` settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictPolicy {
    pub suffix: String,
    pub ignore_suffix: bool,
    pub fail: bool,
}

impl StrictPolicy {
    /// `None` unless strict alignment was requested
    pub fn from_session(session: &Session) -> Option<Self> {
        let common = session.state::<CommonState>()?;
        if !common.strict_alignment {
            return None;
        }
        let suffix = session
            .state::<VersioningState>()
            .and_then(|v| v.configured_suffix())
            .unwrap_or_default()
            .to_string();
        Some(Self {
            suffix,
            ignore_suffix: common.strict_ignore_suffix,
            fail: common.strict_violation_fails,
        })
    }
}

/// Versions collected from remote POMs, listed first wins, with `overrides`
/// applied on top
pub fn merge_versions(
    remote: Vec<Vec<(ProjectRef, String)>>,
    overrides: &WildcardMap<String>,
) -> WildcardMap<String> {
    let mut versions = WildcardMap::new();
    for entries in remote.into_iter().rev() {
        for (key, version) in entries {
            versions.put(&key, version);
        }
    }
    for (key, version) in overrides.iter() {
        versions.put(&key, version.clone());
    }
    versions
}

/// Rewrites declared versions to the ones in a [`WildcardMap`]. An empty
/// mapped version excludes the coordinate.
pub struct Aligner<'a> {
    declarations: Declarations,
    versions: &'a WildcardMap<String>,
    strict: Option<StrictPolicy>,
    profiles: ProfileFilter,
}

impl<'a> Aligner<'a> {
    pub fn new(declarations: Declarations, versions: &'a WildcardMap<String>) -> Self {
        Self {
            declarations,
            versions,
            strict: None,
            profiles: ProfileFilter::all(),
        }
    }

    pub fn with_strict(mut self, strict: Option<StrictPolicy>) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_profiles(mut self, profiles: ProfileFilter) -> Self {
        self.profiles = profiles;
        self
    }

    fn target(&self, key: &ProjectRef) -> Option<&str> {
        self.versions
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn accept(&self, key: &ProjectRef, old: &str, new: &str) -> Result<bool> {
        let Some(strict) = &self.strict else {
            return Ok(true);
        };
        if check_strict_value(old, new, &strict.suffix, strict.ignore_suffix) {
            return Ok(true);
        }
        let message = format!(
            "Replacing original version {old} of {} {key} with {new} violates the strict alignment rule",
            self.declarations.label()
        );
        if strict.fail {
            Err(Error::Manipulation(message))
        } else {
            warn!("{message}; leaving it unchanged");
            Ok(false)
        }
    }

    /// Align every project, returning the ones that changed
    pub fn align(&self, projects: &mut [Project]) -> Result<BTreeSet<ProjectRef>> {
        let property_updates = self.plan_property_updates(projects)?;
        let mut changed = BTreeSet::new();
        let declarations = self.declarations;

        for project in projects.iter_mut() {
            let name = project.key();
            let touched = self.profiles.for_each_base_mut(project.model_mut(), |model_base| {
                let mut touched = false;
                for element in declarations.in_base_mut(model_base) {
                    let (Some(key), Some(current)) =
                        (declarations.key(element), element.child_text("version"))
                    else {
                        continue;
                    };
                    if current.is_empty() || current.contains("${") {
                        continue;
                    }
                    let Some(target) = self.target(&key) else {
                        continue;
                    };
                    if current == target || !self.accept(&key, &current, target)? {
                        continue;
                    }
                    info!(
                        "Updating {} {} version {} to {} in {}",
                        declarations.label(),
                        key,
                        current,
                        target,
                        name
                    );
                    element.set_child_text("version", target);
                    touched = true;
                }
                Ok(touched)
            })?;
            if touched {
                changed.insert(project.key());
            }
        }

        for (owner, property, value) in property_updates {
            let project = &mut projects[owner];
            if project.model_mut().set_property(&property, &value) {
                info!("Updating property {} to {} in {}", property, value, project.key());
                changed.insert(project.key());
            }
        }
        Ok(changed)
    }

    /// `(owning project, property, version)` for declarations whose version
    /// is a `${property}` reference
    fn plan_property_updates(&self, projects: &[Project]) -> Result<Vec<(usize, String, String)>> {
        let mut updates: Vec<(usize, String, String)> = Vec::new();

        for (index, project) in projects.iter().enumerate() {
            let model = project.model();
            let bases = std::iter::once(model.root()).chain(self.profiles.profiles(model));
            for model_base in bases {
                for element in self.declarations.in_base(model_base) {
                    let (Some(key), Some(current)) =
                        (self.declarations.key(element), element.child_text("version"))
                    else {
                        continue;
                    };
                    let Some(property) = property_reference(&current) else {
                        continue;
                    };
                    let Some(target) = self.target(&key) else {
                        continue;
                    };
                    let resolved = resolve_inherited(projects, index, &current);
                    if resolved == target || !self.accept(&key, &resolved, target)? {
                        continue;
                    }
                    let Some(owner) = property_owner(projects, index, property) else {
                        warn!(
                            "Unable to find property {} holding the version of {} in {}",
                            property,
                            key,
                            project.key()
                        );
                        continue;
                    };
                    let existing = updates
                        .iter()
                        .find(|(o, p, _)| *o == owner && p == property)
                        .map(|(_, _, v)| v.clone());
                    match existing {
                        Some(existing) if existing != target => warn!(
                            "Property {} is shared by {}s aligned to {} and {}; keeping {}",
                            property,
                            self.declarations.label(),
                            existing,
                            target,
                            existing
                        ),
                        Some(_) => {}
                        None => {
                            debug!("Property {} of {} resolves {}", property, key, resolved);
                            updates.push((owner, property.to_string(), target.to_string()));
                        }
                    }
                }
            }
        }
        Ok(updates)
    }
}
