//! Selection of the profiles a manipulator may touch

use crate::error::Result;
use crate::pom::Model;
use crate::session::Session;
use crate::state::CommonState;
use crate::xml::Element;
use std::collections::HashSet;

/// Either every profile or only those active for this build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFilter {
    active: Option<HashSet<String>>,
}

impl ProfileFilter {
    pub fn all() -> Self {
        Self { active: None }
    }

    pub fn only(active: impl IntoIterator<Item = String>) -> Self {
        Self {
            active: Some(active.into_iter().collect()),
        }
    }

    /// Honour `scanActiveProfiles` against the requested profiles
    pub fn from_session(session: &Session) -> Self {
        let scan_active = session
            .state::<CommonState>()
            .map(|common| common.scan_active_profiles)
            .unwrap_or(false);
        if scan_active {
            Self::only(session.active_profiles().iter().cloned())
        } else {
            Self::all()
        }
    }

    pub fn includes(&self, profile: &Element) -> bool {
        match &self.active {
            None => true,
            Some(active) => profile
                .child_text("id")
                .is_some_and(|id| active.contains(&id)),
        }
    }

    pub fn profiles<'a>(&self, model: &'a Model) -> Vec<&'a Element> {
        model.profiles().filter(|p| self.includes(p)).collect()
    }

    pub fn profiles_mut<'a>(&self, model: &'a mut Model) -> Vec<&'a mut Element> {
        model.profiles_mut().filter(|p| self.includes(p)).collect()
    }

    /// Run `f` on the main model base and then on every included profile.
    /// Returns true when any call reported a change.
    pub fn for_each_base_mut<F>(&self, model: &mut Model, mut f: F) -> Result<bool>
    where
        F: FnMut(&mut Element) -> Result<bool>,
    {
        let mut changed = f(model.root_mut())?;
        for profile in self.profiles_mut(model) {
            changed |= f(profile)?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = r#"<project>
  <profiles>
    <profile>
      <id>one</id>
    </profile>
    <profile>
      <id>two</id>
    </profile>
  </profiles>
</project>"#;

    #[test]
    fn test_filter_active_profiles() {
        let model = Model::parse(POM).unwrap();
        assert_eq!(ProfileFilter::all().profiles(&model).len(), 2);

        let only_two = ProfileFilter::only(["two".to_string()]);
        let ids: Vec<_> = only_two
            .profiles(&model)
            .into_iter()
            .filter_map(|p| p.child_text("id"))
            .collect();
        assert_eq!(ids, vec!["two"]);
    }
}
