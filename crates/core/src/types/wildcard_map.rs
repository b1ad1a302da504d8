//! Coordinate map where `group:*` stands for every artifact of a group

use super::{ProjectRef, WILDCARD};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

#[derive(Debug, Clone)]
enum Inner<V> {
    Wildcard(V),
    Explicit(BTreeMap<String, V>),
}

/// Map keyed by [`ProjectRef`] that understands wildcard artifact ids.
///
/// Each group is stored either as a single wildcard value or as a set of
/// explicit artifact values, never both.
#[derive(Debug, Clone)]
pub struct WildcardMap<V> {
    groups: HashMap<String, Inner<V>>,
}

impl<V> Default for WildcardMap<V> {
    fn default() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }
}

impl<V: Clone + std::fmt::Display> WildcardMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `key` is stored explicitly or a wildcard exists for its group.
    /// A wildcard key only matches a stored wildcard.
    pub fn contains_key(&self, key: &ProjectRef) -> bool {
        match self.groups.get(&key.group_id) {
            Some(Inner::Wildcard(_)) => true,
            Some(Inner::Explicit(artifacts)) => {
                !key.is_wildcard() && artifacts.contains_key(&key.artifact_id)
            }
            None => false,
        }
    }

    pub fn get(&self, key: &ProjectRef) -> Option<&V> {
        match self.groups.get(&key.group_id)? {
            Inner::Wildcard(value) => Some(value),
            Inner::Explicit(artifacts) => artifacts.get(&key.artifact_id),
        }
    }

    pub fn put(&mut self, key: &ProjectRef, value: V) {
        let group = key.group_id.clone();

        if key.is_wildcard() {
            if let Some(Inner::Explicit(artifacts)) = self.groups.get(&group) {
                if !artifacts.is_empty() {
                    let evicted: Vec<&str> = artifacts.keys().map(String::as_str).collect();
                    warn!(
                        "Emptying map with keys [{}] as replacing with wildcard mapping {}",
                        evicted.join(", "),
                        key
                    );
                }
            }
            self.groups.insert(group, Inner::Wildcard(value));
            return;
        }

        match self
            .groups
            .entry(group)
            .or_insert_with(|| Inner::Explicit(BTreeMap::new()))
        {
            Inner::Wildcard(_) => {
                warn!(
                    "Unable to add {} with value {} as wildcard mapping for {} already exists",
                    key, value, key.group_id
                );
            }
            Inner::Explicit(artifacts) => {
                artifacts.insert(key.artifact_id.clone(), value);
            }
        }
    }

    /// Remove an explicit entry, or the wildcard when `key` is a wildcard
    pub fn remove(&mut self, key: &ProjectRef) -> Option<V> {
        let stored_wildcard = matches!(self.groups.get(&key.group_id)?, Inner::Wildcard(_));

        if stored_wildcard {
            if !key.is_wildcard() {
                return None;
            }
            return match self.groups.remove(&key.group_id) {
                Some(Inner::Wildcard(value)) => Some(value),
                _ => None,
            };
        }

        let Some(Inner::Explicit(artifacts)) = self.groups.get_mut(&key.group_id) else {
            return None;
        };
        let removed = artifacts.remove(&key.artifact_id);
        if artifacts.is_empty() {
            self.groups.remove(&key.group_id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.groups
            .values()
            .map(|inner| match inner {
                Inner::Wildcard(_) => 1,
                Inner::Explicit(artifacts) => artifacts.len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored entries; wildcards are reported with artifact id `*`
    pub fn iter(&self) -> impl Iterator<Item = (ProjectRef, &V)> {
        self.groups.iter().flat_map(|(group, inner)| {
            let entries: Vec<(ProjectRef, &V)> = match inner {
                Inner::Wildcard(value) => vec![(ProjectRef::new(group, WILDCARD), value)],
                Inner::Explicit(artifacts) => artifacts
                    .iter()
                    .map(|(artifact, value)| (ProjectRef::new(group, artifact), value))
                    .collect(),
            };
            entries
        })
    }
}
