//! Resolution of `${...}` expressions through the reactor

use crate::pom::Project;
use crate::types::ProjectRef;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

static EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

/// Nesting limit for expressions that expand to further expressions
const MAX_DEPTH: usize = 10;

/// Index of the project with coordinates `key`
pub fn project_index(projects: &[Project], key: &ProjectRef) -> Option<usize> {
    projects.iter().position(|p| &p.key() == key)
}

/// `index` followed by its in-reactor ancestors, nearest first
pub fn lineage(projects: &[Project], index: usize) -> Vec<usize> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(index);
    while let Some(i) = current {
        if !seen.insert(i) {
            break;
        }
        chain.push(i);
        current = projects[i]
            .reactor_parent()
            .and_then(|parent| project_index(projects, parent));
    }
    chain
}

/// The property name when `value` is exactly one `${name}` expression
pub fn property_reference(value: &str) -> Option<&str> {
    let inner = value.trim().strip_prefix("${")?.strip_suffix('}')?;
    (!inner.is_empty() && !inner.contains(['$', '{', '}'])).then_some(inner)
}

/// The nearest project in the lineage of `index` declaring property `key`
pub fn property_owner(projects: &[Project], index: usize, key: &str) -> Option<usize> {
    lineage(projects, index)
        .into_iter()
        .find(|&i| projects[i].model().property(key).is_some())
}

/// Expand `${...}` expressions in `value` using the project's properties,
/// those of its reactor ancestors and the `project.*` built-ins. Unknown
/// expressions are left untouched.
pub fn resolve_inherited(projects: &[Project], index: usize, value: &str) -> String {
    let mut resolved = value.to_string();
    for _ in 0..MAX_DEPTH {
        if !resolved.contains("${") {
            break;
        }
        let next = EXPRESSION
            .replace_all(&resolved, |caps: &Captures<'_>| {
                lookup(projects, index, &caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();
        if next == resolved {
            break;
        }
        resolved = next;
    }
    resolved
}

fn lookup(projects: &[Project], index: usize, name: &str) -> Option<String> {
    let project = &projects[index];
    match name {
        "project.version" | "pom.version" | "version" => Some(project.version()),
        "project.groupId" | "pom.groupId" => Some(project.group_id()),
        "project.artifactId" | "pom.artifactId" => Some(project.artifact_id()),
        "project.parent.version" | "parent.version" => {
            project.model().parent().map(|parent| parent.version)
        }
        _ => lineage(projects, index)
            .into_iter()
            .find_map(|i| projects[i].model().property(name)),
    }
}
