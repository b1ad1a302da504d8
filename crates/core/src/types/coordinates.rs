use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Artifact id that matches every artifact within a group
pub const WILDCARD: &str = "*";

/// A `groupId:artifactId` pair. The artifact id may be the wildcard `*`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectRef {
    pub group_id: String,
    pub artifact_id: String,
}

impl ProjectRef {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    /// Parse `g:a`
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.trim().split(':').collect();
        match parts.as_slice() {
            [g, a] if !g.is_empty() && !a.is_empty() => Ok(Self::new(*g, *a)),
            _ => Err(Error::Config(format!(
                "Invalid groupId:artifactId coordinate '{value}'"
            ))),
        }
    }

    /// Parse a comma separated list of `g:a` coordinates
    pub fn parse_list(value: &str) -> Result<Vec<Self>> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::parse)
            .collect()
    }

    pub fn is_wildcard(&self) -> bool {
        self.artifact_id == WILDCARD
    }

    /// True if this reference equals `other`, or is a wildcard for its group
    pub fn matches(&self, other: &ProjectRef) -> bool {
        self.group_id == other.group_id
            && (self.is_wildcard() || self.artifact_id == other.artifact_id)
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// A `groupId:artifactId:version` triple
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectVersionRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ProjectVersionRef {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    /// Parse `g:a:v`
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.trim().split(':').collect();
        match parts.as_slice() {
            [g, a, v] if !g.is_empty() && !a.is_empty() && !v.is_empty() => {
                Ok(Self::new(*g, *a, *v))
            }
            _ => Err(Error::Config(format!(
                "Invalid groupId:artifactId:version coordinate '{value}'"
            ))),
        }
    }

    /// Parse a comma separated list of `g:a:v` coordinates
    pub fn parse_list(value: &str) -> Result<Vec<Self>> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::parse)
            .collect()
    }

    pub fn as_project_ref(&self) -> ProjectRef {
        ProjectRef::new(&self.group_id, &self.artifact_id)
    }
}

impl fmt::Display for ProjectVersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_ref() {
        let r = ProjectRef::parse("org.group:artifact").unwrap();
        assert_eq!(r.group_id, "org.group");
        assert_eq!(r.artifact_id, "artifact");
        assert!(!r.is_wildcard());
        assert!(ProjectRef::parse("org.group:*").unwrap().is_wildcard());
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(matches!(ProjectRef::parse("org.group"), Err(Error::Config(_))));
        assert!(matches!(ProjectRef::parse("a:b:c"), Err(Error::Config(_))));
        assert!(matches!(
            ProjectVersionRef::parse("org.example:parent"),
            Err(Error::Config(_))
        ));
        assert!(matches!(ProjectVersionRef::parse("g::1.0"), Err(Error::Config(_))));
    }

    #[test]
    fn test_wildcard_matches_group() {
        let wildcard = ProjectRef::parse("org.group:*").unwrap();
        assert!(wildcard.matches(&ProjectRef::new("org.group", "anything")));
        assert!(!wildcard.matches(&ProjectRef::new("org.other", "anything")));
    }

    #[test]
    fn test_parse_gav_list() {
        let refs = ProjectVersionRef::parse_list("g:a:1.0, g:b:2.0").unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].to_string(), "g:b:2.0");
    }
}
