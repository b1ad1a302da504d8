use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// The flat `key -> value` property bag every state is initialised from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProperties {
    values: BTreeMap<String, String>,
}

impl UserProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `key=value` definition as given on the command line. A bare
    /// `key` is stored with the value `true`.
    pub fn parse_definition(definition: &str) -> Result<(String, String)> {
        let (key, value) = match definition.split_once('=') {
            Some((key, value)) => (key.trim(), value),
            None => (definition.trim(), "true"),
        };
        if key.is_empty() {
            return Err(Error::Config(format!(
                "Invalid property definition '{definition}'"
            )));
        }
        Ok((key.to_string(), value.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Trimmed value, treating blank values as absent
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Boolean with `parseBoolean` semantics: only a case-insensitive
    /// `true` is true
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get_non_empty(key) {
            Some(value) => parse_bool(value),
            None => default,
        }
    }

    pub fn get_usize(&self, key: &str, default: usize) -> Result<usize> {
        match self.get_non_empty(key) {
            Some(value) => value.parse().map_err(|_| {
                Error::Config(format!("Property {key} must be a number, was '{value}'"))
            }),
            None => Ok(default),
        }
    }

    /// Comma separated list; blank entries are dropped
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Keys starting with `prefix`, with the prefix removed
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.values
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(move |(k, v)| (&k[prefix.len()..], v.as_str()))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UserProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl fmt::Display for UserProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.values.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

pub(crate) fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_definition() {
        assert_eq!(
            UserProperties::parse_definition("versionSuffix=redhat-1").unwrap(),
            ("versionSuffix".to_string(), "redhat-1".to_string())
        );
        assert_eq!(
            UserProperties::parse_definition("bomBuilder").unwrap(),
            ("bomBuilder".to_string(), "true".to_string())
        );
        assert_eq!(
            UserProperties::parse_definition("jsonUpdate=a.json:$.x:b=c").unwrap().1,
            "a.json:$.x:b=c"
        );
        assert!(UserProperties::parse_definition("=x").is_err());
    }

    #[test]
    fn test_typed_accessors() {
        let props: UserProperties = [
            ("flag", "TRUE"),
            ("other", "yes"),
            ("padding", "3"),
            ("bad", "three"),
            ("list", "a, b,,c"),
        ]
        .into_iter()
        .collect();

        assert!(props.get_bool("flag", false));
        assert!(!props.get_bool("other", true));
        assert!(props.get_bool("missing", true));
        assert_eq!(props.get_usize("padding", 0).unwrap(), 3);
        assert!(matches!(props.get_usize("bad", 0), Err(Error::Config(_))));
        assert_eq!(props.get_list("list"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_with_prefix() {
        let props: UserProperties = [
            ("dependencyOverride.org.foo:bar@*", "1.0"),
            ("dependencyOverride.org.foo:baz@*", ""),
            ("dependencyManagement", "g:a:v"),
            ("dependencyOverridden", "x"),
        ]
        .into_iter()
        .collect();

        let found: Vec<_> = props.with_prefix("dependencyOverride.").collect();
        assert_eq!(
            found,
            vec![("org.foo:bar@*", "1.0"), ("org.foo:baz@*", "")]
        );
    }
}
