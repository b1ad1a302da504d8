//! The JSONPath subset accepted by `jsonUpdate`: `$`, `.name`, `['name']`,
//! `[n]`, `*`, `[*]` and `..name`.

use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Child(String),
    Index(usize),
    Wildcard,
    Descendant(String),
}

/// One concrete step from the document root to a matched node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Key(String),
    Index(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(key) => write!(f, "['{key}']"),
            Step::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    expression: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(expression: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::Config(format!("Invalid JSON path '{expression}': {reason}"));

        let chars: Vec<char> = expression.trim().chars().collect();
        if chars.first() != Some(&'$') {
            return Err(invalid("must start with '$'"));
        }

        let mut segments = Vec::new();
        let mut pos = 1;
        while pos < chars.len() {
            match chars[pos] {
                '.' if chars.get(pos + 1) == Some(&'.') => {
                    let (name, next) = read_name(&chars, pos + 2);
                    if name.is_empty() {
                        return Err(invalid("missing name after '..'"));
                    }
                    segments.push(Segment::Descendant(name));
                    pos = next;
                }
                '.' => {
                    let (name, next) = read_name(&chars, pos + 1);
                    match name.as_str() {
                        "" => return Err(invalid("missing name after '.'")),
                        "*" => segments.push(Segment::Wildcard),
                        _ => segments.push(Segment::Child(name)),
                    }
                    pos = next;
                }
                '[' => {
                    let close = chars[pos..]
                        .iter()
                        .position(|c| *c == ']')
                        .map(|offset| pos + offset)
                        .ok_or_else(|| invalid("unterminated '['"))?;
                    let inner: String = chars[pos + 1..close].iter().collect();
                    segments.push(bracket_segment(inner.trim()).ok_or_else(|| invalid("bad subscript"))?);
                    pos = close + 1;
                }
                other => return Err(invalid(&format!("unexpected '{other}'"))),
            }
        }

        Ok(Self {
            expression: expression.to_string(),
            segments,
        })
    }

    /// Locations of every node the path matches, in document order
    pub fn select(&self, document: &Value) -> Vec<Vec<Step>> {
        let mut current = vec![(Vec::new(), document)];
        for segment in &self.segments {
            let mut next = Vec::new();
            for (steps, node) in current {
                match segment {
                    Segment::Child(name) => {
                        if let Some(child) = node.as_object().and_then(|o| o.get(name)) {
                            next.push((extend(&steps, Step::Key(name.clone())), child));
                        }
                    }
                    Segment::Index(index) => {
                        if let Some(child) = node.as_array().and_then(|a| a.get(*index)) {
                            next.push((extend(&steps, Step::Index(*index)), child));
                        }
                    }
                    Segment::Wildcard => next.extend(children(&steps, node)),
                    Segment::Descendant(name) => collect_named(&steps, node, name, &mut next),
                }
            }
            current = next;
        }
        current.into_iter().map(|(steps, _)| steps).collect()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

fn read_name(chars: &[char], start: usize) -> (String, usize) {
    let end = chars[start.min(chars.len())..]
        .iter()
        .position(|c| *c == '.' || *c == '[')
        .map_or(chars.len(), |offset| start + offset);
    (chars[start.min(end)..end].iter().collect(), end)
}

fn bracket_segment(inner: &str) -> Option<Segment> {
    if inner == "*" {
        return Some(Segment::Wildcard);
    }
    let quoted = inner
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')));
    if let Some(name) = quoted {
        return Some(Segment::Child(name.to_string()));
    }
    inner.parse().ok().map(Segment::Index)
}

fn extend(steps: &[Step], step: Step) -> Vec<Step> {
    let mut extended = steps.to_vec();
    extended.push(step);
    extended
}

fn children<'a>(steps: &[Step], node: &'a Value) -> Vec<(Vec<Step>, &'a Value)> {
    match node {
        Value::Object(map) => map
            .iter()
            .map(|(key, child)| (extend(steps, Step::Key(key.clone())), child))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, child)| (extend(steps, Step::Index(index)), child))
            .collect(),
        _ => Vec::new(),
    }
}

fn collect_named<'a>(steps: &[Step], node: &'a Value, name: &str, found: &mut Vec<(Vec<Step>, &'a Value)>) {
    if let Some(child) = node.as_object().and_then(|o| o.get(name)) {
        found.push((extend(steps, Step::Key(name.to_string())), child));
    }
    for (child_steps, child) in children(steps, node) {
        collect_named(&child_steps, child, name, found);
    }
}

fn node_mut<'a>(document: &'a mut Value, steps: &[Step]) -> Option<&'a mut Value> {
    steps.iter().try_fold(document, |node, step| match step {
        Step::Key(key) => node.as_object_mut()?.get_mut(key),
        Step::Index(index) => node.as_array_mut()?.get_mut(*index),
    })
}

/// Replace the node at `steps`
pub fn set(document: &mut Value, steps: &[Step], value: Value) -> bool {
    match node_mut(document, steps) {
        Some(node) => {
            *node = value;
            true
        }
        None => false,
    }
}

/// Remove the node at `steps` from its parent. The root cannot be removed.
pub fn remove(document: &mut Value, steps: &[Step]) -> bool {
    let Some((last, parent)) = steps.split_last() else {
        return false;
    };
    match (node_mut(document, parent), last) {
        (Some(Value::Object(map)), Step::Key(key)) => map.shift_remove(key).is_some(),
        (Some(Value::Array(items)), Step::Index(index)) if *index < items.len() => {
            items.remove(*index);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "name": "app",
            "version": "1.0.0",
            "dependencies": { "left-pad": "1.3.0", "lodash": "4.17.0" },
            "modules": [
                { "name": "one", "version": "1.0.0" },
                { "name": "two", "version": "1.0.0" }
            ]
        })
    }

    fn render(paths: Vec<Vec<Step>>) -> Vec<String> {
        paths
            .into_iter()
            .map(|steps| steps.iter().map(Step::to_string).collect())
            .collect()
    }

    #[test]
    fn test_select_subset() {
        let doc = document();
        let select = |path: &str| render(JsonPath::parse(path).unwrap().select(&doc));

        assert_eq!(select("$.version"), vec!["['version']"]);
        assert_eq!(select("$['dependencies']['lodash']"), vec!["['dependencies']['lodash']"]);
        assert_eq!(select("$.modules[1].name"), vec!["['modules'][1]['name']"]);
        assert_eq!(select("$.modules[*].version"), vec!["['modules'][0]['version']", "['modules'][1]['version']"]);
        assert_eq!(select("$.dependencies.*").len(), 2);
        assert_eq!(select("$..version").len(), 3);
        assert_eq!(select("$"), vec![""]);
        assert!(select("$.missing").is_empty());
    }

    #[test]
    fn test_invalid_paths() {
        for path in ["version", "$.", "$[1", "$[x]", "$..", "$a"] {
            assert!(matches!(JsonPath::parse(path), Err(Error::Config(_))), "{path}");
        }
    }

    #[test]
    fn test_set_and_remove() {
        let mut doc = document();
        let path = JsonPath::parse("$..version").unwrap();
        for steps in path.select(&doc.clone()) {
            assert!(set(&mut doc, &steps, json!("2.0.0")));
        }
        assert_eq!(doc["modules"][1]["version"], "2.0.0");

        let steps = JsonPath::parse("$.dependencies['left-pad']").unwrap().select(&doc);
        assert!(remove(&mut doc, &steps[0]));
        assert_eq!(doc["dependencies"], json!({ "lodash": "4.17.0" }));
        assert!(!remove(&mut doc, &[]));
    }
}
