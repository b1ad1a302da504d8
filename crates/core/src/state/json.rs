use super::State;
use crate::config::{ConfigValue, UserProperties};
use crate::error::{Error, Result};
use std::fmt;
use tracing::debug;

pub const JSON_UPDATE: &str = "jsonUpdate";

pub(crate) const CONFIG_VALUES: &[ConfigValue] = &[ConfigValue::new(JSON_UPDATE, "json.html")];

/// One `file:path:value` edit. An empty value deletes the matched nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonOperation {
    pub file: String,
    pub path: String,
    pub update: String,
}

impl fmt::Display for JsonOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File {} path '{}' update {}", self.file, self.path, self.update)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonState {
    pub operations: Vec<JsonOperation>,
}

impl JsonState {
    pub fn new(props: &UserProperties) -> Result<Self> {
        let Some(property) = props.get(JSON_UPDATE).filter(|v| !v.is_empty()) else {
            return Ok(Self::default());
        };

        let mut operations = Vec::new();
        for operation in split_unescaped(property, ',', None) {
            if operation.is_empty() {
                continue;
            }
            let components = split_unescaped(&operation, ':', Some(3));
            let [file, path, update] = components.as_slice() else {
                return Err(Error::Config(format!(
                    "Unable to parse command {operation} from property {property}"
                )));
            };
            let operation = JsonOperation {
                file: file.clone(),
                path: path.clone(),
                update: update.clone(),
            };
            debug!("Adding JSON operation: {operation}");
            operations.push(operation);
        }
        Ok(Self { operations })
    }
}

/// Split on `separator` unless it is preceded by a backslash, then unescape
/// `\<separator>` in each part. With a limit the last part keeps the rest.
fn split_unescaped(value: &str, separator: char, limit: Option<usize>) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut previous = None;
    for c in value.chars() {
        let at_limit = limit.is_some_and(|l| parts.len() + 1 >= l);
        if c == separator && previous != Some('\\') && !at_limit {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
        previous = Some(c);
    }
    parts.push(current);

    let escaped = format!("\\{separator}");
    parts
        .into_iter()
        .map(|part| part.replace(&escaped, &separator.to_string()))
        .collect()
}

impl State for JsonState {
    fn is_enabled(&self) -> bool {
        !self.operations.is_empty()
    }
}
