//! TOML source for configuration trees.
//!
//! Plain tables nest as usual. A quoted key ending in a dot (`"media." = {...}`)
//! attaches its table as the children of the sibling key `media`, mirroring the
//! host's dotted-key convention.

use super::ConfigTree;
use crate::error::ConfigError;
use std::path::Path;
use ::toml::{Table, Value};

impl ConfigTree {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let table: Table = input.parse()?;
        from_table(&table, "")
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

fn from_table(table: &Table, prefix: &str) -> Result<ConfigTree, ConfigError> {
    let mut tree = ConfigTree::new();
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match key.strip_suffix('.') {
            Some(stem) => {
                let Value::Table(children) = value else {
                    return Err(ConfigError::UnsupportedValue {
                        key: full_key,
                        kind: format!("{} (dotted keys must hold a table)", value.type_str()),
                    });
                };
                let subtree = from_table(children, &full_key)?;
                tree.entry(&[stem]).merge(&subtree);
            }
            None => match value {
                Value::Table(children) => {
                    let subtree = from_table(children, &full_key)?;
                    tree.entry(&[key.as_str()]).merge(&subtree);
                }
                other => {
                    let scalar = scalar_to_string(other).ok_or_else(|| {
                        ConfigError::UnsupportedValue {
                            key: full_key.clone(),
                            kind: other.type_str().to_string(),
                        }
                    })?;
                    tree.entry(&[key.as_str()]).set_value(scalar);
                }
            },
        }
    }
    Ok(tree)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}
