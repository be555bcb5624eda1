//! Configuration Tree
//!
//! Host configuration arrives as nested string-keyed data where a key `K` may
//! carry a scalar and, at the same time, a child tree under `K.`. Internally
//! that is decoded into an explicit recursive node: an optional value plus an
//! ordered map of children. The dotted convention only exists at the loading
//! boundary (see [`toml`] and [`tsconfig`]).

pub mod toml;
pub mod tsconfig;

use std::collections::BTreeMap;

/// One node of a configuration tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigTree {
    value: Option<String>,
    children: BTreeMap<String, ConfigTree>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from `("a.b.c", value)` pairs.
    pub fn from_dotted<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut tree = Self::new();
        for (key, value) in entries {
            tree.set_dotted(key.as_ref(), value);
        }
        tree
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    pub fn child(&self, key: &str) -> Option<&ConfigTree> {
        self.children.get(key)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &ConfigTree)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Node at `path`, if every step exists.
    pub fn get(&self, path: &[&str]) -> Option<&ConfigTree> {
        path.iter().try_fold(self, |node, key| node.child(key))
    }

    /// Scalar at `path`.
    pub fn value_at(&self, path: &[&str]) -> Option<&str> {
        self.get(path).and_then(ConfigTree::value)
    }

    /// Mutable node at `path`, creating missing nodes on the way.
    pub fn entry(&mut self, path: &[&str]) -> &mut ConfigTree {
        path.iter().fold(self, |node, key| {
            node.children.entry((*key).to_string()).or_default()
        })
    }

    /// Set the scalar at a dotted key such as `default_upload_folders.pages.media`.
    pub fn set_dotted(&mut self, key: &str, value: impl Into<String>) {
        let path: Vec<&str> = key.split('.').filter(|s| !s.is_empty()).collect();
        self.entry(&path).set_value(value);
    }

    /// Remove the node at `path`, returning it.
    pub fn remove(&mut self, path: &[&str]) -> Option<ConfigTree> {
        let (last, parents) = path.split_last()?;
        let mut node = self;
        for key in parents {
            node = node.children.get_mut(*key)?;
        }
        node.children.remove(*last)
    }

    /// Overlay `other` onto this tree; values from `other` win.
    pub fn merge(&mut self, other: &ConfigTree) {
        if let Some(value) = &other.value {
            self.value = Some(value.clone());
        }
        for (key, child) in &other.children {
            self.children.entry(key.clone()).or_default().merge(child);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }

    /// Flatten back into dotted `(key, value)` pairs, depth first.
    pub fn to_dotted(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.collect_dotted("", &mut out);
        out
    }

    fn collect_dotted(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        for (key, child) in &self.children {
            let full = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            if let Some(value) = &child.value {
                out.push((full.clone(), value.clone()));
            }
            child.collect_dotted(&full, out);
        }
    }
}
