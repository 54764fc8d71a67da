//! Nested locale trees and their flattened, dotted-key form
//!
//! A locale file is a JSON object whose values are either strings or further
//! objects. Diffing works on the flattened form, where every leaf is addressed
//! by the path of keys leading to it:
//!
//! ```text
//! {"page": {"title": "Hello"}}   <->   {"page.title": "Hello"}
//! ```
//!
//! `flatten` and `nest` are inverses for trees whose keys do not contain the
//! separator and which have no empty sub-objects.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Separator used between path segments in flattened keys
pub const DEFAULT_SEPARATOR: &str = ".";

/// Flattened locale: dotted key path -> leaf string
pub type FlatLocale = BTreeMap<String, String>;

/// A value inside a locale tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocaleNode {
    /// Terminal translation string
    Leaf(String),
    /// Nested group of keys
    Branch(LocaleTree),
}

/// One language's translation file
///
/// Keys are kept sorted so serialization is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleTree(BTreeMap<String, LocaleNode>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A key path runs through (or onto) a node of the other kind,
    /// e.g. both `a` and `a.b` are present
    #[error("key '{key}' collides with an existing entry")]
    Collision { key: String },
    #[error("key separator cannot be empty")]
    EmptySeparator,
}

impl LocaleTree {
    pub fn new() -> Self {
        LocaleTree(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&LocaleNode> {
        self.0.get(key)
    }

    pub fn with_leaf(mut self, key: &str, value: &str) -> Self {
        self.0
            .insert(key.to_owned(), LocaleNode::Leaf(value.to_owned()));
        self
    }

    pub fn with_branch(mut self, key: &str, branch: LocaleTree) -> Self {
        self.0.insert(key.to_owned(), LocaleNode::Branch(branch));
        self
    }

    pub fn flatten(&self, separator: &str) -> FlatLocale {
        flatten(self, separator)
    }
}

/// Flatten a tree into dotted-path keys, visiting every leaf at any depth
pub fn flatten(tree: &LocaleTree, separator: &str) -> FlatLocale {
    let mut flat = FlatLocale::new();
    flatten_into(tree, "", separator, &mut flat);
    flat
}

fn flatten_into(tree: &LocaleTree, prefix: &str, separator: &str, out: &mut FlatLocale) {
    for (key, node) in &tree.0 {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", prefix, separator, key)
        };
        match node {
            LocaleNode::Leaf(value) => {
                out.insert(path, value.clone());
            }
            LocaleNode::Branch(child) => flatten_into(child, &path, separator, out),
        }
    }
}

/// Rebuild a nested tree from dotted-path keys
///
/// Intermediate objects are created on demand. Fails when one key is a
/// prefix path of another (`a` and `a.b`), since no tree can hold both.
pub fn nest(flat: &FlatLocale, separator: &str) -> Result<LocaleTree, CodecError> {
    if separator.is_empty() {
        return Err(CodecError::EmptySeparator);
    }

    let mut root = LocaleTree::new();
    for (key, value) in flat {
        let segments: Vec<&str> = key.split(separator).collect();
        insert_path(&mut root, &segments, value, key)?;
    }
    Ok(root)
}

fn insert_path(
    tree: &mut LocaleTree,
    segments: &[&str],
    value: &str,
    key: &str,
) -> Result<(), CodecError> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(());
    };

    if rest.is_empty() {
        return match tree.0.entry((*head).to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(LocaleNode::Leaf(value.to_owned()));
                Ok(())
            }
            Entry::Occupied(_) => Err(CodecError::Collision {
                key: key.to_owned(),
            }),
        };
    }

    let node = tree
        .0
        .entry((*head).to_owned())
        .or_insert_with(|| LocaleNode::Branch(LocaleTree::new()));
    match node {
        LocaleNode::Branch(child) => insert_path(child, rest, value, key),
        LocaleNode::Leaf(_) => Err(CodecError::Collision {
            key: key.to_owned(),
        }),
    }
}
