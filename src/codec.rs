//! Conversion between nested translation trees and flattened key maps.

use serde_norway::Value;
use thiserror::Error;

use crate::types::{
    FlatMap,
    KEY_SEPARATOR,
    Leaf,
    Node,
    Tree,
};

/// Errors raised while reading hierarchical translation data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The document must contain exactly one language root key.
    #[error("Expected exactly one root key, found {0}")]
    RootCount(usize),
    /// The language root must hold a mapping.
    #[error("Root key '{0}' does not contain a mapping")]
    RootNotMapping(String),
    /// The document itself is not a mapping.
    #[error("Translation document is not a mapping")]
    NotMapping,
    /// Mapping keys must be scalars.
    #[error("Unsupported key under '{0}'")]
    UnsupportedKey(String),
    /// Sequences may only contain scalar values.
    #[error("Unsupported sequence item at '{0}'")]
    UnsupportedSequenceItem(String),
}

/// Builds a [`Tree`] from a parsed YAML document.
///
/// Scalar leaves are decoded into their text form: numbers and booleans are
/// rendered, `null` becomes an empty string.
pub fn tree_from_yaml(value: &Value) -> Result<Tree, TreeError> {
    match value {
        Value::Mapping(_) => mapping_to_tree(value, ""),
        Value::Tagged(tagged) => tree_from_yaml(&tagged.value),
        _ => Err(TreeError::NotMapping),
    }
}

fn mapping_to_tree(value: &Value, path: &str) -> Result<Tree, TreeError> {
    let Some(mapping) = value.as_mapping() else {
        return Err(TreeError::NotMapping);
    };

    let mut tree = Tree::new();
    for (key, child) in mapping {
        let segment = scalar_text(key).ok_or_else(|| TreeError::UnsupportedKey(path.to_string()))?;
        let child_path = join_key(path, &segment);
        let node = value_to_node(child, &child_path)?;
        tree.insert(segment, node);
    }
    Ok(tree)
}

fn value_to_node(value: &Value, path: &str) -> Result<Node, TreeError> {
    match value {
        Value::Mapping(_) => mapping_to_tree(value, path).map(Node::Branch),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                scalar_text(item).ok_or_else(|| TreeError::UnsupportedSequenceItem(path.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|list| Node::Leaf(Leaf::List(list))),
        Value::Tagged(tagged) => value_to_node(&tagged.value, path),
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
            Ok(Node::Leaf(Leaf::Text(scalar_text(value).unwrap_or_default())))
        }
    }
}

/// Canonical text form of a YAML scalar.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Removes the single language root of a loaded document.
///
/// Returns the root key together with the tree underneath it.
pub fn split_root(mut tree: Tree) -> Result<(String, Tree), TreeError> {
    if tree.len() != 1 {
        return Err(TreeError::RootCount(tree.len()));
    }
    let Some((root, node)) = tree.pop_first() else {
        return Err(TreeError::RootCount(0));
    };
    match node {
        Node::Branch(body) => Ok((root, body)),
        Node::Leaf(_) => Err(TreeError::RootNotMapping(root)),
    }
}

/// Places `tree` under `language` as the only root key.
#[must_use]
pub fn wrap_root(language: &str, tree: Tree) -> Tree {
    Tree::from([(language.to_string(), Node::Branch(tree))])
}

/// Flattens a tree into a dot-separated key map.
///
/// Every leaf yields exactly one entry; branches are never emitted, so an
/// empty mapping leaves no trace and does not come back from [`expand`].
///
/// # Examples
/// ```
/// use locale_sync::codec::flatten;
/// use locale_sync::types::{Leaf, Node, Tree};
///
/// let tree = Tree::from([(
///     "site".to_string(),
///     Node::Branch(Tree::from([("title".to_string(), Node::Leaf(Leaf::from("Title")))])),
/// )]);
///
/// let flat = flatten(&tree);
/// assert_eq!(flat.get("site.title"), Some(&Leaf::from("Title")));
/// ```
#[must_use]
pub fn flatten(tree: &Tree) -> FlatMap {
    let mut result = FlatMap::new();
    flatten_into(tree, "", &mut result);
    result
}

fn flatten_into(tree: &Tree, prefix: &str, result: &mut FlatMap) {
    for (segment, node) in tree {
        let full_key = join_key(prefix, segment);
        match node {
            Node::Branch(child) => flatten_into(child, &full_key, result),
            Node::Leaf(leaf) => {
                result.insert(full_key, leaf.clone());
            }
        }
    }
}

/// Rebuilds a nested tree from a flattened key map.
///
/// Keys are inserted in sorted order. When a segment that already holds a
/// leaf has to become a parent, the leaf is replaced by a mapping and a
/// warning is logged.
#[must_use]
pub fn expand(flat: &FlatMap) -> Tree {
    let mut keys: Vec<&String> = flat.keys().collect();
    keys.sort_unstable();

    let mut tree = Tree::new();
    for key in keys {
        if let Some(leaf) = flat.get(key) {
            insert_path(&mut tree, key, leaf.clone());
        }
    }
    tree
}

fn insert_path(tree: &mut Tree, key: &str, leaf: Leaf) {
    let segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = tree;
    for segment in parents {
        let node =
            current.entry((*segment).to_string()).or_insert_with(|| Node::Branch(Tree::new()));
        if let Node::Leaf(previous) = &*node {
            tracing::warn!(key, segment, ?previous, "Replacing leaf value with nested keys");
            *node = Node::Branch(Tree::new());
        }
        current = match node {
            Node::Branch(child) => child,
            Node::Leaf(_) => return,
        };
    }

    if let Some(Node::Branch(_)) = current.get(*last) {
        tracing::warn!(key, "Replacing nested keys with leaf value");
    }
    current.insert((*last).to_string(), Node::Leaf(leaf));
}

fn join_key(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}{KEY_SEPARATOR}{segment}")
    }
}
