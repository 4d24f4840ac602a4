//! Flat property storage with tree-shape invariants.
//!
//! A key is either a leaf (has a value) or an internal node (has
//! children); never both. Path segments are identifiers or bracketed
//! indices; mixing (`a.b[0].c`) is legal. Setting `x.y` when `x` is
//! already a leaf, or when `x.y` already has children, fails. Removing a
//! leaf prunes empty ancestors.

use std::collections::BTreeMap;

use crate::error::WeaveError;
use crate::properties::resolve;

#[derive(Debug, Clone)]
enum Node {
    Leaf,
    Branch(BTreeMap<String, Node>),
}

/// A hierarchical, dotted-key configuration tree plus its flattened
/// leaf-only view.
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    flat: BTreeMap<String, String>,
    root: BTreeMap<String, Node>,
}

/// Split `a.b[0].c` into `["a", "b", "[0]", "c"]`. Segments are either
/// `[A-Za-z_][A-Za-z0-9_-]*` identifiers or `[N]` bracketed indices.
fn split_path(key: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                let mut idx = String::from("[");
                for c2 in chars.by_ref() {
                    idx.push(c2);
                    if c2 == ']' {
                        break;
                    }
                }
                segments.push(idx);
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, creating intermediate branch nodes as needed.
    /// Fails on a leaf/branch shape collision.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), WeaveError> {
        let segments = split_path(key);
        if segments.is_empty() {
            return Err(WeaveError::syntax("empty property key"));
        }
        Self::set_recursive(&mut self.root, &segments, key)?;
        self.flat.insert(key.to_string(), value.into());
        Ok(())
    }

    fn set_recursive(
        level: &mut BTreeMap<String, Node>,
        segments: &[String],
        full_key: &str,
    ) -> Result<(), WeaveError> {
        let (head, tail) = (&segments[0], &segments[1..]);
        if tail.is_empty() {
            match level.get(head) {
                Some(Node::Branch(children)) if !children.is_empty() => {
                    return Err(WeaveError::syntax(format!(
                        "set \"{full_key}\": key already has children"
                    )));
                }
                _ => {
                    level.insert(head.clone(), Node::Leaf);
                }
            }
            return Ok(());
        }

        match level.get(head) {
            Some(Node::Leaf) => {
                return Err(WeaveError::syntax(format!(
                    "set \"{full_key}\": key is already a leaf"
                )));
            }
            Some(Node::Branch(_)) => {}
            None => {
                level.insert(head.clone(), Node::Branch(BTreeMap::new()));
            }
        }
        if let Some(Node::Branch(children)) = level.get_mut(head) {
            Self::set_recursive(children, tail, full_key)?;
        }
        Ok(())
    }

    /// `""` if absent; callers apply their own default.
    pub fn get(&self, key: &str) -> String {
        self.flat.get(key).cloned().unwrap_or_default()
    }

    /// True for either a leaf or an internal node.
    pub fn has(&self, key: &str) -> bool {
        let segments = split_path(key);
        if segments.is_empty() {
            return false;
        }
        let mut level = &self.root;
        for (i, seg) in segments.iter().enumerate() {
            match level.get(seg) {
                None => return false,
                Some(Node::Leaf) => return i == segments.len() - 1,
                Some(Node::Branch(children)) => level = children,
            }
        }
        true
    }

    /// Leaf keys only, sorted lexicographically.
    pub fn keys(&self) -> Vec<String> {
        self.flat.keys().cloned().collect()
    }

    /// Remove a leaf key, pruning empty ancestor branches.
    pub fn remove(&mut self, key: &str) -> Result<(), WeaveError> {
        let segments = split_path(key);
        if segments.is_empty() {
            return Err(WeaveError::syntax("empty property key"));
        }
        if !self.flat.contains_key(key) {
            return Ok(());
        }
        Self::remove_recursive(&mut self.root, &segments);
        self.flat.remove(key);
        Ok(())
    }

    /// Returns true if the branch at this level became empty and should
    /// itself be pruned by the caller.
    fn remove_recursive(level: &mut BTreeMap<String, Node>, segments: &[String]) -> bool {
        let (head, tail) = (&segments[0], &segments[1..]);
        if tail.is_empty() {
            level.remove(head);
        } else if let Some(Node::Branch(children)) = level.get_mut(head) {
            if Self::remove_recursive(children, tail) {
                level.remove(head);
            }
        }
        level.is_empty()
    }

    /// Deep clone of both the tree and the flat map.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Expand every `${name:=default}` occurrence by recursive lookup.
    pub fn resolve(&self, s: &str) -> Result<String, WeaveError> {
        resolve::resolve(self, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut store = PropertyStore::new();
        store.set("a.b.c", "1").unwrap();
        assert_eq!(store.get("a.b.c"), "1");
        assert!(store.has("a.b.c"));
        assert!(store.has("a.b"));
        assert!(store.has("a"));
    }

    #[test]
    fn get_absent_returns_empty_string() {
        let store = PropertyStore::new();
        assert_eq!(store.get("missing"), "");
        assert!(!store.has("missing"));
    }

    #[test]
    fn leaf_then_child_collision_fails() {
        let mut store = PropertyStore::new();
        store.set("x", "1").unwrap();
        assert!(store.set("x.y", "2").is_err());
    }

    #[test]
    fn child_then_leaf_collision_fails() {
        let mut store = PropertyStore::new();
        store.set("x.y", "1").unwrap();
        assert!(store.set("x", "2").is_err());
    }

    #[test]
    fn mixed_identifier_and_index_segments() {
        let mut store = PropertyStore::new();
        store.set("a.b[0].c", "v").unwrap();
        assert!(store.has("a.b[0].c"));
        assert!(store.has("a.b[0]"));
        assert!(store.has("a.b"));
    }

    #[test]
    fn remove_prunes_empty_ancestors() {
        let mut store = PropertyStore::new();
        store.set("a.b.c", "1").unwrap();
        store.remove("a.b.c").unwrap();
        assert!(!store.has("a.b.c"));
        assert!(!store.has("a.b"));
        assert!(!store.has("a"));
    }

    #[test]
    fn remove_keeps_sibling_branches() {
        let mut store = PropertyStore::new();
        store.set("a.b.c", "1").unwrap();
        store.set("a.d", "2").unwrap();
        store.remove("a.b.c").unwrap();
        assert!(!store.has("a.b"));
        assert!(store.has("a.d"));
        assert!(store.has("a"));
    }

    #[test]
    fn keys_are_sorted_and_leaves_only() {
        let mut store = PropertyStore::new();
        store.set("b", "1").unwrap();
        store.set("a", "2").unwrap();
        store.set("c.d", "3").unwrap();
        assert_eq!(
            store.keys(),
            vec!["a".to_string(), "b".to_string(), "c.d".to_string()]
        );
    }

    #[test]
    fn copy_is_independent() {
        let mut store = PropertyStore::new();
        store.set("a", "1").unwrap();
        let mut copy = store.copy();
        copy.set("b", "2").unwrap();
        assert!(!store.has("b"));
        assert!(copy.has("b"));
    }
}
