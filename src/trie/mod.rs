//! The optional concurrent trie (component I): a string-keyed map with
//! type-erased, downcastable terminal values, guarded by a single
//! reader-writer latch.

mod node;

use std::sync::RwLock;

pub use node::TrieValue;
use node::TrieNode;

/// A concurrent string-to-value map. Reads (`get_value`) take the latch
/// shared; writes (`insert`/`remove`) take it exclusive. No operation
/// suspends.
#[derive(Default)]
pub struct Trie {
    root: RwLock<TrieNode>,
}

impl Trie {
    pub fn new() -> Trie {
        Trie::default()
    }

    /// Inserts `value` under `key`. Returns `false` (leaving the trie
    /// unchanged) if `key` is empty or already present — keys are never
    /// overwritten once inserted.
    pub fn insert<T: TrieValue>(&self, key: &str, value: T) -> bool {
        if key.is_empty() {
            return false;
        }
        let mut root = self.root.write().unwrap();
        let mut current = &mut *root;
        for c in key.chars() {
            current = current.children.entry(c).or_default();
        }
        if current.is_terminal() {
            return false;
        }
        current.value = Some(Box::new(value));
        true
    }

    /// Looks up `key` and, if present and its stored value's dynamic type
    /// is `T`, returns a clone of it. Every other case — empty key, missing
    /// path, non-terminal node, or a type mismatch — is `None`.
    pub fn get_value<T: TrieValue + Clone>(&self, key: &str) -> Option<T> {
        if key.is_empty() {
            return None;
        }
        let root = self.root.read().unwrap();
        let mut current = &*root;
        for c in key.chars() {
            current = current.children.get(&c)?;
        }
        current.value.as_ref()?.as_any().downcast_ref::<T>().cloned()
    }

    /// Removes `key`. Returns `false` if `key` is empty or was never
    /// present. Pruning: after clearing the terminal flag, every ancestor
    /// that is left with neither children nor a value of its own is
    /// deleted too.
    pub fn remove(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        let mut root = self.root.write().unwrap();
        let mut found = false;
        remove_recursive(&mut root, &mut key.chars(), &mut found);
        found
    }
}

/// Returns whether `node` itself should now be pruned by its caller
/// (neither terminal nor holding any children), mirroring bustub's
/// `Remove` helper's "prune on the way back up" shape.
fn remove_recursive(node: &mut TrieNode, remaining: &mut std::str::Chars<'_>, found: &mut bool) -> bool {
    let Some(c) = remaining.next() else {
        *found = node.is_terminal();
        node.value = None;
        return !node.has_children();
    };
    let Some(child) = node.children.get_mut(&c) else {
        *found = false;
        return false;
    };
    if remove_recursive(child, remaining, found) {
        node.children.remove(&c);
    }
    !node.has_children() && !node.is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_always_rejected() {
        let trie = Trie::new();
        assert!(!trie.insert("", 1i32));
        assert_eq!(trie.get_value::<i32>(""), None);
        assert!(!trie.remove(""));
    }

    #[test]
    fn insert_rejects_duplicate_key() {
        let trie = Trie::new();
        assert!(trie.insert("cat", 1i32));
        assert!(!trie.insert("cat", 2i32));
        assert_eq!(trie.get_value::<i32>("cat"), Some(1));
    }

    #[test]
    fn promotes_interior_node_to_terminal_without_disturbing_descendants() {
        let trie = Trie::new();
        assert!(trie.insert("cats", 1i32));
        assert!(trie.insert("cat", 2i32));
        assert_eq!(trie.get_value::<i32>("cat"), Some(2));
        assert_eq!(trie.get_value::<i32>("cats"), Some(1));
    }

    #[test]
    fn get_value_with_wrong_type_is_none() {
        let trie = Trie::new();
        trie.insert("name", "alice".to_string());
        assert_eq!(trie.get_value::<i32>("name"), None);
        assert_eq!(trie.get_value::<String>("name"), Some("alice".to_string()));
    }

    #[test]
    fn missing_key_and_partial_path_are_none() {
        let trie = Trie::new();
        trie.insert("cat", 1i32);
        assert_eq!(trie.get_value::<i32>("ca"), None);
        assert_eq!(trie.get_value::<i32>("dog"), None);
    }

    #[test]
    fn remove_prunes_dead_branches_but_keeps_shared_prefixes() {
        let trie = Trie::new();
        trie.insert("cats", 1i32);
        trie.insert("cat", 2i32);
        assert!(trie.remove("cats"));
        assert_eq!(trie.get_value::<i32>("cats"), None);
        assert_eq!(trie.get_value::<i32>("cat"), Some(2));

        assert!(trie.remove("cat"));
        assert_eq!(trie.get_value::<i32>("cat"), None);
        assert!(!trie.remove("cat"));
    }
}
