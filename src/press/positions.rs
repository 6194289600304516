//! Turning decrypted nodes back into an ordered character sequence
//!
//! The walk follows the logical tree, not the deduplicated node set: a
//! shared hash is visited once per place it occurs. A pair at position `p`
//! puts its left child at `p` and its right child one past the highest
//! position assigned so far.

use crate::model::Hash;
use crate::{Error, Result};
use std::collections::HashMap;

/// Tree depth beyond which the node graph is treated as corrupt
const MAX_DEPTH: usize = 96;

/// Decrypted content of one node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeContent {
    Character(char),
    Pair(Hash, Hash),
}

struct Resolver<'a> {
    contents: &'a HashMap<Hash, NodeContent>,
    slots: HashMap<usize, char>,
    max: usize,
}

impl Resolver<'_> {
    fn visit(&mut self, hash: Hash, position: usize, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(Error::Corruption(format!(
                "tree deeper than {} levels at {}",
                MAX_DEPTH, hash
            )));
        }
        self.max = self.max.max(position);

        let content = self
            .contents
            .get(&hash)
            .ok_or_else(|| Error::NotFound(format!("decrypted content for {}", hash)))?;

        match *content {
            NodeContent::Character(c) => {
                if self.slots.insert(position, c).is_some() {
                    return Err(Error::Corruption(format!(
                        "position {} assigned twice",
                        position
                    )));
                }
            }
            NodeContent::Pair(left, right) => {
                self.visit(left, position, depth + 1)?;
                let next = self.max + 1;
                self.visit(right, next, depth + 1)?;
            }
        }
        Ok(())
    }
}

/// Rebuild the text under `root` from per-hash decrypted contents
pub fn assemble(root: Hash, contents: &HashMap<Hash, NodeContent>) -> Result<String> {
    let mut resolver = Resolver {
        contents,
        slots: HashMap::new(),
        max: 0,
    };
    resolver.visit(root, 0, 0)?;

    (0..=resolver.max)
        .map(|position| {
            resolver
                .slots
                .get(&position)
                .copied()
                .ok_or_else(|| Error::Corruption(format!("position {} unassigned", position)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Components;

    fn leaf(c: char, contents: &mut HashMap<Hash, NodeContent>) -> Hash {
        let hash = Components::leaf(c).node_hash();
        contents.insert(hash, NodeContent::Character(c));
        hash
    }

    fn pair(left: Hash, right: Hash, contents: &mut HashMap<Hash, NodeContent>) -> Hash {
        let hash = Components::pair(left, right).node_hash();
        contents.insert(hash, NodeContent::Pair(left, right));
        hash
    }

    #[test]
    fn test_shared_pair_gets_two_positions() {
        let mut contents = HashMap::new();
        let a = leaf('a', &mut contents);
        let b = leaf('b', &mut contents);
        let ab = pair(a, b, &mut contents);
        let root = pair(ab, ab, &mut contents);

        assert_eq!(contents.len(), 4);
        assert_eq!(assemble(root, &contents).unwrap(), "abab");
    }

    #[test]
    fn test_unbalanced_tree() {
        // ((ab)c)(de)
        let mut contents = HashMap::new();
        let a = leaf('a', &mut contents);
        let b = leaf('b', &mut contents);
        let c = leaf('c', &mut contents);
        let d = leaf('d', &mut contents);
        let e = leaf('e', &mut contents);
        let ab = pair(a, b, &mut contents);
        let abc = pair(ab, c, &mut contents);
        let de = pair(d, e, &mut contents);
        let root = pair(abc, de, &mut contents);

        assert_eq!(assemble(root, &contents).unwrap(), "abcde");
    }

    #[test]
    fn test_single_leaf() {
        let mut contents = HashMap::new();
        let x = leaf('x', &mut contents);
        assert_eq!(assemble(x, &contents).unwrap(), "x");
    }

    #[test]
    fn test_missing_content() {
        let mut contents = HashMap::new();
        let a = leaf('a', &mut contents);
        let root = Components::pair(a, Hash::digest(b"gone")).node_hash();
        contents.insert(root, NodeContent::Pair(a, Hash::digest(b"gone")));

        assert!(matches!(assemble(root, &contents), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_cycle_is_corruption() {
        let mut contents = HashMap::new();
        let a = leaf('a', &mut contents);
        let looped = Hash::digest(b"loop");
        contents.insert(looped, NodeContent::Pair(looped, a));

        assert!(matches!(assemble(looped, &contents), Err(Error::Corruption(_))));
    }
}
