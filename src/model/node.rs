//! Tree nodes and the path events emitted while building them

use super::Hash;
use serde::{Deserialize, Serialize};

/// Whether a node holds one character or joins two subtrees
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Leaf,
    Pair,
}

/// The two components a node hash is computed from
///
/// A leaf is `(character hash, ZERO)`; a pair is `(left, right)` with both
/// sides non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    pub left: Hash,
    pub right: Hash,
}

impl Components {
    pub fn new(left: Hash, right: Hash) -> Self {
        Components { left, right }
    }

    /// Components of the leaf for character `c`
    pub fn leaf(c: char) -> Self {
        let mut buf = [0u8; 4];
        let encoded = c.encode_utf8(&mut buf);
        Components {
            left: Hash::digest_many(&[&[0u8], encoded.as_bytes()]),
            right: Hash::ZERO,
        }
    }

    /// Components of the pair joining `left` and `right`
    pub fn pair(left: Hash, right: Hash) -> Self {
        Components { left, right }
    }

    pub fn kind(&self) -> NodeKind {
        if self.right.is_zero() {
            NodeKind::Leaf
        } else {
            NodeKind::Pair
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind() == NodeKind::Leaf
    }

    /// The node hash these components address
    pub fn node_hash(&self) -> Hash {
        Hash::digest_many(&[self.left.as_bytes(), self.right.as_bytes()])
    }

    pub fn as_array(&self) -> [Hash; 2] {
        [self.left, self.right]
    }
}

/// A node touched while building a tree for one string
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEvent {
    pub hash: Hash,
    pub components: Components,
    /// Ledger-wide emission counter; only relative order matters
    pub index: u64,
}

impl PathEvent {
    pub fn is_leaf(&self) -> bool {
        self.components.is_leaf()
    }
}
