//! Enumerating the distinct nodes reachable from a root

use crate::ledger::Ledger;
use crate::model::{Components, Hash};
use crate::Result;
use std::collections::{HashMap, HashSet};

/// Distinct nodes of a tree, each listed once
#[derive(Clone, Debug, Default)]
pub struct NodeSet {
    /// Hashes in depth-first discovery order, root first
    pub order: Vec<Hash>,
    pub components: HashMap<Hash, Components>,
}

impl NodeSet {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.components.values().filter(|c| c.is_leaf()).count()
    }

    /// Iterate nodes in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (Hash, Components)> + '_ {
        self.order
            .iter()
            .filter_map(|hash| self.components.get(hash).map(|c| (*hash, *c)))
    }
}

/// Query the ledger for every node under `root`
///
/// Shared subtrees are expanded once. A leaf's first component is a
/// character hash, not a node, so leaves are never descended into.
pub fn collect_nodes<L: Ledger + ?Sized>(ledger: &L, root: Hash) -> Result<NodeSet> {
    let mut visited = HashSet::new();
    let mut set = NodeSet::default();
    let mut stack = vec![root];

    while let Some(hash) = stack.pop() {
        if hash.is_zero() || !visited.insert(hash) {
            continue;
        }

        let components = ledger.components(&hash)?;
        set.order.push(hash);
        set.components.insert(hash, components);

        if !components.is_leaf() {
            // right first so the left subtree is discovered first
            stack.push(components.right);
            stack.push(components.left);
        }
    }

    Ok(set)
}
