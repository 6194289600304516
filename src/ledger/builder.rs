//! Deterministic tree layout shared by the bundled ledgers
//!
//! Characters become leaves in input order. Each level pairs neighbours
//! left-to-right and carries an odd trailing node up unchanged, until one
//! hash (the root) remains.

use crate::model::{Components, Hash, PathEvent};
use crate::{Error, Result};
use std::collections::HashSet;

/// A node the tree for some text needs
#[derive(Clone, Debug)]
pub struct PlannedNode {
    pub hash: Hash,
    pub components: Components,
    /// Set for leaves
    pub character: Option<char>,
}

/// Distinct nodes of one tree in emission order
#[derive(Clone, Debug)]
pub struct TreePlan {
    pub nodes: Vec<PlannedNode>,
    pub root: Hash,
}

impl TreePlan {
    /// Number the planned nodes with a ledger-wide counter
    pub fn into_events(self, next_index: &mut u64) -> Vec<PathEvent> {
        self.nodes
            .into_iter()
            .map(|node| {
                let index = *next_index;
                *next_index += 1;
                PathEvent {
                    hash: node.hash,
                    components: node.components,
                    index,
                }
            })
            .collect()
    }
}

/// Lay out the tree for `text`
pub fn plan_tree(text: &str) -> Result<TreePlan> {
    if text.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut seen = HashSet::new();
    let mut nodes = Vec::new();

    let mut level: Vec<Hash> = Vec::with_capacity(text.len());
    for c in text.chars() {
        let components = Components::leaf(c);
        let hash = components.node_hash();
        if seen.insert(hash) {
            nodes.push(PlannedNode {
                hash,
                components,
                character: Some(c),
            });
        }
        level.push(hash);
    }

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for chunk in level.chunks(2) {
            match chunk {
                [left, right] => {
                    let components = Components::pair(*left, *right);
                    let hash = components.node_hash();
                    if seen.insert(hash) {
                        nodes.push(PlannedNode {
                            hash,
                            components,
                            character: None,
                        });
                    }
                    next.push(hash);
                }
                _ => next.push(chunk[0]),
            }
        }
        level = next;
    }

    Ok(TreePlan {
        nodes,
        root: level[0],
    })
}
