//! In-process ledger

use super::builder::plan_tree;
use super::Ledger;
use crate::model::{Components, Hash, PathEvent};
use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct State {
    nodes: HashMap<Hash, Components>,
    characters: HashMap<Hash, char>,
    payloads: HashMap<Hash, Vec<u8>>,
    next_index: u64,
}

/// A ledger held entirely in memory
#[derive(Default)]
pub struct MemoryLedger {
    state: RwLock<State>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct nodes built so far
    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Number of nodes with a stored payload
    pub fn payload_count(&self) -> usize {
        self.state.read().payloads.len()
    }
}

impl Ledger for MemoryLedger {
    fn build_tree(&self, text: &str) -> Result<Vec<PathEvent>> {
        let plan = plan_tree(text)?;

        let mut state = self.state.write();
        for node in &plan.nodes {
            state.nodes.entry(node.hash).or_insert(node.components);
            if let Some(c) = node.character {
                state.characters.entry(node.hash).or_insert(c);
            }
        }
        let events = plan.into_events(&mut state.next_index);

        tracing::debug!(events = events.len(), "built tree in memory ledger");
        Ok(events)
    }

    fn components(&self, hash: &Hash) -> Result<Components> {
        self.state
            .read()
            .nodes
            .get(hash)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("node {}", hash)))
    }

    fn character_for_hash(&self, hash: &Hash) -> Result<char> {
        self.state
            .read()
            .characters
            .get(hash)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("leaf character for {}", hash)))
    }

    fn store_payload(&self, hash: &Hash, payload: &[u8]) -> Result<()> {
        let mut state = self.state.write();
        if !state.nodes.contains_key(hash) {
            return Err(Error::Ledger(format!("unknown node {}", hash)));
        }
        state.payloads.insert(*hash, payload.to_vec());
        Ok(())
    }

    fn fetch_payload(&self, hash: &Hash) -> Result<Vec<u8>> {
        self.state
            .read()
            .payloads
            .get(hash)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("payload for {}", hash)))
    }
}
