//! The ledger contract the orchestrator is written against

use crate::model::{Components, Hash, PathEvent};
use crate::Result;
use std::sync::Arc;

/// Content-addressed node registry and encrypted payload store
///
/// Implementations may be remote; every call can fail or block, and
/// failures are surfaced to the caller without retry.
pub trait Ledger: Send + Sync {
    /// Build (or reuse) the tree for `text` and return the nodes it touched
    ///
    /// Leaf events come first, then pairs bottom-up and left-to-right; the
    /// last event is the root. Empty `text` is rejected.
    fn build_tree(&self, text: &str) -> Result<Vec<PathEvent>>;

    /// Components of a previously built node
    fn components(&self, hash: &Hash) -> Result<Components>;

    /// Character a leaf hash stands for
    fn character_for_hash(&self, hash: &Hash) -> Result<char>;

    /// Persist the encrypted payload for a node built by `build_tree`
    fn store_payload(&self, hash: &Hash, payload: &[u8]) -> Result<()>;

    /// Most recently stored payload for `hash`
    fn fetch_payload(&self, hash: &Hash) -> Result<Vec<u8>>;
}

impl<L: Ledger + ?Sized> Ledger for Arc<L> {
    fn build_tree(&self, text: &str) -> Result<Vec<PathEvent>> {
        (**self).build_tree(text)
    }

    fn components(&self, hash: &Hash) -> Result<Components> {
        (**self).components(hash)
    }

    fn character_for_hash(&self, hash: &Hash) -> Result<char> {
        (**self).character_for_hash(hash)
    }

    fn store_payload(&self, hash: &Hash, payload: &[u8]) -> Result<()> {
        (**self).store_payload(hash, payload)
    }

    fn fetch_payload(&self, hash: &Hash) -> Result<Vec<u8>> {
        (**self).fetch_payload(hash)
    }
}
