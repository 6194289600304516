//! Press and release over a ledger

use super::positions::{assemble, NodeContent};
use super::walk::{collect_nodes, NodeSet};
use crate::crypto::{encrypt_payload, public_key_from_hex, HybridEngine, Payload};
use crate::ledger::Ledger;
use crate::model::{Hash, PathEvent};
use crate::{Error, Result};
use std::collections::HashMap;

/// Outcome of a press
#[derive(Clone, Debug)]
pub struct PressReceipt {
    /// Root of the pressed tree
    pub root: Hash,
    /// Path events returned by the ledger, in emission order
    pub events: Vec<PathEvent>,
}

/// Encrypts trees into a ledger and reassembles them
///
/// Pressing only needs the recipient's public key. Releasing needs the
/// recipient's key pair, supplied with [`Presser::with_engine`].
pub struct Presser<L: Ledger> {
    ledger: L,
    engine: Option<HybridEngine>,
}

impl<L: Ledger> Presser<L> {
    pub fn new(ledger: L) -> Self {
        Presser {
            ledger,
            engine: None,
        }
    }

    /// Set the engine used to decrypt on release
    pub fn with_engine(mut self, engine: HybridEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn set_engine(&mut self, engine: HybridEngine) {
        self.engine = Some(engine);
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Build, encrypt and store the tree for `text`; returns the root hash
    pub fn press(&self, text: &str, recipient_public_hex: &str) -> Result<Hash> {
        Ok(self.press_detailed(text, recipient_public_hex)?.root)
    }

    /// Like [`Presser::press`], also returning the ledger's path events
    pub fn press_detailed(&self, text: &str, recipient_public_hex: &str) -> Result<PressReceipt> {
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }
        let recipient = public_key_from_hex(recipient_public_hex)?;

        let events = self.ledger.build_tree(text)?;
        let root = events
            .last()
            .map(|e| e.hash)
            .ok_or_else(|| Error::Ledger("build_tree returned no events".into()))?;

        let mut characters: HashMap<Hash, char> = HashMap::new();
        for event in events.iter().filter(|e| e.is_leaf()) {
            let c = self.ledger.character_for_hash(&event.hash)?;
            characters.insert(event.hash, c);
        }

        for event in &events {
            let payload = if event.is_leaf() {
                match characters.get(&event.hash) {
                    Some(c) => Payload::Character(*c),
                    None => {
                        return Err(Error::NotFound(format!(
                            "leaf character for {}",
                            event.hash
                        )))
                    }
                }
            } else {
                Payload::HashPair(event.components.left, event.components.right)
            };

            let blob = encrypt_payload(&payload, &recipient)?;
            self.ledger.store_payload(&event.hash, &blob)?;
        }

        tracing::info!(
            root = %root.short(),
            events = events.len(),
            leaves = characters.len(),
            "pressed text"
        );

        Ok(PressReceipt { root, events })
    }

    /// Reassemble the text stored under `root`
    pub fn release(&self, root: Hash) -> Result<String> {
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| Error::InvalidKey("no decryption key configured".into()))?;
        if root.is_zero() {
            return Err(Error::InvalidHash("root is the zero hash".into()));
        }

        let nodes = collect_nodes(&self.ledger, root)?;

        let mut contents = HashMap::with_capacity(nodes.len());
        for (hash, components) in nodes.iter() {
            let blob = self.ledger.fetch_payload(&hash)?;
            let content = if components.is_leaf() {
                NodeContent::Character(engine.decrypt_character(&blob)?)
            } else {
                let (left, right) = engine.decrypt_hash_pair(&blob)?;
                if (left, right) != (components.left, components.right) {
                    return Err(Error::Integrity(format!(
                        "decrypted children of {} do not match the ledger",
                        hash
                    )));
                }
                NodeContent::Pair(left, right)
            };
            contents.insert(hash, content);
        }

        let text = assemble(root, &contents)?;

        tracing::info!(
            root = %root.short(),
            nodes = nodes.len(),
            chars = text.chars().count(),
            "released text"
        );

        Ok(text)
    }

    /// Distinct nodes under `root`, without decrypting anything
    pub fn inspect(&self, root: Hash) -> Result<NodeSet> {
        collect_nodes(&self.ledger, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::ledger::MemoryLedger;
    use crate::model::Components;
    use crate::ErrorKind;

    fn setup() -> (Presser<MemoryLedger>, String) {
        let keys = KeyPair::generate();
        let public = keys.public_hex();
        let presser = Presser::new(MemoryLedger::new()).with_engine(HybridEngine::new(keys));
        (presser, public)
    }

    #[test]
    fn test_press_ab_scenario() {
        let (presser, public) = setup();
        let receipt = presser.press_detailed("ab", &public).unwrap();

        assert_eq!(receipt.events.len(), 3);
        assert!(receipt.events[0].is_leaf());
        assert!(receipt.events[1].is_leaf());
        assert!(!receipt.events[2].is_leaf());
        assert_eq!(receipt.root, receipt.events[2].hash);
        assert_eq!(presser.release(receipt.root).unwrap(), "ab");
    }

    #[test]
    fn test_repeated_substring() {
        let (presser, public) = setup();
        let root = presser.press("abab", &public).unwrap();
        assert_eq!(presser.release(root).unwrap(), "abab");
    }

    #[test]
    fn test_roundtrip_various() {
        let (presser, public) = setup();
        for text in [
            "x",
            "[",
            "hello, world",
            "aaaaaaa",
            "[\"0x\"]",
            "naïve café ☕ 😀",
            "the quick brown fox jumps over the lazy dog",
        ] {
            let root = presser.press(text, &public).unwrap();
            assert_eq!(presser.release(root).unwrap(), text);
        }
    }

    #[test]
    fn test_text_of_already_seen_characters() {
        let (presser, public) = setup();
        presser.press("abc", &public).unwrap();
        let root = presser.press("cab", &public).unwrap();
        assert_eq!(presser.release(root).unwrap(), "cab");
    }

    #[test]
    fn test_empty_input_rejected_before_ledger() {
        let (presser, public) = setup();
        assert!(matches!(presser.press("", &public), Err(Error::EmptyInput)));
        assert_eq!(presser.ledger().node_count(), 0);
    }

    #[test]
    fn test_bad_recipient_rejected_before_ledger() {
        let (presser, _) = setup();
        let err = presser.press("abc", "0x1234").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(presser.ledger().node_count(), 0);
    }

    #[test]
    fn test_release_with_wrong_key() {
        let (presser, _) = setup();
        let other = KeyPair::generate();
        let root = presser.press("secret", &other.public_hex()).unwrap();

        let err = presser.release(root).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn test_release_missing_payload() {
        let (presser, _) = setup();
        let events = presser.ledger().build_tree("ab").unwrap();
        let err = presser.release(events.last().unwrap().hash).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_release_tampered_payload() {
        let (presser, public) = setup();
        let receipt = presser.press_detailed("xy", &public).unwrap();
        let leaf = receipt.events[0].hash;

        let mut blob = presser.ledger().fetch_payload(&leaf).unwrap();
        let mid = blob.len() / 2;
        blob[mid] ^= 0x80;
        presser.ledger().store_payload(&leaf, &blob).unwrap();

        let err = presser.release(receipt.root).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn test_release_swapped_payload_shape() {
        let (presser, public) = setup();
        let receipt = presser.press_detailed("xy", &public).unwrap();
        let pair_blob = presser.ledger().fetch_payload(&receipt.root).unwrap();
        presser
            .ledger()
            .store_payload(&receipt.events[0].hash, &pair_blob)
            .unwrap();

        let err = presser.release(receipt.root).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_release_requires_engine() {
        let presser = Presser::new(MemoryLedger::new());
        let err = presser.release(Hash::digest(b"root")).unwrap_err();
        assert!(matches!(err, Error::InvalidKey(_)));
    }

    #[test]
    fn test_inspect() {
        let (presser, public) = setup();
        let root = presser.press("abab", &public).unwrap();
        let set = presser.inspect(root).unwrap();

        assert_eq!(set.len(), 4);
        assert_eq!(set.leaf_count(), 2);
        let a = Components::leaf('a').node_hash();
        assert!(set.components.contains_key(&a));
    }

    struct FailingLedger;

    impl Ledger for FailingLedger {
        fn build_tree(&self, _text: &str) -> Result<Vec<PathEvent>> {
            Err(Error::Ledger("node unreachable".into()))
        }

        fn components(&self, _hash: &Hash) -> Result<Components> {
            Err(Error::Ledger("node unreachable".into()))
        }

        fn character_for_hash(&self, _hash: &Hash) -> Result<char> {
            Err(Error::Ledger("node unreachable".into()))
        }

        fn store_payload(&self, _hash: &Hash, _payload: &[u8]) -> Result<()> {
            Err(Error::Ledger("node unreachable".into()))
        }

        fn fetch_payload(&self, _hash: &Hash) -> Result<Vec<u8>> {
            Err(Error::Ledger("node unreachable".into()))
        }
    }

    #[test]
    fn test_ledger_errors_propagate() {
        let keys = KeyPair::generate();
        let public = keys.public_hex();
        let presser = Presser::new(FailingLedger).with_engine(HybridEngine::new(keys));

        assert_eq!(
            presser.press("abc", &public).unwrap_err().kind(),
            ErrorKind::Collaborator
        );
        assert_eq!(
            presser.release(Hash::digest(b"r")).unwrap_err().kind(),
            ErrorKind::Collaborator
        );
    }
}
