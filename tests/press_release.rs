//! Press/release integration tests
//!
//! Exercise the public API end to end against both bundled ledgers.
//!
//! Run with:
//! ```bash
//! cargo test --test press_release
//! ```

use std::sync::Arc;
use strandpress::crypto::{encrypt, OVERHEAD_LEN};
use strandpress::{
    Error, ErrorKind, FileLedger, Hash, HybridEngine, KeyPair, Ledger, MemoryLedger, Presser,
};
use tempfile::tempdir;

fn keys() -> (KeyPair, String) {
    let keys = KeyPair::generate();
    let public = keys.public_hex();
    (keys, public)
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_roundtrip_memory_ledger() {
    let (keys, public) = keys();
    let presser = Presser::new(MemoryLedger::new()).with_engine(HybridEngine::new(keys));

    let samples = [
        "a",
        "ab",
        "abc",
        "abab",
        "mississippi",
        "    ",
        "line one\nline two\ttab",
        "Ünïcödé ✓ 漢字 🦀🦀",
        "[[[]]]",
    ];
    for text in samples {
        let root = presser.press(text, &public).unwrap();
        assert_eq!(presser.release(root).unwrap(), text, "roundtrip of {:?}", text);
    }
}

#[test]
fn test_roundtrip_lengths_up_to_70() {
    let (keys, public) = keys();
    let presser = Presser::new(MemoryLedger::new()).with_engine(HybridEngine::new(keys));
    let alphabet: Vec<char> = "abcab😀".chars().collect();

    for len in 1..=70 {
        let text: String = (0..len).map(|i| alphabet[(i * 7 + i / 3) % alphabet.len()]).collect();
        let root = presser.press(&text, &public).unwrap();
        assert_eq!(presser.release(root).unwrap(), text);
    }
}

#[test]
fn test_roundtrip_file_ledger_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.strand");
    let (keys, public) = keys();

    let root = {
        let presser = Presser::new(FileLedger::create(&path).unwrap());
        let root = presser.press("persisted text, persisted text", &public).unwrap();
        presser.ledger().sync().unwrap();
        root
    };

    let presser = Presser::new(FileLedger::open(&path).unwrap()).with_engine(HybridEngine::new(keys));
    assert_eq!(presser.release(root).unwrap(), "persisted text, persisted text");
}

#[test]
fn test_earlier_roots_still_release() {
    let (keys, public) = keys();
    let presser = Presser::new(MemoryLedger::new()).with_engine(HybridEngine::new(keys));

    let first = presser.press("hello", &public).unwrap();
    let second = presser.press("hello world", &public).unwrap();

    assert_ne!(first, second);
    assert_eq!(presser.release(first).unwrap(), "hello");
    assert_eq!(presser.release(second).unwrap(), "hello world");
}

#[test]
fn test_same_text_same_root() {
    let (_, public) = keys();
    let presser = Presser::new(MemoryLedger::new());
    assert_eq!(
        presser.press("repeat", &public).unwrap(),
        presser.press("repeat", &public).unwrap()
    );
}

// ============================================================================
// Path events
// ============================================================================

#[test]
fn test_ab_yields_three_events() {
    let (keys, public) = keys();
    let presser = Presser::new(MemoryLedger::new()).with_engine(HybridEngine::new(keys));

    let receipt = presser.press_detailed("ab", &public).unwrap();
    assert_eq!(receipt.events.len(), 3);
    assert!(receipt.events[0].is_leaf() && receipt.events[1].is_leaf());
    assert!(!receipt.events[2].is_leaf());
    assert_eq!(receipt.root, receipt.events[2].hash);
    assert_eq!(presser.release(receipt.root).unwrap(), "ab");
}

#[test]
fn test_root_is_always_last_event() {
    let (_, public) = keys();
    let presser = Presser::new(MemoryLedger::new());

    for text in ["q", "qq", "qrs", "abcdefgh", "abababab"] {
        let receipt = presser.press_detailed(text, &public).unwrap();
        assert_eq!(receipt.events.last().unwrap().hash, receipt.root);

        let indices: Vec<u64> = receipt.events.iter().map(|e| e.index).collect();
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_shared_pair_node_is_stored_once() {
    let (keys, public) = keys();
    let presser = Presser::new(MemoryLedger::new()).with_engine(HybridEngine::new(keys));

    let root = presser.press("abab", &public).unwrap();
    assert_eq!(presser.ledger().node_count(), 4);
    assert_eq!(presser.ledger().payload_count(), 4);
    assert_eq!(presser.release(root).unwrap(), "abab");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_empty_text() {
    let (_, public) = keys();
    let presser = Presser::new(MemoryLedger::new());
    assert!(matches!(presser.press("", &public), Err(Error::EmptyInput)));
}

#[test]
fn test_tampered_root_payload_aborts_release() {
    let (keys, public) = keys();
    let ledger = Arc::new(MemoryLedger::new());
    let presser = Presser::new(Arc::clone(&ledger)).with_engine(HybridEngine::new(keys));

    let root = presser.press("tamper", &public).unwrap();
    let mut blob = ledger.fetch_payload(&root).unwrap();
    let last = blob.len() - 1;
    blob[last] ^= 0x01;
    ledger.store_payload(&root, &blob).unwrap();

    assert_eq!(presser.release(root).unwrap_err().kind(), ErrorKind::Integrity);
}

#[test]
fn test_unknown_root() {
    let (keys, _) = keys();
    let presser = Presser::new(MemoryLedger::new()).with_engine(HybridEngine::new(keys));
    let err = presser.release(Hash::digest(b"never pressed")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_blob_size_matches_plaintext() {
    let (_, public) = keys();
    for content in ["a", "ß", "你", "🦀"] {
        let blob = encrypt(content, &public).unwrap();
        assert_eq!(blob.len(), OVERHEAD_LEN + content.len());
    }
}
