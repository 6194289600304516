//! Hybrid public-key encryption of node payloads
//!
//! Every node of a pressed tree is sealed for one recipient with the
//! `engine` wire format. Payloads are either one character or a JSON pair
//! of child hashes (see `payload`).

mod engine;
mod keys;
mod payload;

pub use engine::{
    encrypt, encrypt_payload, HybridEngine, EPHEMERAL_KEY_LEN, MAC_LEN, MIN_BLOB_LEN, NONCE_LEN,
    OVERHEAD_LEN, TAG_LEN,
};
pub use keys::{
    public_key_from_hex, public_key_to_hex, KeyFile, KeyPair, PUBLIC_KEY_LEN, SECRET_KEY_LEN,
};
pub use payload::{Payload, MAX_CHARACTER_LEN, MAX_HASH_PAIR_LEN};
