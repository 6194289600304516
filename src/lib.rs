//! # strandpress
//!
//! Encrypted, content-addressed storage of text, one character at a time.
//!
//! Text is split into a binary tree whose leaves are characters and whose
//! inner nodes join two child hashes. Identical content always has the same
//! hash, so repeated substrings share nodes and the tree is really a DAG.
//! Every node is sealed for a recipient's secp256k1 public key; only the
//! holder of the matching secret key can release the original text.
//!
//! ## Core Concepts
//!
//! - **Ledger**: builds trees, hands out path events and stores blobs
//! - **Press**: build the tree for a string and encrypt every node
//! - **Release**: decrypt every node under a root and rebuild the string
//!
//! ## Example
//!
//! ```ignore
//! use strandpress::{HybridEngine, KeyPair, MemoryLedger, Presser};
//!
//! let keys = KeyPair::generate();
//! let public = keys.public_hex();
//! let presser = Presser::new(MemoryLedger::new()).with_engine(HybridEngine::new(keys));
//! let root = presser.press("abab", &public)?;
//! assert_eq!(presser.release(root)?, "abab");
//! ```

pub mod config;
pub mod crypto;
pub mod ledger;
pub mod model;
pub mod press;

mod error;

pub use config::Config;
pub use crypto::{HybridEngine, KeyFile, KeyPair, Payload};
pub use error::{Error, ErrorKind, Result};
pub use ledger::{FileLedger, Ledger, MemoryLedger};
pub use model::{Components, Hash, NodeKind, PathEvent};
pub use press::{NodeSet, PressReceipt, Presser};

/// Ledger file format version
pub const VERSION: u32 = 1;

/// Magic bytes for ledger file identification
pub const MAGIC: &[u8; 8] = b"STRANDLG";
