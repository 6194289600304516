//! Press/release orchestration
//!
//! `press` asks the ledger to build the tree for a string, seals every node
//! for a recipient and stores the blobs. `release` enumerates the tree,
//! decrypts each distinct node once and rebuilds the text positionally.

mod positions;
mod presser;
mod walk;

pub use positions::{assemble, NodeContent};
pub use presser::{PressReceipt, Presser};
pub use walk::{collect_nodes, NodeSet};
