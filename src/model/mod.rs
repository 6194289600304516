//! Core data model types for strandpress

mod hash;
mod node;

pub use hash::{Hash, HASH_HEX_LEN};
pub use node::{Components, NodeKind, PathEvent};
