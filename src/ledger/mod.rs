//! Content-addressed node ledger
//!
//! The orchestrator only talks to the `Ledger` trait. `MemoryLedger` and
//! `FileLedger` are bundled implementations that share one tree layout
//! (`builder`) and hash nodes with BLAKE3.

mod blob;
mod builder;
mod file_ledger;
mod memory;
mod traits;

pub use builder::{plan_tree, PlannedNode, TreePlan};
pub use file_ledger::FileLedger;
pub use memory::MemoryLedger;
pub use traits::Ledger;
