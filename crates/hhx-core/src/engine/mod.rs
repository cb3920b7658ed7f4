//! # Engine Module
//!
//! The analysis proper: everything between an event store going in and an
//! ntuple row coming out.
//!
//! ## Architecture
//!
//! - **Decay-Tree Walker** ([`walker`]) - Resolves a particle to the last copy of its same-species chain
//! - **Topology Selection** ([`selector`]) - Finds two parents, their boson and companion, and the boson's quark pair
//! - **Output Schema** ([`schema`]) - The 54 branch names and the row builder with MeV to GeV conversion
//! - **Algorithm Lifecycle** ([`algorithm`]) - The `EventAlgorithm` hooks and the `NtupleMaker` state machine
//! - **Configuration** ([`config`]) - Role species, store keys and output names
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine errors, split into event-scoped and fatal

pub mod algorithm;
pub mod config;
pub mod error;
pub mod progress;
pub mod schema;
pub mod selector;
#[cfg(test)]
pub(crate) mod testing;
pub mod walker;
